use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::api;
use crate::db::Database;
use crate::error::LedgerError;
use crate::ledger::{self, BudgetInput, CategoryInput, TransactionInput};
use crate::preview::CsvPreview;

/// Thin transport adapter: maps argv commands onto the api operations and
/// prints JSON responses on stdout.
pub(crate) fn as_cli(args: &[String], db: &Database) -> Result<()> {
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "health" => print_json(&api::health()),
        "transactions" => print_json(&api::list_transactions(db)?),
        "record" => cli_record(&args[2..], db),
        "categories" => {
            let active_only = !args[2..].iter().any(|a| a == "--all");
            print_json(&api::list_categories(db, active_only)?)
        }
        "define-category" => cli_define_category(&args[2..], db),
        "summary" => print_json(&api::dashboard_summary(db)?),
        "budgets" => {
            let today = chrono::Local::now().date_naive();
            print_json(&api::budget_overview(db, today)?)
        }
        "user" => cli_user(&args[2..], db),
        "company" => cli_company(&args[2..], db),
        "budget" => cli_budget(&args[2..], db),
        "preview" => cli_preview(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("famledger {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            Err(usage(format!("unknown command: {other}")))
        }
    }
}

fn print_usage() {
    println!("famledger — household expense ledger");
    println!();
    println!("Usage: famledger <command>");
    println!();
    println!("Commands:");
    println!("  health                        Liveness check");
    println!("  summary                       Income/expense/balance dashboard");
    println!("  transactions                  List all transactions");
    println!("  record --date <d> --description <s> --amount <n> --user <id>");
    println!("    [--type <s>] [--category <id>] [--company <id>]");
    println!("    [--institution <s>] [--account <s>] [--balance <n>] [--memo <s>]");
    println!("  categories [--all]            List categories with spending");
    println!("  define-category <big> <sub> [item]");
    println!("  budgets                       Evaluate active budgets for today");
    println!("  budget set --category <id> --user <id> --monthly <n>");
    println!("    [--yearly <n>] --start <YYYY-MM-DD> [--end <YYYY-MM-DD>]");
    println!("  user add <username> <email>   Provision a ledger owner");
    println!("  user list                     List provisioned users");
    println!("  company add <name> [--type <s>] [--endpoint <url>] [--api]");
    println!("  company list                  List registered companies");
    println!("  preview <file.csv>            Sample up to 10 rows of a tabular file");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn cli_record(args: &[String], db: &Database) -> Result<()> {
    let input = TransactionInput {
        date: required_flag(args, "--date")?,
        description: required_flag(args, "--description")?,
        amount: required_flag(args, "--amount")?,
        transaction_type: flag(args, "--type"),
        institution: flag(args, "--institution"),
        account_number: flag(args, "--account"),
        balance: flag(args, "--balance"),
        memo: flag(args, "--memo"),
        category_id: id_flag(args, "--category")?,
        company_id: id_flag(args, "--company")?,
        user_id: id_flag(args, "--user")?.ok_or_else(|| usage("missing required --user <id>"))?,
    };
    print_json(&api::record_transaction(db, &input)?)
}

fn cli_define_category(args: &[String], db: &Database) -> Result<()> {
    let (Some(big), Some(sub)) = (args.first(), args.get(1)) else {
        return Err(usage("usage: famledger define-category <big> <sub> [item]"));
    };
    let input = CategoryInput {
        big_category: big.clone(),
        sub_category: sub.clone(),
        item_category: args.get(2).cloned(),
    };
    print_json(&api::define_category(db, &input)?)
}

fn cli_user(args: &[String], db: &Database) -> Result<()> {
    match (args.first().map(String::as_str), args.get(1), args.get(2)) {
        (Some("add"), Some(username), Some(email)) => {
            let id = ledger::provision_user(db, username, email)?;
            print_json(&serde_json::json!({ "id": id }))
        }
        (Some("list"), None, None) => {
            let users: Vec<_> = db
                .get_users()?
                .into_iter()
                .map(|u| {
                    serde_json::json!({
                        "id": u.id,
                        "username": u.username,
                        "email": u.email,
                        "created_at": u.created_at,
                    })
                })
                .collect();
            print_json(&users)
        }
        _ => Err(usage("usage: famledger user <add <username> <email> | list>")),
    }
}

fn cli_company(args: &[String], db: &Database) -> Result<()> {
    match (args.first().map(String::as_str), args.get(1)) {
        (Some("list"), None) => {
            let companies: Vec<_> = db
                .get_companies()?
                .into_iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.id,
                        "name": c.name,
                        "type": c.company_type,
                        "api_endpoint": c.api_endpoint,
                        "api_available": c.api_available,
                    })
                })
                .collect();
            print_json(&companies)
        }
        (Some("add"), Some(name)) => {
            let api_available = args.iter().any(|a| a == "--api");
            let id = ledger::register_company(
                db,
                name,
                flag(args, "--type").as_deref(),
                flag(args, "--endpoint").as_deref(),
                api_available,
            )?;
            print_json(&serde_json::json!({ "id": id }))
        }
        _ => Err(usage(
            "usage: famledger company add <name> [--type <s>] [--endpoint <url>] [--api]",
        )),
    }
}

fn cli_budget(args: &[String], db: &Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("set") => {
            let rest = &args[1..];
            let input = BudgetInput {
                category_id: id_flag(rest, "--category")?
                    .ok_or_else(|| usage("missing required --category <id>"))?,
                user_id: id_flag(rest, "--user")?
                    .ok_or_else(|| usage("missing required --user <id>"))?,
                monthly_limit: required_flag(rest, "--monthly")?,
                yearly_limit: flag(rest, "--yearly"),
                start_date: required_flag(rest, "--start")?,
                end_date: flag(rest, "--end"),
            };
            let id = ledger::define_budget(db, &input)?;
            print_json(&serde_json::json!({ "id": id }))
        }
        _ => Err(usage("usage: famledger budget set --category <id> --user <id> --monthly <n> --start <YYYY-MM-DD>")),
    }
}

fn cli_preview(args: &[String]) -> Result<()> {
    let Some(file) = args.first() else {
        return Err(usage("usage: famledger preview <file.csv>"));
    };
    print_json(&CsvPreview::preview(Path::new(file))?)
}

fn flag(args: &[String], name: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == name).map(|w| w[1].clone())
}

fn required_flag(args: &[String], name: &str) -> Result<String> {
    flag(args, name).ok_or_else(|| usage(format!("missing required {name} <value>")))
}

fn id_flag(args: &[String], name: &str) -> Result<Option<i64>> {
    match flag(args, name) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| usage(format!("{name} must be a numeric id, got: {raw}"))),
        None => Ok(None),
    }
}

fn usage(msg: impl Into<String>) -> anyhow::Error {
    LedgerError::validation(msg).into()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
