mod aggregate;
mod api;
mod budgets;
mod config;
mod db;
mod error;
mod ledger;
mod models;
mod preview;
mod run;

use std::process::ExitCode;

use error::LedgerError;

fn main() -> ExitCode {
    init_tracing();
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env()?;
    // Fail closed: if the configured database cannot be opened there is no
    // fallback store.
    let db = db::Database::open(&config.db_path)?;
    run::as_cli(&args, &db)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Domain errors are reported with their kind so callers can correct input;
/// anything unexpected is reported as an opaque internal error.
fn report_failure(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<LedgerError>() {
        Some(domain) => serde_json::json!({
            "error": { "kind": domain.kind(), "message": domain.to_string() }
        }),
        None => serde_json::json!({
            "error": { "kind": "internal", "message": err.to_string() }
        }),
    };
    eprintln!("{payload:#}");
}
