use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

use crate::db::Database;
use crate::error::{LedgerError, Result};
use crate::models::{NewBudget, NewTransaction};

const MAX_DESCRIPTION_LEN: usize = 500;
const TIMESTAMP_FMT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FMT: &str = "%Y-%m-%d";

/// Raw transaction payload as received from the transport adapter. Everything
/// that needs parsing arrives as a string; the owning user is an explicit,
/// required parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TransactionInput {
    pub date: String,
    pub description: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub institution: Option<String>,
    pub account_number: Option<String>,
    pub balance: Option<String>,
    pub memo: Option<String>,
    pub category_id: Option<i64>,
    pub company_id: Option<i64>,
    pub user_id: i64,
}

/// Raw category payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CategoryInput {
    pub big_category: String,
    pub sub_category: String,
    pub item_category: Option<String>,
}

/// Raw budget payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BudgetInput {
    pub category_id: i64,
    pub user_id: i64,
    pub monthly_limit: String,
    pub yearly_limit: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
}

/// Validate and persist a transaction. All validation happens before any SQL
/// runs, so a failure leaves no row behind. Returns the new transaction's id.
pub(crate) fn record_transaction(db: &Database, input: &TransactionInput) -> Result<i64> {
    let date = parse_timestamp(&input.date)?;

    let description = input.description.trim();
    if description.is_empty() {
        return Err(LedgerError::validation("description is required"));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(LedgerError::validation(format!(
            "description exceeds {MAX_DESCRIPTION_LEN} characters"
        )));
    }

    let amount = parse_amount(&input.amount, "amount")?;
    let balance = match input.balance.as_deref() {
        Some(raw) => Some(parse_amount(raw, "balance")?),
        None => None,
    };

    // Descriptive metadata only; aggregation keys on the amount's sign.
    let transaction_type = input
        .transaction_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("expense")
        .to_string();

    let new = NewTransaction {
        transaction_date: date.format(TIMESTAMP_FMT).to_string(),
        description: description.to_string(),
        transaction_type,
        institution: non_blank(input.institution.as_deref()),
        account_number: non_blank(input.account_number.as_deref()),
        amount,
        balance,
        memo: non_blank(input.memo.as_deref()),
        user_id: input.user_id,
        category_id: input.category_id,
        company_id: input.company_id,
    };

    let id = db.insert_transaction(&new)?;
    debug!(id, amount = %new.amount, "recorded transaction");
    Ok(id)
}

/// Create a classification node. Both big and sub labels are required; a
/// blank item label is normalized away.
pub(crate) fn define_category(
    db: &Database,
    big_category: &str,
    sub_category: &str,
    item_category: Option<&str>,
) -> Result<i64> {
    let big = big_category.trim();
    let sub = sub_category.trim();
    if big.is_empty() {
        return Err(LedgerError::validation("big_category is required"));
    }
    if sub.is_empty() {
        return Err(LedgerError::validation("sub_category is required"));
    }
    let item = non_blank(item_category);
    db.insert_category(big, sub, item.as_deref())
}

/// Provision a ledger owner. Done once, explicitly; there is no implicit
/// default user.
pub(crate) fn provision_user(db: &Database, username: &str, email: &str) -> Result<i64> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() {
        return Err(LedgerError::validation("username is required"));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(LedgerError::validation("a valid email is required"));
    }
    db.insert_user(username, email)
}

/// Register an originating institution.
pub(crate) fn register_company(
    db: &Database,
    name: &str,
    company_type: Option<&str>,
    api_endpoint: Option<&str>,
    api_available: bool,
) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("company name is required"));
    }
    db.insert_company(
        name,
        non_blank(company_type).as_deref(),
        non_blank(api_endpoint).as_deref(),
        api_available,
    )
}

/// Validate and persist a budget. Limit strings must parse as decimals and
/// dates as YYYY-MM-DD; the start/end order invariant is enforced by the
/// repository.
pub(crate) fn define_budget(db: &Database, input: &BudgetInput) -> Result<i64> {
    let monthly_limit = parse_amount(&input.monthly_limit, "monthly_limit")?;
    let yearly_limit = match input.yearly_limit.as_deref() {
        Some(raw) => Some(parse_amount(raw, "yearly_limit")?),
        None => None,
    };
    let start_date = parse_date(&input.start_date, "start_date")?;
    let end_date = match input.end_date.as_deref() {
        Some(raw) => Some(parse_date(raw, "end_date")?),
        None => None,
    };

    db.insert_budget(&NewBudget {
        category_id: input.category_id,
        user_id: input.user_id,
        monthly_limit,
        yearly_limit,
        start_date: start_date.format(DATE_FMT).to_string(),
        end_date: end_date.map(|d| d.format(DATE_FMT).to_string()),
    })
}

/// Parse a caller-supplied date into a canonical naive timestamp. Accepts
/// RFC 3339, "YYYY-MM-DDTHH:MM:SS", "YYYY-MM-DD HH:MM:SS", or a bare date
/// (taken as midnight).
fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(LedgerError::validation("transaction date is required"));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FMT) {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FMT) {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(LedgerError::validation(format!(
        "unparsable transaction date: {s}"
    )))
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FMT)
        .map_err(|_| LedgerError::validation(format!("{field} must be YYYY-MM-DD, got: {raw}")))
}

fn parse_amount(raw: &str, field: &str) -> Result<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(LedgerError::validation(format!("{field} is required")));
    }
    Decimal::from_str(s)
        .map_err(|_| LedgerError::validation(format!("{field} must be a decimal number, got: {s}")))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests;
