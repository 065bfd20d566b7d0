//! The operation surface consumed by a transport adapter. Each operation
//! returns a serializable view; errors surface as `LedgerError` and are
//! rendered by the adapter as structured failures.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate;
use crate::budgets::{self, BudgetReport};
use crate::db::Database;
use crate::error::Result;
use crate::ledger::{self, CategoryInput, TransactionInput};

#[derive(Debug, Serialize)]
pub(crate) struct HealthView {
    pub status: &'static str,
    pub timestamp: String,
}

/// Liveness signal.
pub(crate) fn health() -> HealthView {
    HealthView {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TransactionView {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub category: Option<String>,
}

/// Every transaction, most recent first, with its category's top-level label
/// (null when uncategorized).
pub(crate) fn list_transactions(db: &Database) -> Result<Vec<TransactionView>> {
    let rows = db.list_transactions_with_category()?;
    Ok(rows
        .into_iter()
        .map(|(txn, category)| TransactionView {
            id: txn.id.unwrap_or_default(),
            date: txn.transaction_date,
            description: txn.description,
            amount: txn.amount,
            transaction_type: txn.transaction_type,
            category,
        })
        .collect())
}

#[derive(Debug, Serialize)]
pub(crate) struct RecordedView {
    pub id: i64,
}

pub(crate) fn record_transaction(db: &Database, input: &TransactionInput) -> Result<RecordedView> {
    let id = ledger::record_transaction(db, input)?;
    Ok(RecordedView { id })
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryView {
    pub id: i64,
    pub big_category: String,
    pub sub_category: String,
    pub item_category: Option<String>,
    pub spending: Decimal,
}

/// Categories in insertion order, each with its all-time spend magnitude.
pub(crate) fn list_categories(db: &Database, active_only: bool) -> Result<Vec<CategoryView>> {
    let categories = db.get_categories(active_only)?;
    let mut views = Vec::with_capacity(categories.len());
    for cat in categories {
        let id = cat.id.unwrap_or_default();
        views.push(CategoryView {
            id,
            big_category: cat.big_category,
            sub_category: cat.sub_category,
            item_category: cat.item_category,
            spending: aggregate::category_spend(db, id)?,
        });
    }
    Ok(views)
}

pub(crate) fn define_category(db: &Database, input: &CategoryInput) -> Result<RecordedView> {
    let id = ledger::define_category(
        db,
        &input.big_category,
        &input.sub_category,
        input.item_category.as_deref(),
    )?;
    Ok(RecordedView { id })
}

#[derive(Debug, Serialize)]
pub(crate) struct RecentTransactionView {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardView {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub recent_transactions: Vec<RecentTransactionView>,
}

const DASHBOARD_RECENT_LIMIT: u32 = 5;

pub(crate) fn dashboard_summary(db: &Database) -> Result<DashboardView> {
    let totals = aggregate::totals(db)?;
    let recent = aggregate::recent_activity(db, DASHBOARD_RECENT_LIMIT)?;
    Ok(DashboardView {
        total_income: totals.total_income,
        total_expenses: totals.total_expenses,
        balance: totals.balance,
        recent_transactions: recent
            .into_iter()
            .map(|txn| RecentTransactionView {
                id: txn.id.unwrap_or_default(),
                date: txn.transaction_date,
                description: txn.description,
                amount: txn.amount,
            })
            .collect(),
    })
}

/// Evaluated budgets for `today`: active, in-window budgets with period
/// spend and UNDER/NEAR/OVER status.
pub(crate) fn budget_overview(db: &Database, today: NaiveDate) -> Result<Vec<BudgetReport>> {
    budgets::budget_report(db, today)
}
