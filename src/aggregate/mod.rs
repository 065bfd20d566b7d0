use rust_decimal::Decimal;

use crate::db::{AmountFilter, Database, Sign, TransactionFilter};
use crate::error::Result;
use crate::models::Transaction;

/// Income/expense/balance summary. Recomputed from raw rows on every call;
/// nothing here is cached, so results always reflect the latest committed
/// writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Totals {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
}

/// Sum of strictly positive amounts, absolute sum of strictly negative
/// amounts, and the direct sum of all amounts. Zero-amount transactions
/// count toward neither income nor expenses. The balance is summed directly
/// rather than derived by subtraction.
pub(crate) fn totals(db: &Database) -> Result<Totals> {
    let total_income = db.sum_amount(&AmountFilter {
        sign: Some(Sign::Positive),
        ..Default::default()
    })?;
    let expense_sum = db.sum_amount(&AmountFilter {
        sign: Some(Sign::Negative),
        ..Default::default()
    })?;
    let balance = db.sum_amount(&AmountFilter::default())?;
    Ok(Totals {
        total_income,
        total_expenses: expense_sum.abs(),
        balance,
    })
}

/// All-time spend for a category: negative amounts only, sign-flipped to a
/// positive magnitude. A category with no matching transactions reports
/// exactly zero.
pub(crate) fn category_spend(db: &Database, category_id: i64) -> Result<Decimal> {
    let spent = db.sum_amount(&AmountFilter {
        category_id: Some(category_id),
        sign: Some(Sign::Negative),
        ..Default::default()
    })?;
    Ok(spent.abs())
}

/// Category spend within [from, to), ISO date bounds.
pub(crate) fn category_spend_between(
    db: &Database,
    category_id: i64,
    from: &str,
    to: &str,
) -> Result<Decimal> {
    let spent = db.sum_amount(&AmountFilter {
        category_id: Some(category_id),
        sign: Some(Sign::Negative),
        from: Some(from),
        to: Some(to),
        ..Default::default()
    })?;
    Ok(spent.abs())
}

/// The `limit` most recent transactions, date descending, date ties broken
/// by arrival order.
pub(crate) fn recent_activity(db: &Database, limit: u32) -> Result<Vec<Transaction>> {
    db.get_transactions(&TransactionFilter {
        limit: Some(limit),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests;
