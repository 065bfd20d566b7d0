use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate;
use crate::db::Database;
use crate::error::{LedgerError, Result};
use crate::models::Budget;

/// Position of period spend relative to a limit. NEAR starts at 90% of the
/// limit; OVER requires strictly exceeding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum BudgetStatus {
    Under,
    Near,
    Over,
}

fn near_threshold() -> Decimal {
    // 90%
    Decimal::new(90, 2)
}

fn status_against(spend: Decimal, limit: Decimal) -> BudgetStatus {
    if spend > limit {
        BudgetStatus::Over
    } else if spend >= limit * near_threshold() {
        BudgetStatus::Near
    } else {
        BudgetStatus::Under
    }
}

/// Classify `period_spend` against the budget's monthly limit. A
/// non-positive monthly limit is a configuration error, not a status.
pub(crate) fn evaluate(budget: &Budget, period_spend: Decimal) -> Result<BudgetStatus> {
    if budget.monthly_limit <= Decimal::ZERO {
        return Err(LedgerError::Config(format!(
            "budget {} has a non-positive monthly limit: {}",
            budget.id.unwrap_or_default(),
            budget.monthly_limit
        )));
    }
    Ok(status_against(period_spend, budget.monthly_limit))
}

/// One evaluated budget row: month-to-date spend against the monthly limit,
/// plus year-to-date against the yearly limit when one is set.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BudgetReport {
    pub budget_id: i64,
    pub category_id: i64,
    pub category: String,
    pub monthly_limit: Decimal,
    pub month_spend: Decimal,
    pub monthly_status: BudgetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_limit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_spend: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_status: Option<BudgetStatus>,
}

/// Evaluate every budget that is active and whose window covers `today`.
/// Inactive or out-of-window budgets are skipped, not errored.
pub(crate) fn budget_report(db: &Database, today: NaiveDate) -> Result<Vec<BudgetReport>> {
    let mut reports = Vec::new();
    for budget in db.get_budgets(true)? {
        if !budget.in_window(today) {
            continue;
        }

        let (month_from, month_to) = month_window(today);
        let month_spend =
            aggregate::category_spend_between(db, budget.category_id, &month_from, &month_to)?;
        let monthly_status = evaluate(&budget, month_spend)?;

        let (year_spend, yearly_status) = match budget.yearly_limit {
            Some(limit) => {
                if limit <= Decimal::ZERO {
                    return Err(LedgerError::Config(format!(
                        "budget {} has a non-positive yearly limit: {limit}",
                        budget.id.unwrap_or_default()
                    )));
                }
                let (year_from, year_to) = year_window(today);
                let spend = aggregate::category_spend_between(
                    db,
                    budget.category_id,
                    &year_from,
                    &year_to,
                )?;
                (Some(spend), Some(status_against(spend, limit)))
            }
            None => (None, None),
        };

        let category = db
            .get_category_by_id(budget.category_id)?
            .map(|c| c.to_string())
            .unwrap_or_default();

        reports.push(BudgetReport {
            budget_id: budget.id.unwrap_or_default(),
            category_id: budget.category_id,
            category,
            monthly_limit: budget.monthly_limit,
            month_spend,
            monthly_status,
            yearly_limit: budget.yearly_limit,
            year_spend,
            yearly_status,
        });
    }
    Ok(reports)
}

/// Current calendar month as [first-of-month, first-of-next-month).
fn month_window(today: NaiveDate) -> (String, String) {
    let (y, m) = (today.year(), today.month());
    let from = format!("{y:04}-{m:02}-01");
    let to = if m == 12 {
        format!("{:04}-01-01", y + 1)
    } else {
        format!("{y:04}-{:02}-01", m + 1)
    };
    (from, to)
}

/// Current calendar year as [Jan 1, next Jan 1).
fn year_window(today: NaiveDate) -> (String, String) {
    let y = today.year();
    (format!("{y:04}-01-01"), format!("{:04}-01-01", y + 1))
}
