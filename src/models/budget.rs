use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A spending ceiling for a category. A budget with no end date stays in
/// force until explicitly deactivated.
#[derive(Debug, Clone)]
pub struct Budget {
    pub id: Option<i64>,
    pub category_id: i64,
    pub user_id: i64,
    pub monthly_limit: Decimal,
    pub yearly_limit: Option<Decimal>,
    /// Format: "YYYY-MM-DD"
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_active: bool,
}

impl Budget {
    /// Whether the budget should be evaluated on `today`: active flag set and
    /// today within [start_date, end_date-or-open]. ISO date strings compare
    /// lexicographically.
    pub fn in_window(&self, today: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }
        let today = today.format("%Y-%m-%d").to_string();
        if today < self.start_date {
            return false;
        }
        match &self.end_date {
            Some(end) => today <= *end,
            None => true,
        }
    }
}

/// Validated fields for inserting a budget.
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category_id: i64,
    pub user_id: i64,
    pub monthly_limit: Decimal,
    pub yearly_limit: Option<Decimal>,
    pub start_date: String,
    pub end_date: Option<String>,
}
