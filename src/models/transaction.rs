use rust_decimal::Decimal;

/// A single monetary movement. The amount's sign is authoritative:
/// positive = income, negative = expense. `transaction_type` is descriptive
/// metadata and is never consulted by aggregation.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Option<i64>,
    pub transaction_date: String,
    pub description: String,
    pub transaction_type: Option<String>,
    pub institution: Option<String>,
    pub account_number: Option<String>,
    pub amount: Decimal,
    pub balance: Option<Decimal>,
    pub memo: Option<String>,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub company_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }
}

/// Validated fields for inserting a transaction. Timestamps are stamped by
/// the repository, never supplied here.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_date: String,
    pub description: String,
    pub transaction_type: String,
    pub institution: Option<String>,
    pub account_number: Option<String>,
    pub amount: Decimal,
    pub balance: Option<Decimal>,
    pub memo: Option<String>,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub company_id: Option<i64>,
}
