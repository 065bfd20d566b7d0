mod schema;

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::error::{map_constraint, LedgerError, Result};
use crate::models::*;

/// The repository: single source of truth for users, categories, companies,
/// transactions, and budgets. Derived numbers are never stored; aggregation
/// recomputes them from raw rows on every read.
pub(crate) struct Database {
    conn: Connection,
}

/// Sign predicate for amount aggregation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Sign {
    Positive,
    Negative,
}

/// Predicate for `sum_amount`. Date bounds are ISO strings; `from` is
/// inclusive, `to` exclusive.
#[derive(Debug, Default)]
pub(crate) struct AmountFilter<'a> {
    pub user_id: Option<i64>,
    pub category_id: Option<i64>,
    pub sign: Option<Sign>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
}

#[derive(Debug, Default)]
pub(crate) struct TransactionFilter {
    pub user_id: Option<i64>,
    pub category_id: Option<i64>,
    pub limit: Option<u32>,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn parse_stored_amount(raw: &str) -> Decimal {
    // Amounts are written from Decimal::to_string, so this cannot fail for
    // rows this crate produced.
    Decimal::from_str(raw).unwrap_or_default()
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Self { conn };
        db.migrate()?;
        info!(path = %path.display(), "database ready");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            info!(version = schema::CURRENT_VERSION, "applied fresh schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            info!(
                from = current,
                to = schema::CURRENT_VERSION,
                "migrated schema"
            );
        }

        Ok(())
    }

    fn user_exists(&self, id: i64) -> Result<bool> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?)
    }

    fn category_exists(&self, id: i64) -> Result<bool> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?)
    }

    fn company_exists(&self, id: i64) -> Result<bool> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?)
    }

    // ── Users ─────────────────────────────────────────────────

    pub(crate) fn insert_user(&self, username: &str, email: &str) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
                params![username, email, now()],
            )
            .map_err(map_constraint)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, username, email, created_at FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok(User {
                    id: Some(row.get(0)?),
                    username: row.get(1)?,
                    email: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        );
        match result {
            Ok(u) => Ok(Some(u)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, email, created_at FROM users ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(User {
                id: Some(row.get(0)?),
                username: row.get(1)?,
                email: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn insert_category(
        &self,
        big_category: &str,
        sub_category: &str,
        item_category: Option<&str>,
    ) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO categories (big_category, sub_category, item_category, is_active, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                params![big_category, sub_category, item_category, now()],
            )
            .map_err(map_constraint)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Categories in insertion order, optionally restricted to active ones.
    pub(crate) fn get_categories(&self, active_only: bool) -> Result<Vec<Category>> {
        let sql = if active_only {
            "SELECT id, big_category, sub_category, item_category, is_active, created_at
             FROM categories WHERE is_active = 1 ORDER BY id"
        } else {
            "SELECT id, big_category, sub_category, item_category, is_active, created_at
             FROM categories ORDER BY id"
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                big_category: row.get(1)?,
                sub_category: row.get(2)?,
                item_category: row.get(3)?,
                is_active: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, big_category, sub_category, item_category, is_active, created_at
             FROM categories WHERE id = ?1",
            params![id],
            |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    big_category: row.get(1)?,
                    sub_category: row.get(2)?,
                    item_category: row.get(3)?,
                    is_active: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Soft deactivation. Deletion is not supported: historical transactions
    /// must keep a valid category reference.
    pub(crate) fn deactivate_category(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET is_active = 0 WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(LedgerError::reference("category", id));
        }
        Ok(())
    }

    // ── Companies ─────────────────────────────────────────────

    pub(crate) fn insert_company(
        &self,
        name: &str,
        company_type: Option<&str>,
        api_endpoint: Option<&str>,
        api_available: bool,
    ) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO companies (name, company_type, api_endpoint, api_available, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![name, company_type, api_endpoint, api_available, now()],
            )
            .map_err(map_constraint)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_companies(&self) -> Result<Vec<Company>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, company_type, api_endpoint, api_available, created_at
             FROM companies ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Company {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                company_type: row.get(2)?,
                api_endpoint: row.get(3)?,
                api_available: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_company_by_id(&self, id: i64) -> Result<Option<Company>> {
        let result = self.conn.query_row(
            "SELECT id, name, company_type, api_endpoint, api_available, created_at
             FROM companies WHERE id = ?1",
            params![id],
            |row| {
                Ok(Company {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    company_type: row.get(2)?,
                    api_endpoint: row.get(3)?,
                    api_available: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &NewTransaction) -> Result<i64> {
        if !self.user_exists(txn.user_id)? {
            return Err(LedgerError::reference("user", txn.user_id));
        }
        if let Some(cid) = txn.category_id {
            if !self.category_exists(cid)? {
                return Err(LedgerError::reference("category", cid));
            }
        }
        if let Some(cid) = txn.company_id {
            if !self.company_exists(cid)? {
                return Err(LedgerError::reference("company", cid));
            }
        }

        let stamp = now();
        self.conn
            .execute(
                "INSERT INTO transactions (transaction_date, description, transaction_type,
                    institution, account_number, amount, balance, memo,
                    user_id, category_id, company_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    txn.transaction_date,
                    txn.description,
                    txn.transaction_type,
                    txn.institution,
                    txn.account_number,
                    txn.amount.to_string(),
                    txn.balance.map(|b| b.to_string()),
                    txn.memo,
                    txn.user_id,
                    txn.category_id,
                    txn.company_id,
                    stamp,
                    stamp,
                ],
            )
            .map_err(map_constraint)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent first; ties on the date broken by arrival order (id).
    pub(crate) fn get_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = String::from(
            "SELECT id, transaction_date, description, transaction_type, institution,
                    account_number, amount, balance, memo, user_id, category_id, company_id,
                    created_at, updated_at
             FROM transactions WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(uid) = filter.user_id {
            sql.push_str(&format!(" AND user_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(uid));
        }
        if let Some(cid) = filter.category_id {
            sql.push_str(&format!(" AND category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cid));
        }

        sql.push_str(" ORDER BY transaction_date DESC, id DESC");

        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), map_transaction_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        let result = self.conn.query_row(
            "SELECT id, transaction_date, description, transaction_type, institution,
                    account_number, amount, balance, memo, user_id, category_id, company_id,
                    created_at, updated_at
             FROM transactions WHERE id = ?1",
            params![id],
            map_transaction_row,
        );
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    /// Transactions joined with their category's top-level label, most
    /// recent first.
    pub(crate) fn list_transactions_with_category(
        &self,
    ) -> Result<Vec<(Transaction, Option<String>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.transaction_date, t.description, t.transaction_type, t.institution,
                    t.account_number, t.amount, t.balance, t.memo, t.user_id, t.category_id,
                    t.company_id, t.created_at, t.updated_at, c.big_category
             FROM transactions t
             LEFT JOIN categories c ON t.category_id = c.id
             ORDER BY t.transaction_date DESC, t.id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            let txn = map_transaction_row(row)?;
            let label: Option<String> = row.get(14)?;
            Ok((txn, label))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Reassign a transaction's category/company links. The owning user is
    /// immutable after creation; there is deliberately no operation for it.
    /// Re-stamps `updated_at`.
    pub(crate) fn update_transaction_links(
        &self,
        id: i64,
        category_id: Option<i64>,
        company_id: Option<i64>,
    ) -> Result<()> {
        if let Some(cid) = category_id {
            if !self.category_exists(cid)? {
                return Err(LedgerError::reference("category", cid));
            }
        }
        if let Some(cid) = company_id {
            if !self.company_exists(cid)? {
                return Err(LedgerError::reference("company", cid));
            }
        }
        let changed = self
            .conn
            .execute(
                "UPDATE transactions SET category_id = ?1, company_id = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![category_id, company_id, now(), id],
            )
            .map_err(map_constraint)?;
        if changed == 0 {
            return Err(LedgerError::reference("transaction", id));
        }
        Ok(())
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn insert_budget(&self, budget: &NewBudget) -> Result<i64> {
        if let Some(end) = &budget.end_date {
            if *end < budget.start_date {
                return Err(LedgerError::validation(format!(
                    "budget start date {} is after end date {end}",
                    budget.start_date
                )));
            }
        }
        if !self.category_exists(budget.category_id)? {
            return Err(LedgerError::reference("category", budget.category_id));
        }
        if !self.user_exists(budget.user_id)? {
            return Err(LedgerError::reference("user", budget.user_id));
        }

        self.conn
            .execute(
                "INSERT INTO budgets (category_id, user_id, monthly_limit, yearly_limit,
                    start_date, end_date, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
                params![
                    budget.category_id,
                    budget.user_id,
                    budget.monthly_limit.to_string(),
                    budget.yearly_limit.map(|l| l.to_string()),
                    budget.start_date,
                    budget.end_date,
                ],
            )
            .map_err(map_constraint)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_budgets(&self, active_only: bool) -> Result<Vec<Budget>> {
        let sql = if active_only {
            "SELECT id, category_id, user_id, monthly_limit, yearly_limit, start_date, end_date, is_active
             FROM budgets WHERE is_active = 1 ORDER BY id"
        } else {
            "SELECT id, category_id, user_id, monthly_limit, yearly_limit, start_date, end_date, is_active
             FROM budgets ORDER BY id"
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            let monthly: String = row.get(3)?;
            let yearly: Option<String> = row.get(4)?;
            Ok(Budget {
                id: Some(row.get(0)?),
                category_id: row.get(1)?,
                user_id: row.get(2)?,
                monthly_limit: parse_stored_amount(&monthly),
                yearly_limit: yearly.as_deref().map(parse_stored_amount),
                start_date: row.get(5)?,
                end_date: row.get(6)?,
                is_active: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn deactivate_budget(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE budgets SET is_active = 0 WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(LedgerError::reference("budget", id));
        }
        Ok(())
    }

    // ── Aggregate primitives ──────────────────────────────────

    /// Exact Decimal sum of matching amounts. Rows are fetched and folded in
    /// Rust so the fixed-point values never pass through floating point; the
    /// sign predicate casts only for comparison. No matching rows sums to
    /// zero, indistinguishable from rows summing to zero.
    pub(crate) fn sum_amount(&self, filter: &AmountFilter) -> Result<Decimal> {
        let mut sql = String::from("SELECT amount FROM transactions WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(uid) = filter.user_id {
            sql.push_str(&format!(" AND user_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(uid));
        }
        if let Some(cid) = filter.category_id {
            sql.push_str(&format!(" AND category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cid));
        }
        match filter.sign {
            Some(Sign::Positive) => sql.push_str(" AND CAST(amount AS REAL) > 0"),
            Some(Sign::Negative) => sql.push_str(" AND CAST(amount AS REAL) < 0"),
            None => {}
        }
        if let Some(from) = filter.from {
            sql.push_str(&format!(
                " AND transaction_date >= ?{}",
                param_values.len() + 1
            ));
            param_values.push(Box::new(from.to_string()));
        }
        if let Some(to) = filter.to {
            sql.push_str(&format!(
                " AND transaction_date < ?{}",
                param_values.len() + 1
            ));
            param_values.push(Box::new(to.to_string()));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| row.get::<_, String>(0))?;

        let mut total = Decimal::ZERO;
        for raw in rows {
            total += parse_stored_amount(&raw?);
        }
        Ok(total)
    }
}

fn map_transaction_row(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
    let amount: String = row.get(6)?;
    let balance: Option<String> = row.get(7)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        transaction_date: row.get(1)?,
        description: row.get(2)?,
        transaction_type: row.get(3)?,
        institution: row.get(4)?,
        account_number: row.get(5)?,
        amount: parse_stored_amount(&amount),
        balance: balance.as_deref().map(parse_stored_amount),
        memo: row.get(8)?,
        user_id: row.get(9)?,
        category_id: row.get(10)?,
        company_id: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}
