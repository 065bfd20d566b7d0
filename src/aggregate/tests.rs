#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

use crate::ledger::{self, TransactionInput};

fn test_db() -> (Database, i64) {
    let db = Database::open_in_memory().unwrap();
    let user_id = db.insert_user("demo", "demo@example.com").unwrap();
    (db, user_id)
}

fn record(db: &Database, user_id: i64, date: &str, amount: &str, category_id: Option<i64>) {
    ledger::record_transaction(
        db,
        &TransactionInput {
            date: date.into(),
            description: "txn".into(),
            amount: amount.into(),
            category_id,
            user_id,
            ..Default::default()
        },
    )
    .unwrap();
}

/// Groceries -85.50, uncategorized +3000.00, restaurants -45.20.
fn scenario_a(db: &Database, user_id: i64) -> (i64, i64) {
    let groceries = ledger::define_category(db, "Food", "Groceries", None).unwrap();
    let restaurants = ledger::define_category(db, "Food", "Restaurants", None).unwrap();
    record(db, user_id, "2024-03-01", "-85.50", Some(groceries));
    record(db, user_id, "2024-03-02", "3000.00", None);
    record(db, user_id, "2024-03-03", "-45.20", Some(restaurants));
    (groceries, restaurants)
}

#[test]
fn test_totals_scenario() {
    let (db, user_id) = test_db();
    scenario_a(&db, user_id);

    let t = totals(&db).unwrap();
    assert_eq!(t.total_income, dec!(3000.00));
    assert_eq!(t.total_expenses, dec!(130.70));
    assert_eq!(t.balance, dec!(2869.30));
}

#[test]
fn test_balance_reconstructs_from_totals() {
    let (db, user_id) = test_db();
    scenario_a(&db, user_id);
    record(&db, user_id, "2024-03-04", "-0.01", None);
    record(&db, user_id, "2024-03-05", "12.34", None);

    let t = totals(&db).unwrap();
    // Exact fixed-point identity, no epsilon needed.
    assert_eq!(t.total_income - t.total_expenses, t.balance);
}

#[test]
fn test_totals_empty_ledger() {
    let (db, _) = test_db();
    let t = totals(&db).unwrap();
    assert_eq!(t.total_income, Decimal::ZERO);
    assert_eq!(t.total_expenses, Decimal::ZERO);
    assert_eq!(t.balance, Decimal::ZERO);
}

#[test]
fn test_zero_amount_counts_in_neither_total() {
    let (db, user_id) = test_db();
    record(&db, user_id, "2024-03-01", "0", None);
    record(&db, user_id, "2024-03-02", "0.00", None);

    let t = totals(&db).unwrap();
    assert_eq!(t.total_income, Decimal::ZERO);
    assert_eq!(t.total_expenses, Decimal::ZERO);
    assert_eq!(t.balance, Decimal::ZERO);
    // Zero-amount rows still show up in the activity feed.
    assert_eq!(recent_activity(&db, 10).unwrap().len(), 2);
}

#[test]
fn test_category_spend_scenario() {
    let (db, user_id) = test_db();
    let (groceries, restaurants) = scenario_a(&db, user_id);

    assert_eq!(category_spend(&db, groceries).unwrap(), dec!(85.50));
    assert_eq!(category_spend(&db, restaurants).unwrap(), dec!(45.20));
}

#[test]
fn test_category_spend_without_transactions_is_zero() {
    let (db, _) = test_db();
    let empty = ledger::define_category(&db, "Travel", "Flights", None).unwrap();
    assert_eq!(category_spend(&db, empty).unwrap(), Decimal::ZERO);
}

#[test]
fn test_category_spend_ignores_income_in_category() {
    let (db, user_id) = test_db();
    let cat = ledger::define_category(&db, "Food", "Groceries", None).unwrap();
    record(&db, user_id, "2024-03-01", "-85.50", Some(cat));
    // A refund credited to the same category does not reduce spend.
    record(&db, user_id, "2024-03-02", "20.00", Some(cat));

    assert_eq!(category_spend(&db, cat).unwrap(), dec!(85.50));
}

#[test]
fn test_category_spend_between() {
    let (db, user_id) = test_db();
    let cat = ledger::define_category(&db, "Food", "Groceries", None).unwrap();
    record(&db, user_id, "2024-02-15", "-10.00", Some(cat));
    record(&db, user_id, "2024-03-15", "-25.00", Some(cat));
    record(&db, user_id, "2024-04-15", "-40.00", Some(cat));

    let march = category_spend_between(&db, cat, "2024-03-01", "2024-04-01").unwrap();
    assert_eq!(march, dec!(25.00));
}

#[test]
fn test_recent_activity_order_and_limit() {
    let (db, user_id) = test_db();
    for day in 1..=7 {
        record(&db, user_id, &format!("2024-03-{day:02}"), "-1.00", None);
    }

    let recent = recent_activity(&db, 5).unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].transaction_date, "2024-03-07T00:00:00");
    assert_eq!(recent[4].transaction_date, "2024-03-03T00:00:00");
}

#[test]
fn test_recent_activity_ties_broken_by_arrival() {
    let (db, user_id) = test_db();
    record(&db, user_id, "2024-03-01", "-1.00", None);
    record(&db, user_id, "2024-03-01", "-2.00", None);

    let recent = recent_activity(&db, 2).unwrap();
    assert_eq!(recent[0].amount, dec!(-2.00));
    assert_eq!(recent[1].amount, dec!(-1.00));
}

#[test]
fn test_reads_are_idempotent() {
    let (db, user_id) = test_db();
    scenario_a(&db, user_id);

    assert_eq!(totals(&db).unwrap(), totals(&db).unwrap());
    let a = recent_activity(&db, 5).unwrap();
    let b = recent_activity(&db, 5).unwrap();
    let ids =
        |v: &[crate::models::Transaction]| v.iter().map(|t| t.id).collect::<Vec<_>>();
    assert_eq!(ids(&a), ids(&b));
}

#[test]
fn test_reads_reflect_latest_write() {
    let (db, user_id) = test_db();
    scenario_a(&db, user_id);
    let before = totals(&db).unwrap();
    record(&db, user_id, "2024-03-09", "-100.00", None);
    let after = totals(&db).unwrap();
    assert_eq!(after.total_expenses, before.total_expenses + dec!(100.00));
}
