#![allow(clippy::unwrap_used)]

use super::*;
use crate::db::{Database, TransactionFilter};
use rust_decimal_macros::dec;

fn test_db() -> (Database, i64) {
    let db = Database::open_in_memory().unwrap();
    let user_id = db.insert_user("demo", "demo@example.com").unwrap();
    (db, user_id)
}

fn base_input(user_id: i64) -> TransactionInput {
    TransactionInput {
        date: "2024-01-15".into(),
        description: "Grocery Store".into(),
        amount: "-85.50".into(),
        user_id,
        ..Default::default()
    }
}

// ── record_transaction ────────────────────────────────────────

#[test]
fn test_record_transaction() {
    let (db, user_id) = test_db();
    let id = record_transaction(&db, &base_input(user_id)).unwrap();

    let txn = db.get_transaction_by_id(id).unwrap().unwrap();
    assert_eq!(txn.amount, dec!(-85.50));
    assert_eq!(txn.description, "Grocery Store");
    assert_eq!(txn.transaction_date, "2024-01-15T00:00:00");
    assert_eq!(txn.user_id, user_id);
}

#[test]
fn test_type_defaults_to_expense() {
    let (db, user_id) = test_db();
    let id = record_transaction(&db, &base_input(user_id)).unwrap();
    let txn = db.get_transaction_by_id(id).unwrap().unwrap();
    assert_eq!(txn.transaction_type.as_deref(), Some("expense"));
}

#[test]
fn test_type_is_kept_verbatim() {
    let (db, user_id) = test_db();
    let mut input = base_input(user_id);
    input.amount = "3000.00".into();
    input.transaction_type = Some("income".into());
    let id = record_transaction(&db, &input).unwrap();
    let txn = db.get_transaction_by_id(id).unwrap().unwrap();
    assert_eq!(txn.transaction_type.as_deref(), Some("income"));
}

#[test]
fn test_accepted_date_formats() {
    let (db, user_id) = test_db();
    for (raw, canonical) in [
        ("2024-01-15", "2024-01-15T00:00:00"),
        ("2024-01-15T10:30:00", "2024-01-15T10:30:00"),
        ("2024-01-15 10:30:00", "2024-01-15T10:30:00"),
        ("2024-01-15T10:30:00+00:00", "2024-01-15T10:30:00"),
    ] {
        let mut input = base_input(user_id);
        input.date = raw.into();
        let id = record_transaction(&db, &input).unwrap();
        let txn = db.get_transaction_by_id(id).unwrap().unwrap();
        assert_eq!(txn.transaction_date, canonical, "for input {raw}");
    }
}

#[test]
fn test_unparsable_date_writes_nothing() {
    let (db, user_id) = test_db();
    let mut input = base_input(user_id);
    input.date = "next tuesday".into();
    let err = record_transaction(&db, &input).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(db.transaction_count().unwrap(), 0);
}

#[test]
fn test_blank_description_rejected() {
    let (db, user_id) = test_db();
    let mut input = base_input(user_id);
    input.description = "   ".into();
    let err = record_transaction(&db, &input).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(db.transaction_count().unwrap(), 0);
}

#[test]
fn test_overlong_description_rejected() {
    let (db, user_id) = test_db();
    let mut input = base_input(user_id);
    input.description = "x".repeat(501);
    let err = record_transaction(&db, &input).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn test_bad_amount_rejected() {
    let (db, user_id) = test_db();
    for raw in ["", "  ", "twelve", "1.2.3"] {
        let mut input = base_input(user_id);
        input.amount = raw.into();
        let err = record_transaction(&db, &input).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "for {raw:?}");
    }
    assert_eq!(db.transaction_count().unwrap(), 0);
}

#[test]
fn test_bad_balance_rejected() {
    let (db, user_id) = test_db();
    let mut input = base_input(user_id);
    input.balance = Some("lots".into());
    let err = record_transaction(&db, &input).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn test_optional_fields_stored() {
    let (db, user_id) = test_db();
    let mut input = base_input(user_id);
    input.institution = Some("First Bank".into());
    input.account_number = Some("0042".into());
    input.balance = Some("914.50".into());
    input.memo = Some("weekly shop".into());
    let id = record_transaction(&db, &input).unwrap();

    let txn = db.get_transaction_by_id(id).unwrap().unwrap();
    assert_eq!(txn.institution.as_deref(), Some("First Bank"));
    assert_eq!(txn.account_number.as_deref(), Some("0042"));
    assert_eq!(txn.balance, Some(dec!(914.50)));
    assert_eq!(txn.memo.as_deref(), Some("weekly shop"));
}

#[test]
fn test_unknown_user_surfaces_reference_error() {
    let (db, _) = test_db();
    let err = record_transaction(&db, &base_input(999)).unwrap_err();
    assert!(matches!(err, LedgerError::Reference(_)));
    assert_eq!(db.transaction_count().unwrap(), 0);
}

#[test]
fn test_record_with_category_and_company() {
    let (db, user_id) = test_db();
    let cat_id = define_category(&db, "Food", "Groceries", None).unwrap();
    let company_id = register_company(&db, "Corner Shop", Some("merchant"), None, false).unwrap();

    let mut input = base_input(user_id);
    input.category_id = Some(cat_id);
    input.company_id = Some(company_id);
    let id = record_transaction(&db, &input).unwrap();

    let txn = db.get_transaction_by_id(id).unwrap().unwrap();
    assert_eq!(txn.category_id, Some(cat_id));
    assert_eq!(txn.company_id, Some(company_id));

    let txns = db
        .get_transactions(&TransactionFilter {
            category_id: Some(cat_id),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(txns.len(), 1);
}

// ── define_category ───────────────────────────────────────────

#[test]
fn test_define_category() {
    let (db, _) = test_db();
    let id = define_category(&db, "Food", "Groceries", Some("Produce")).unwrap();
    let cat = db.get_category_by_id(id).unwrap().unwrap();
    assert_eq!(cat.big_category, "Food");
    assert_eq!(cat.item_category.as_deref(), Some("Produce"));
}

#[test]
fn test_blank_sub_category_rejected() {
    let (db, _) = test_db();
    let err = define_category(&db, "Food", "  ", None).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(db.get_categories(false).unwrap().is_empty());
}

#[test]
fn test_blank_big_category_rejected() {
    let (db, _) = test_db();
    let err = define_category(&db, "", "Groceries", None).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn test_blank_item_category_normalized() {
    let (db, _) = test_db();
    let id = define_category(&db, "Food", "Groceries", Some("  ")).unwrap();
    let cat = db.get_category_by_id(id).unwrap().unwrap();
    assert!(cat.item_category.is_none());
}

// ── provisioning ──────────────────────────────────────────────

#[test]
fn test_provision_user_validation() {
    let (db, _) = test_db();
    assert!(matches!(
        provision_user(&db, "", "a@b.test").unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert!(matches!(
        provision_user(&db, "alice", "not-an-email").unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert!(provision_user(&db, "alice", "alice@example.com").is_ok());
}

#[test]
fn test_register_company_requires_name() {
    let (db, _) = test_db();
    let err = register_company(&db, "  ", None, None, false).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

// ── define_budget ─────────────────────────────────────────────

#[test]
fn test_define_budget() {
    let (db, user_id) = test_db();
    let cat_id = define_category(&db, "Food", "Groceries", None).unwrap();
    let id = define_budget(
        &db,
        &BudgetInput {
            category_id: cat_id,
            user_id,
            monthly_limit: "100".into(),
            yearly_limit: Some("1200".into()),
            start_date: "2024-01-01".into(),
            end_date: None,
        },
    )
    .unwrap();

    let budgets = db.get_budgets(true).unwrap();
    assert_eq!(budgets[0].id, Some(id));
    assert_eq!(budgets[0].monthly_limit, dec!(100));
}

#[test]
fn test_define_budget_bad_limit() {
    let (db, user_id) = test_db();
    let cat_id = define_category(&db, "Food", "Groceries", None).unwrap();
    let err = define_budget(
        &db,
        &BudgetInput {
            category_id: cat_id,
            user_id,
            monthly_limit: "a hundred".into(),
            yearly_limit: None,
            start_date: "2024-01-01".into(),
            end_date: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn test_define_budget_bad_date() {
    let (db, user_id) = test_db();
    let cat_id = define_category(&db, "Food", "Groceries", None).unwrap();
    let err = define_budget(
        &db,
        &BudgetInput {
            category_id: cat_id,
            user_id,
            monthly_limit: "100".into(),
            yearly_limit: None,
            start_date: "January 1st".into(),
            end_date: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}
