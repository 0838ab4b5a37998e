//! Repository tests against a real SQLite file.

use creditline_core::{MutationAction, NewMutation, Tenor, TransactionRequest, TransactionStatus};
use creditline_persistence::{
    init_database, CustomerRepo, LimitRepo, MutationRepo, NewCustomer, PermissionRepo,
    PersistenceError, TransactionRepo,
};
use rust_decimal_macros::dec;
use sqlx::SqlitePool;
use std::time::Duration;
use tempfile::TempDir;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("test.db").display());
    let pool = init_database(&url, 4, Duration::from_secs(5)).await.unwrap();
    (dir, pool)
}

async fn customer(pool: &SqlitePool, email: &str, role: &str) -> i64 {
    CustomerRepo::insert(
        pool,
        &NewCustomer {
            email: email.to_string(),
            full_name: "Test Customer".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

fn request(contract: &str, tenor: i64) -> TransactionRequest {
    TransactionRequest {
        contract_number: contract.to_string(),
        otr: dec!(10000),
        admin_fee: dec!(500),
        installment_amount: dec!(1100),
        interest_amount: dec!(100),
        asset_name: "Motorcycle".to_string(),
        tenor,
    }
}

#[tokio::test]
async fn test_customer_insert_and_lookup() {
    let (_dir, pool) = setup().await;
    let id = customer(&pool, "budi@example.com", "user").await;

    let row = CustomerRepo::find_by_id(&pool, id).await.unwrap();
    assert_eq!(row.email, "budi@example.com");
    assert_eq!(row.role, "user");
    assert!(CustomerRepo::exists(&pool, id).await.unwrap());
    assert!(!CustomerRepo::exists(&pool, id + 100).await.unwrap());

    let err = CustomerRepo::find_by_id(&pool, id + 100).await.unwrap_err();
    assert!(err.is_not_found_for("Customer"));
}

#[tokio::test]
async fn test_customer_unknown_role() {
    let (_dir, pool) = setup().await;
    let err = CustomerRepo::insert(
        &pool,
        &NewCustomer {
            email: "x@example.com".to_string(),
            full_name: "X".to_string(),
            role: "superuser".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found_for("Role"));
}

#[tokio::test]
async fn test_permissions_follow_role() {
    let (_dir, pool) = setup().await;
    let id = customer(&pool, "ani@example.com", "user").await;

    let perms = PermissionRepo::names_for_customer(&pool, id).await.unwrap();
    assert_eq!(perms, vec!["create-transaction", "get-limit"]);

    let mut conn = pool.acquire().await.unwrap();
    CustomerRepo::assign_role(&mut conn, id, "admin").await.unwrap();
    drop(conn);

    let perms = PermissionRepo::names_for_customer(&pool, id).await.unwrap();
    assert_eq!(perms, vec!["create-limit", "delete-limit"]);

    let err = PermissionRepo::names_for_customer(&pool, 999).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_limit_crud_inside_transaction() {
    let (_dir, pool) = setup().await;
    let owner = customer(&pool, "citra@example.com", "user").await;

    let mut tx = pool.begin().await.unwrap();
    let six = LimitRepo::create(&mut tx, owner, Tenor::SixMonths, dec!(700)).await.unwrap();
    let one = LimitRepo::create(&mut tx, owner, Tenor::OneMonth, dec!(100)).await.unwrap();
    tx.commit().await.unwrap();

    let limits = LimitRepo::find_by_customer(&pool, owner).await.unwrap();
    let tenors: Vec<Tenor> = limits.iter().map(|l| l.tenor).collect();
    assert_eq!(tenors, vec![Tenor::OneMonth, Tenor::SixMonths]);

    assert_eq!(LimitRepo::owner_of(&pool, six.id).await.unwrap(), owner);
    let found = LimitRepo::find_for_tenor(&pool, owner, Tenor::SixMonths).await.unwrap();
    assert_eq!(found.map(|l| l.id), Some(six.id));
    assert!(LimitRepo::find_for_tenor(&pool, owner, Tenor::TwoMonths)
        .await
        .unwrap()
        .is_none());

    LimitRepo::update(&pool, one.id, Tenor::TwoMonths, dec!(250.50)).await.unwrap();
    let updated = LimitRepo::find_by_id(&pool, one.id).await.unwrap();
    assert_eq!(updated.tenor, Tenor::TwoMonths);
    assert_eq!(updated.limit_amount, dec!(250.50));

    let mut conn = pool.acquire().await.unwrap();
    LimitRepo::delete(&mut conn, one.id).await.unwrap();
    drop(conn);

    assert!(LimitRepo::find_by_id(&pool, one.id).await.unwrap_err().is_not_found());
    assert!(LimitRepo::owner_of(&pool, one.id)
        .await
        .unwrap_err()
        .is_not_found_for("LimitOwner"));
}

#[tokio::test]
async fn test_rolled_back_limit_is_invisible() {
    let (_dir, pool) = setup().await;
    let owner = customer(&pool, "dewi@example.com", "user").await;

    let mut tx = pool.begin().await.unwrap();
    let limit = LimitRepo::create(&mut tx, owner, Tenor::OneMonth, dec!(100)).await.unwrap();
    tx.rollback().await.unwrap();

    assert!(LimitRepo::find_by_id(&pool, limit.id).await.unwrap_err().is_not_found());
    assert!(LimitRepo::find_by_customer(&pool, owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lock_owner_of_limit() {
    let (_dir, pool) = setup().await;
    let owner = customer(&pool, "eka@example.com", "user").await;

    let mut tx = pool.begin().await.unwrap();
    let limit = LimitRepo::create(&mut tx, owner, Tenor::ThreeMonths, dec!(300)).await.unwrap();
    assert_eq!(
        CustomerRepo::lock_owner_of_limit(&mut *tx, limit.id).await.unwrap(),
        Some(owner)
    );
    assert_eq!(CustomerRepo::lock_owner_of_limit(&mut *tx, 4242).await.unwrap(), None);
    CustomerRepo::lock(&mut *tx, owner).await.unwrap();
    assert!(CustomerRepo::lock(&mut *tx, 4242).await.unwrap_err().is_not_found());
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_transaction_store() {
    let (_dir, pool) = setup().await;
    let owner = customer(&pool, "fajar@example.com", "user").await;

    let first = TransactionRepo::insert(&pool, owner, Tenor::OneMonth, &request("CTR-1", 1), TransactionStatus::Pending)
        .await
        .unwrap();
    let second = TransactionRepo::insert(&pool, owner, Tenor::TwoMonths, &request("CTR-2", 2), TransactionStatus::Pending)
        .await
        .unwrap();

    let all = TransactionRepo::find_by_customer(&pool, owner).await.unwrap();
    assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![second.id, first.id]);
    assert_eq!(all[1].status, TransactionStatus::Pending);
    assert_eq!(all[1].otr, dec!(10000));

    let dup = TransactionRepo::insert(&pool, owner, Tenor::OneMonth, &request("CTR-1", 1), TransactionStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(dup, PersistenceError::UniqueViolation(_)));

    let mut conn = pool.acquire().await.unwrap();
    let (page, total) = TransactionRepo::find_by_customer_paginated(&mut conn, owner, 1, 1)
        .await
        .unwrap();
    drop(conn);
    assert_eq!(total, 2);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, first.id);

    TransactionRepo::update_status(&pool, first.id, TransactionStatus::Approved).await.unwrap();
    let reloaded = TransactionRepo::find_by_id(&pool, first.id).await.unwrap();
    assert_eq!(reloaded.status, TransactionStatus::Approved);

    TransactionRepo::delete(&pool, second.id).await.unwrap();
    assert_eq!(TransactionRepo::count(&pool).await.unwrap(), 1);
    assert!(TransactionRepo::find_by_id(&pool, second.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_ledger_is_append_only() {
    let (_dir, pool) = setup().await;
    let owner = customer(&pool, "gita@example.com", "user").await;

    let created = MutationRepo::append(&pool, &NewMutation::created(owner, 10, dec!(500)))
        .await
        .unwrap();
    MutationRepo::append(&pool, &NewMutation::usage(owner, 10, dec!(500), "CTR-9"))
        .await
        .unwrap();

    let entries = MutationRepo::find_by_customer(&pool, owner).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, MutationAction::Usage);
    assert_eq!(entries[1].id, created.id);
    assert_eq!(MutationRepo::find_by_limit(&pool, 10).await.unwrap().len(), 2);

    // Storage rejects edits even when issued outside the repository API
    let update = sqlx::query("UPDATE limit_mutations SET new_amount = '1' WHERE id = ?")
        .bind(created.id)
        .execute(&pool)
        .await;
    assert!(update.is_err());

    let delete = sqlx::query("DELETE FROM limit_mutations WHERE id = ?")
        .bind(created.id)
        .execute(&pool)
        .await;
    assert!(delete.is_err());
    assert_eq!(MutationRepo::find_by_customer(&pool, owner).await.unwrap().len(), 2);
}
