mod common;

use common::{customer, setup};
use creditline_business::{BusinessError, LimitLifecycle};
use creditline_core::{MutationAction, Tenor};
use creditline_persistence::LimitRepo;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_scenario_b_duplicate_tenor_keeps_prior_limit() {
    let env = setup().await;
    let id = customer(&env.ctx, "budi@example.com").await;
    let lifecycle = LimitLifecycle::new(&env.ctx);

    let first = lifecycle.grant(id, 1, dec!(500)).await.unwrap();
    let err = lifecycle.grant(id, 1, dec!(700)).await.unwrap_err();

    assert!(matches!(
        err,
        BusinessError::DuplicateTenor { customer_id, tenor: Tenor::OneMonth } if customer_id == id
    ));
    assert!(err.is_rejection());

    let limits = lifecycle.limits_for_customer(id).await.unwrap();
    assert_eq!(limits.len(), 1);
    assert_eq!(limits[0].id, first.id);
    assert_eq!(limits[0].limit_amount, dec!(500));

    // Chỉ có một CREATE entry
    let ledger = lifecycle.mutations_for_customer(id).await.unwrap();
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn test_exclusivity_is_per_customer_and_tenor() {
    let env = setup().await;
    let a = customer(&env.ctx, "a@example.com").await;
    let b = customer(&env.ctx, "b@example.com").await;
    let lifecycle = LimitLifecycle::new(&env.ctx);

    for tenor in [1, 2, 3, 6] {
        lifecycle.grant(a, tenor, dec!(1000)).await.unwrap();
    }
    lifecycle.grant(b, 1, dec!(1000)).await.unwrap();

    let tenors: Vec<Tenor> = lifecycle
        .limits_for_customer(a)
        .await
        .unwrap()
        .iter()
        .map(|l| l.tenor)
        .collect();
    assert_eq!(tenors, Tenor::all().to_vec());

    for tenor in [1, 2, 3, 6] {
        let err = lifecycle.grant(a, tenor, dec!(1)).await.unwrap_err();
        assert!(matches!(err, BusinessError::DuplicateTenor { .. }));
    }
}

#[tokio::test]
async fn test_grant_validation_and_missing_customer() {
    let env = setup().await;
    let id = customer(&env.ctx, "c@example.com").await;
    let lifecycle = LimitLifecycle::new(&env.ctx);

    let err = lifecycle.grant(id, 4, dec!(100)).await.unwrap_err();
    assert!(err.is_validation());

    let err = lifecycle.grant(id, 1, dec!(-1)).await.unwrap_err();
    assert!(err.is_validation());

    let err = lifecycle.grant(id + 999, 1, dec!(100)).await.unwrap_err();
    assert!(matches!(err, BusinessError::CustomerNotFound(_)));

    assert!(lifecycle.limits_for_customer(id).await.unwrap().is_empty());
    assert!(lifecycle.mutations_for_customer(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scenario_c_update_records_before_and_after() {
    let env = setup().await;
    let id = customer(&env.ctx, "dewi@example.com").await;
    let lifecycle = LimitLifecycle::new(&env.ctx);

    let limit = lifecycle.grant(id, 1, dec!(100000)).await.unwrap();
    lifecycle.update(limit.id, 2, dec!(200000)).await.unwrap();

    let stored = LimitRepo::find_by_id(env.ctx.pool(), limit.id).await.unwrap();
    assert_eq!(stored.tenor, Tenor::TwoMonths);
    assert_eq!(stored.limit_amount, dec!(200000));

    let ledger = lifecycle.mutations_for_limit(limit.id).await.unwrap();
    assert_eq!(ledger.len(), 2);
    let update = &ledger[0];
    assert_eq!(update.action, MutationAction::Update);
    assert_eq!(update.customer_id, id);
    assert_eq!(update.old_amount, dec!(100000));
    assert_eq!(update.new_amount, dec!(200000));
}

#[tokio::test]
async fn test_update_rejects_tenor_held_by_another_limit() {
    let env = setup().await;
    let id = customer(&env.ctx, "eka@example.com").await;
    let lifecycle = LimitLifecycle::new(&env.ctx);

    let one = lifecycle.grant(id, 1, dec!(100)).await.unwrap();
    lifecycle.grant(id, 2, dec!(200)).await.unwrap();

    let err = lifecycle.update(one.id, 2, dec!(300)).await.unwrap_err();
    assert!(matches!(err, BusinessError::DuplicateTenor { tenor: Tenor::TwoMonths, .. }));

    // Cùng tenor, chỉ đổi amount thì được
    lifecycle.update(one.id, 1, dec!(150)).await.unwrap();
    let stored = LimitRepo::find_by_id(env.ctx.pool(), one.id).await.unwrap();
    assert_eq!(stored.limit_amount, dec!(150));
}

#[tokio::test]
async fn test_update_and_revoke_missing_limit() {
    let env = setup().await;
    let lifecycle = LimitLifecycle::new(&env.ctx);

    let err = lifecycle.update(404, 1, dec!(1)).await.unwrap_err();
    assert!(matches!(err, BusinessError::LimitNotFound(404)));

    let err = lifecycle.revoke(404).await.unwrap_err();
    assert!(matches!(err, BusinessError::LimitNotFound(404)));

    let err = lifecycle.update(404, 5, dec!(1)).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_orphan_limit_reports_owner_not_found() {
    let env = setup().await;
    let id = customer(&env.ctx, "fajar@example.com").await;
    let lifecycle = LimitLifecycle::new(&env.ctx);
    let limit = lifecycle.grant(id, 3, dec!(900)).await.unwrap();

    sqlx::query("DELETE FROM customer_has_tenor_limit WHERE tenor_limit_id = ?")
        .bind(limit.id)
        .execute(env.ctx.pool())
        .await
        .unwrap();

    let err = lifecycle.update(limit.id, 3, dec!(1000)).await.unwrap_err();
    assert!(matches!(err, BusinessError::OwnerNotFound(lid) if lid == limit.id));

    let err = lifecycle.revoke(limit.id).await.unwrap_err();
    assert!(matches!(err, BusinessError::OwnerNotFound(_)));

    let stored = LimitRepo::find_by_id(env.ctx.pool(), limit.id).await.unwrap();
    assert_eq!(stored.limit_amount, dec!(900));
}

#[tokio::test]
async fn test_scenario_d_revoke() {
    let env = setup().await;
    let id = customer(&env.ctx, "gita@example.com").await;
    let lifecycle = LimitLifecycle::new(&env.ctx);

    let limit = lifecycle.grant(id, 6, dec!(50000)).await.unwrap();
    lifecycle.revoke(limit.id).await.unwrap();

    let err = LimitRepo::find_by_id(env.ctx.pool(), limit.id).await.unwrap_err();
    assert!(err.is_not_found());

    let ledger = lifecycle.mutations_for_limit(limit.id).await.unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[0].action, MutationAction::Delete);
    assert_eq!(ledger[0].old_amount, dec!(50000));
    assert_eq!(ledger[0].new_amount, dec!(0));

    // Revoke rồi grant lại cùng tenor là hợp lệ
    lifecycle.grant(id, 6, dec!(10)).await.unwrap();

    let err = lifecycle.revoke(limit.id).await.unwrap_err();
    assert!(matches!(err, BusinessError::LimitNotFound(_)));
}

#[tokio::test]
async fn test_lifecycle_writes_audit_journal() {
    let env = setup().await;
    let id = customer(&env.ctx, "hadi@example.com").await;
    let lifecycle = LimitLifecycle::new(&env.ctx);

    let limit = lifecycle.grant(id, 1, dec!(100)).await.unwrap();
    lifecycle.update(limit.id, 1, dec!(200)).await.unwrap();
    lifecycle.revoke(limit.id).await.unwrap();

    let records = env.ctx.audit_reader().recent(None).unwrap();
    let actions: Vec<MutationAction> = records.iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![MutationAction::Delete, MutationAction::Update, MutationAction::Create]
    );
    assert!(records.iter().all(|r| r.customer_id == id && r.tenor_limit_id == limit.id));
}
