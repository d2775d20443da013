mod common;

use anyhow::Result;
use common::{Cooperative, test_service};
use koperasi_ledger::application::AppError;
use koperasi_ledger::storage::StoreError;
use uuid::Uuid;

#[tokio::test]
async fn test_deposit_updates_balance_and_snapshots() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    let recorded = service.record_transaction(&coop.deposit(100_000)).await?;
    assert!(!recorded.duplicate);
    assert_eq!(coop.savings_balance(&service).await?, 100_000);

    let transaction = service.get_transaction(recorded.id).await?;
    assert_eq!(transaction.balance_before, 0);
    assert_eq!(transaction.balance_after, 100_000);
    assert!(transaction.snapshots_consistent());

    Ok(())
}

#[tokio::test]
async fn test_withdrawal_reduces_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    service.record_transaction(&coop.deposit(100_000)).await?;
    let recorded = service.record_transaction(&coop.withdrawal(30_000)).await?;

    assert_eq!(coop.savings_balance(&service).await?, 70_000);

    let transaction = service.get_transaction(recorded.id).await?;
    assert_eq!(transaction.balance_before, 100_000);
    assert_eq!(transaction.balance_after, 70_000);
    assert_eq!(transaction.signed_amount(), -30_000);

    Ok(())
}

#[tokio::test]
async fn test_overdraw_fails_atomically() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    service.record_transaction(&coop.deposit(50_000)).await?;

    let err = service
        .record_transaction(&coop.withdrawal(80_000))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Store(StoreError::InsufficientBalance { .. })
    ));

    // Neither the balance nor the ledger changed.
    assert_eq!(coop.savings_balance(&service).await?, 50_000);
    assert_eq!(service.list_transactions(None).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_deposit_overflowing_saldo_fails_atomically() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    service.record_transaction(&coop.deposit(i64::MAX)).await?;

    let err = service
        .record_transaction(&coop.deposit(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Store(StoreError::BalanceOverflow { .. })
    ));

    // Neither the balance nor the ledger changed.
    assert_eq!(coop.savings_balance(&service).await?, i64::MAX);
    assert_eq!(service.list_transactions(None).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_loan_repayment_reduces_outstanding() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    service
        .record_transaction(&coop.loan_repayment(250_000))
        .await?;

    assert_eq!(
        coop.loan_balance(&service).await?,
        Cooperative::LOAN_PRINCIPAL - 250_000
    );

    Ok(())
}

#[tokio::test]
async fn test_legacy_loan_field_resolves() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    // Only the legacy field name is supplied.
    let mut input = coop.loan_repayment(100_000);
    input.pembiayaan_id = input.pinjaman_id.take();

    let recorded = service.record_transaction(&input).await?;
    let transaction = service.get_transaction(recorded.id).await?;
    assert_eq!(transaction.source.loan_id(), Some(coop.loan.id));

    Ok(())
}

#[tokio::test]
async fn test_loan_of_other_member_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    let other = service
        .create_member("Siti Rahayu".into(), "AG-0002".into())
        .await?;

    let mut input = coop.loan_repayment(100_000);
    input.anggota_id = Some(other.id.to_string());

    let err = service.record_transaction(&input).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Store(StoreError::LoanMemberMismatch { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_idempotency_key_replays_original() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    let mut input = coop.deposit(100_000);
    input.idempotency_key = Some("setoran-2026-001".into());

    let first = service.record_transaction(&input).await?;
    let second = service.record_transaction(&input).await?;

    assert!(!first.duplicate);
    assert!(second.duplicate);
    assert_eq!(first.id, second.id);

    // Applied exactly once.
    assert_eq!(coop.savings_balance(&service).await?, 100_000);
    assert_eq!(service.list_transactions(None).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_delete_reverses_balance_mutation() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    let recorded = service.record_transaction(&coop.deposit(100_000)).await?;
    assert_eq!(coop.savings_balance(&service).await?, 100_000);

    service.delete_transaction(recorded.id).await?;

    assert_eq!(coop.savings_balance(&service).await?, 0);
    assert!(service.list_transactions(None).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_delete_refuses_to_overdraw_savings() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    let deposit = service.record_transaction(&coop.deposit(100_000)).await?;
    service.record_transaction(&coop.withdrawal(80_000)).await?;

    // Reversing the deposit would leave the account at -80.000.
    let err = service.delete_transaction(deposit.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Store(StoreError::ReversalOverdraws { .. })
    ));

    // Nothing changed: both entries still present, balance intact.
    assert_eq!(coop.savings_balance(&service).await?, 20_000);
    assert_eq!(service.list_transactions(None).await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_delete_restores_loan_outstanding() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    let repayment = service
        .record_transaction(&coop.loan_repayment(250_000))
        .await?;
    service.delete_transaction(repayment.id).await?;

    assert_eq!(
        coop.loan_balance(&service).await?,
        Cooperative::LOAN_PRINCIPAL
    );

    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_transaction_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Cooperative::seed(&service).await?;

    let err = service
        .delete_transaction(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}

#[tokio::test]
async fn test_unknown_member_is_rejected_by_store() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    let mut input = coop.deposit(10_000);
    input.anggota_id = Some(Uuid::new_v4().to_string());

    let err = service.record_transaction(&input).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Store(StoreError::MemberNotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_feed_limit_is_clamped() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    for _ in 0..3 {
        service.record_transaction(&coop.deposit(10_000)).await?;
    }

    assert_eq!(service.list_transactions(Some(2)).await?.len(), 2);
    // Nonsense limits fall back into range instead of erroring.
    assert_eq!(service.list_transactions(Some(-5)).await?.len(), 1);
    assert_eq!(service.list_transactions(Some(10_000)).await?.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_feed_joins_member_and_account_context() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let coop = Cooperative::seed(&service).await?;

    service.record_transaction(&coop.deposit(100_000)).await?;

    let feed = service.list_transactions(None).await?;
    assert_eq!(feed.len(), 1);

    let row = &feed[0];
    assert_eq!(row.member_name.as_deref(), Some("Budi Santoso"));
    assert_eq!(row.member_number.as_deref(), Some("AG-0001"));
    assert_eq!(row.savings_account_id, Some(coop.savings_account.id));
    assert_eq!(row.savings_type_name.as_deref(), Some("Simpanan Sukarela"));
    assert_eq!(row.loan_id, None);

    Ok(())
}
