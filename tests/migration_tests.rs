mod support;

use std::sync::Arc;

use rust_decimal_macros::dec;
use support::{strategy_err, tokens};
use yieldkeeper::adapter::outbound::memory::{Fault, InMemoryLendingPool};
use yieldkeeper::application::Strategy;
use yieldkeeper::domain::{AccountId, InvestOutcome, MigrationMode, Region};
use yieldkeeper::error::StrategyError;
use yieldkeeper::port::outbound::LendingVenue;
use yieldkeeper::testkit::deployment::Deployment;

/// 10,000 idle plus 10,000 deployed.
async fn mixed_position(mode: MigrationMode) -> Deployment {
    let d = Deployment::builder()
        .migration_mode(mode)
        .funded(tokens(10_000))
        .build();
    d.strategy.invest(&d.vault_address()).await.unwrap();
    d.fund(tokens(10_000));
    d
}

#[tokio::test]
async fn in_kind_migration_moves_whole_position() {
    let d = mixed_position(MigrationMode::InKind).await;
    let target = d.spawn(AccountId::new("strategy-v2"));
    let before = d.strategy.snapshot().await.unwrap();

    let report = d.strategy.migrate(&d.vault_address(), &target).await.unwrap();

    let source = d.strategy.snapshot().await.unwrap();
    assert_eq!(source.region(), Region::Empty);
    assert_eq!(target.want_balance().await.unwrap(), tokens(10_000));
    assert!(target.aave_want_balance().await.unwrap() >= tokens(10_000));
    assert_eq!(target.snapshot().await.unwrap().total(), before.total());
    assert_eq!(report.value_before, before.total());
    assert_eq!(report.want_transferred, tokens(10_000));
    assert_eq!(report.receipt_transferred, tokens(10_000));
    assert_eq!(report.realized_loss, dec!(0));
}

#[tokio::test]
async fn withdraw_mode_hands_over_want_only() {
    let d = mixed_position(MigrationMode::Withdraw).await;
    d.pool.accrue(dec!(0.02));
    let target = d.spawn(AccountId::new("strategy-v2"));
    let before = d.strategy.snapshot().await.unwrap();

    let report = d.strategy.migrate(&d.vault_address(), &target).await.unwrap();

    assert_eq!(d.strategy.snapshot().await.unwrap().total(), dec!(0));
    assert_eq!(target.aave_want_balance().await.unwrap(), dec!(0));
    assert_eq!(target.want_balance().await.unwrap(), report.want_transferred);
    assert_eq!(report.receipt_transferred, dec!(0));
    assert_eq!(
        report.realized_loss,
        before.total() - report.want_transferred
    );
    assert_eq!(report.realized_loss, dec!(0));
}

#[tokio::test]
async fn failed_second_leg_returns_receipts() {
    let d = mixed_position(MigrationMode::InKind).await;
    let target = d.spawn(AccountId::new("strategy-v2"));
    d.token.fail_next_transfers(1);

    let err = strategy_err(d.strategy.migrate(&d.vault_address(), &target).await);

    assert!(matches!(
        err,
        StrategyError::ExternalCallFailure {
            operation: "transfer",
            ..
        }
    ));
    assert_eq!(d.idle(), tokens(10_000));
    assert_eq!(d.deployed(), tokens(10_000));
    assert_eq!(target.snapshot().await.unwrap().total(), dec!(0));
}

#[tokio::test]
async fn failed_transfer_after_withdrawal_redeploys() {
    let d = mixed_position(MigrationMode::Withdraw).await;
    let target = d.spawn(AccountId::new("strategy-v2"));
    d.token.block_recipient(target.address());

    assert!(d.strategy.migrate(&d.vault_address(), &target).await.is_err());

    assert_eq!(d.idle(), tokens(10_000));
    assert_eq!(d.deployed(), tokens(10_000));
    assert_eq!(target.snapshot().await.unwrap().total(), dec!(0));
}

#[tokio::test]
async fn failed_withdrawal_aborts_migration() {
    let d = mixed_position(MigrationMode::Withdraw).await;
    let target = d.spawn(AccountId::new("strategy-v2"));
    d.token.fail_next_transfers(1);

    let err = strategy_err(d.strategy.migrate(&d.vault_address(), &target).await);

    assert!(matches!(
        err,
        StrategyError::ExternalCallFailure {
            operation: "withdraw",
            ..
        }
    ));
    assert_eq!(d.deployed(), tokens(10_000));
}

#[tokio::test]
async fn failed_receipt_transfer_moves_nothing() {
    let d = mixed_position(MigrationMode::InKind).await;
    let target = d.spawn(AccountId::new("strategy-v2"));
    d.pool.inject(Fault::Reject);

    assert!(d.strategy.migrate(&d.vault_address(), &target).await.is_err());

    assert_eq!(d.idle(), tokens(10_000));
    assert_eq!(d.deployed(), tokens(10_000));
}

#[tokio::test]
async fn only_vault_may_migrate() {
    let d = mixed_position(MigrationMode::InKind).await;
    let target = d.spawn(AccountId::new("strategy-v2"));

    let err = strategy_err(d.strategy.migrate(&d.keeper_address(), &target).await);

    assert!(matches!(
        err,
        StrategyError::Unauthorized {
            operation: "migrate",
            ..
        }
    ));
    assert_eq!(d.idle(), tokens(10_000));
}

#[tokio::test]
async fn target_on_another_venue_is_rejected() {
    let d = mixed_position(MigrationMode::InKind).await;
    let other_pool = Arc::new(InMemoryLendingPool::new(
        AccountId::new("other-pool"),
        Arc::clone(&d.token),
    ));
    let params = d.params_for(AccountId::new("strategy-v2"), d.asset.clone());
    let target = Strategy::new(yieldkeeper::application::StrategyParams {
        venue: other_pool as Arc<dyn LendingVenue>,
        ..params
    })
    .unwrap();

    let err = strategy_err(d.strategy.migrate(&d.vault_address(), &target).await);

    assert!(matches!(err, StrategyError::MigrationTargetMismatch { .. }));
    assert_eq!(d.deployed(), tokens(10_000));
}

#[tokio::test]
async fn migrating_to_itself_is_rejected() {
    let d = mixed_position(MigrationMode::InKind).await;

    let err = strategy_err(d.strategy.migrate(&d.vault_address(), &d.strategy).await);

    assert!(matches!(err, StrategyError::MigrationTargetMismatch { .. }));
}

#[tokio::test]
async fn busy_target_is_locked_out() {
    let d = mixed_position(MigrationMode::InKind).await;
    let target = d.spawn(AccountId::new("strategy-v2"));
    let _guard = target.acquire("harvest").unwrap();

    let err = strategy_err(d.strategy.migrate(&d.vault_address(), &target).await);

    assert!(matches!(err, StrategyError::Locked { .. }));
    assert_eq!(d.idle(), tokens(10_000));
    assert_eq!(d.strategy.busy_with(), None);
}

#[tokio::test]
async fn retired_strategy_acts_on_zero_balances() {
    let d = mixed_position(MigrationMode::InKind).await;
    let target = d.spawn(AccountId::new("strategy-v2"));
    d.strategy.migrate(&d.vault_address(), &target).await.unwrap();

    assert_eq!(
        d.strategy.invest(&d.vault_address()).await.unwrap(),
        InvestOutcome::Skipped
    );
    let err = strategy_err(d.strategy.harvest(&d.vault_address()).await);
    assert!(matches!(err, StrategyError::InvalidAmount { .. }));
}
