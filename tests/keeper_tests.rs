mod support;

use std::time::Duration;

use rust_decimal_macros::dec;
use support::{assert_close, tokens};
use tokio::sync::watch;
use yieldkeeper::adapter::outbound::memory::Fault;
use yieldkeeper::testkit::deployment::Deployment;

#[tokio::test]
async fn keeper_cycle_invests_harvests_and_reinvests() {
    let d = Deployment::builder().funded(tokens(10_000)).build();
    let keeper = d.keeper();

    let first = keeper.tick().await;
    assert_eq!(first.invested.map(|o| o.deposited()), Some(tokens(10_000)));
    assert!(first.harvested.is_none());

    d.clock.advance(chrono::Duration::hours(24));
    d.pool.accrue(dec!(0.001));
    let second = keeper.tick().await;

    let report = second.harvested.expect("harvest should have run");
    assert_eq!(report.gain, tokens(10));
    assert_eq!(second.invested.map(|o| o.deposited()), Some(tokens(10_010)));
    assert_eq!(d.idle(), dec!(0));
    assert_close(d.deployed(), tokens(10_010));
    assert_eq!(d.vault.reports().len(), 1);
}

#[tokio::test]
async fn keeper_skips_harvest_when_nothing_is_deployed() {
    let d = Deployment::builder().build();
    d.clock.advance(chrono::Duration::days(2));

    let tick = d.keeper().tick().await;

    assert!(tick.is_idle());
    assert!(tick.failures.is_empty());
    assert!(d.vault.reports().is_empty());
}

#[tokio::test]
async fn keeper_records_failures_and_carries_on() {
    let d = Deployment::builder().funded(tokens(100)).build();
    let keeper = d.keeper();
    d.pool.inject(Fault::Error);

    let failed = keeper.tick().await;
    assert_eq!(failed.failures.len(), 1);
    assert_eq!(d.idle(), tokens(100));

    let retried = keeper.tick().await;
    assert!(retried.failures.is_empty());
    assert_eq!(d.deployed(), tokens(100));
}

#[tokio::test(start_paused = true)]
async fn run_until_stops_on_shutdown() {
    let d = Deployment::builder().funded(tokens(100)).build();
    let keeper = d.keeper();
    let (shutdown, watcher) = watch::channel(false);

    let stop = async {
        tokio::time::sleep(Duration::from_millis(55)).await;
        shutdown.send(true).unwrap();
    };
    let (ticks, ()) = tokio::join!(keeper.run_until(watcher), stop);

    assert!(ticks >= 5);
    assert_eq!(d.deployed(), tokens(100));
}

#[tokio::test]
async fn run_until_returns_when_sender_is_dropped() {
    let d = Deployment::builder().build();
    let (shutdown, watcher) = watch::channel(false);
    drop(shutdown);

    let ticks = d.keeper().run_until(watcher).await;

    assert!(ticks <= 1);
}
