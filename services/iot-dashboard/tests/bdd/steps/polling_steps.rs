//! BDD step definitions for the polling feature

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use iot_dashboard::client::DeviceDataSource;
use iot_dashboard::poller::Poller;
use iot_dashboard::state::{new_state_handle, Phase};

use crate::steps::doubles::CountingSource;
use crate::world::DashboardWorld;

fn source(world: &DashboardWorld) -> &CountingSource {
    world.source.as_deref().expect("no data source")
}

#[given("a data source that succeeds")]
fn source_succeeds(world: &mut DashboardWorld) {
    world.source = Some(CountingSource::new(false));
}

#[given("a data source that fails")]
fn source_fails(world: &mut DashboardWorld) {
    world.source = Some(CountingSource::new(true));
}

#[when(expr = "polling starts every {int} milliseconds")]
fn polling_starts(world: &mut DashboardWorld, interval_ms: u64) {
    let source = world.source.clone().expect("no data source");
    let state = world.state.get_or_insert_with(new_state_handle).clone();
    let poller = Poller::new(
        source as Arc<dyn DeviceDataSource>,
        state,
        Duration::from_millis(interval_ms),
        None,
    );
    world.polling = Some(poller.spawn(&CancellationToken::new()));
}

#[when(expr = "{int} milliseconds pass")]
async fn time_passes(_world: &mut DashboardWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[when("polling is torn down")]
async fn polling_torn_down(world: &mut DashboardWorld) {
    let task = world.polling.take().expect("polling not started");
    task.shutdown().await;
    world.calls_at_teardown = Some(source(world).calls());
}

#[then(expr = "the data source should have been called {int} time(s)")]
fn called_exactly(world: &mut DashboardWorld, expected: usize) {
    assert_eq!(source(world).calls(), expected);
}

#[then(expr = "the data source should have been called at least {int} times")]
fn called_at_least(world: &mut DashboardWorld, expected: usize) {
    let calls = source(world).calls();
    assert!(calls >= expected, "expected at least {} calls, got {}", expected, calls);
}

#[then("no fetch should have happened after teardown")]
fn no_fetch_after_teardown(world: &mut DashboardWorld) {
    let at_teardown = world.calls_at_teardown.expect("polling not torn down");
    assert!(at_teardown > 0);
    assert_eq!(source(world).calls(), at_teardown);
}

#[then(expr = "the dashboard should be in the {word} phase")]
async fn dashboard_phase(world: &mut DashboardWorld, phase: String) {
    let expected = match phase.as_str() {
        "loading" => Phase::Loading,
        "error" => Phase::Error,
        "loaded" => Phase::Loaded,
        other => panic!("Unknown phase: {}", other),
    };
    let state = world.state.as_ref().expect("no state");
    assert_eq!(state.read().await.phase(), expected);
}
