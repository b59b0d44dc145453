//! Poller: the refresh timer that keeps the dashboard state current

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::DeviceDataSource;
use crate::state::StateHandle;

/// Consecutive failures after which a warning is logged
const FAILURE_WARN_THRESHOLD: u32 = 5;

/// Periodically fetches device data into the shared state
pub struct Poller {
    source: Arc<dyn DeviceDataSource>,
    state: StateHandle,
    interval: Duration,
    time_range_seconds: Option<u64>,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("interval", &self.interval)
            .field("time_range_seconds", &self.time_range_seconds)
            .finish()
    }
}

impl Poller {
    pub fn new(
        source: Arc<dyn DeviceDataSource>,
        state: StateHandle,
        interval: Duration,
        time_range_seconds: Option<u64>,
    ) -> Self {
        Self {
            source,
            state,
            interval,
            time_range_seconds,
        }
    }

    /// Run one poll to completion and apply its outcome.
    ///
    /// Returns true if the outcome was applied to the state.
    pub async fn refresh(&self) -> bool {
        let seq = self.state.write().await.begin_poll();
        poll_once(
            Arc::clone(&self.source),
            Arc::clone(&self.state),
            seq,
            self.time_range_seconds,
        )
        .await
    }

    /// Start polling on a background task owned by the returned guard.
    ///
    /// The task stops when `cancel` is triggered or the guard is shut down or dropped.
    pub fn spawn(self, cancel: &CancellationToken) -> PollingTask {
        let token = cancel.child_token();
        let run_token = token.clone();
        let handle = tokio::spawn(async move { self.run(run_token).await });
        PollingTask {
            cancel: token,
            handle: Some(handle),
        }
    }

    /// Poll immediately, then on every interval tick until cancelled.
    ///
    /// Ticks do not wait for earlier fetches. Outcomes are sequenced by the
    /// state so a slow, older response cannot overwrite a newer one.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        tracing::info!("Polling device data every {:?}", self.interval);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Poller cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let seq = self.state.write().await.begin_poll();
                    tracing::debug!("Starting poll #{}", seq);
                    in_flight.spawn(poll_once(
                        Arc::clone(&self.source),
                        Arc::clone(&self.state),
                        seq,
                        self.time_range_seconds,
                    ));
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::error!("Poll task panicked: {}", e);
                        }
                    }
                }
            }
        }

        in_flight.shutdown().await;
        tracing::debug!("Poller stopped");
    }
}

async fn poll_once(
    source: Arc<dyn DeviceDataSource>,
    state: StateHandle,
    seq: u64,
    time_range_seconds: Option<u64>,
) -> bool {
    let result = source.fetch_device_data(time_range_seconds).await;
    let now_ms = current_epoch_ms();
    let mut state = state.write().await;

    match result {
        Ok(readings) => {
            let count = readings.len();
            let applied = state.apply_success(seq, readings, now_ms);
            if applied {
                tracing::debug!("Poll #{} loaded {} readings", seq, count);
            }
            applied
        }
        Err(e) => {
            let applied = state.apply_failure(seq, now_ms);
            if applied {
                tracing::debug!("Poll #{} failed: {}", seq, e);
                if state.consecutive_failures == FAILURE_WARN_THRESHOLD {
                    tracing::warn!(
                        "Device data fetch has failed {} times in a row",
                        state.consecutive_failures
                    );
                }
            }
            applied
        }
    }
}

fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Handle to a running poller. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollingTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollingTask {
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stop the timer, abort in-flight fetches, and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Poller task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollingTask {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
