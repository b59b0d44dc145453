//! Shared dashboard state: latest readings, fetch error, and poll sequencing

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::reading::DeviceReading;

/// Message shown to the user when a poll fails, whatever the cause
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch device data. Please try again later.";

/// Observable phase of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Error,
    Loaded,
}

/// State shared between the poller and the HTTP server
#[derive(Debug, Default)]
pub struct DashboardState {
    /// Last successfully fetched collection, in received order
    pub readings: Vec<DeviceReading>,
    pub error: Option<String>,
    pub last_success_epoch_ms: Option<u64>,
    pub last_attempt_epoch_ms: Option<u64>,
    pub consecutive_failures: u32,
    issued_sequence: u64,
    applied_sequence: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the sequence number for a poll about to be issued
    pub fn begin_poll(&mut self) -> u64 {
        self.issued_sequence += 1;
        self.issued_sequence
    }

    /// Sequence number of the newest poll whose outcome was applied
    pub fn applied_sequence(&self) -> u64 {
        self.applied_sequence
    }

    fn accept(&mut self, seq: u64, now_ms: u64) -> bool {
        if seq <= self.applied_sequence {
            tracing::debug!(
                "Dropping outcome of poll #{} (already applied #{})",
                seq,
                self.applied_sequence
            );
            return false;
        }
        self.applied_sequence = seq;
        self.last_attempt_epoch_ms = Some(now_ms);
        true
    }

    /// Replace the collection with a successful poll result.
    ///
    /// Returns false when a newer poll has already been applied.
    pub fn apply_success(&mut self, seq: u64, readings: Vec<DeviceReading>, now_ms: u64) -> bool {
        if !self.accept(seq, now_ms) {
            return false;
        }
        self.readings = readings;
        self.error = None;
        self.last_success_epoch_ms = Some(now_ms);
        self.consecutive_failures = 0;
        true
    }

    /// Record a failed poll. The previous collection is kept.
    ///
    /// Returns false when a newer poll has already been applied.
    pub fn apply_failure(&mut self, seq: u64, now_ms: u64) -> bool {
        if !self.accept(seq, now_ms) {
            return false;
        }
        self.error = Some(FETCH_ERROR_MESSAGE.to_string());
        self.consecutive_failures += 1;
        true
    }

    pub fn phase(&self) -> Phase {
        if self.error.is_some() {
            Phase::Error
        } else if self.last_success_epoch_ms.is_some() {
            Phase::Loaded
        } else {
            Phase::Loading
        }
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<DashboardState>>;

pub fn new_state_handle() -> StateHandle {
    Arc::new(RwLock::new(DashboardState::new()))
}
