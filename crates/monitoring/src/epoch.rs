//! Epoch boundary tracking.
//!
//! Block production may pause while the chain crosses a protocol epoch
//! boundary. The tracker notices when the latest block lies past the next
//! boundary and keeps the monitor in epoch state until the block height moves
//! beyond the block that triggered the detection.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use syncmon_core::StatusSnapshot;

/// Length of one epoch in hours.
pub const EPOCH_PERIOD_HOURS: i64 = 24;

/// Epoch bookkeeping carried across polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpochState {
    /// Inside an epoch transition window.
    pub is_epoch: bool,
    /// Start of the most recently crossed boundary.
    pub epoch_boundary: DateTime<Utc>,
    /// Snapshot that triggered the current (or last) epoch window.
    pub epoch_block: Option<StatusSnapshot>,
}

impl EpochState {
    /// Initial state anchored at the configured epoch start.
    pub fn new(epoch_start: DateTime<Utc>) -> Self {
        Self {
            is_epoch: false,
            epoch_boundary: epoch_start,
            epoch_block: None,
        }
    }

    /// How long the current window has been open at `now`, measured from the
    /// block that opened it. `None` outside an epoch window.
    pub fn window_open_for(&self, now: DateTime<Utc>) -> Option<Duration> {
        if !self.is_epoch {
            return None;
        }
        let opened_at = self
            .epoch_block
            .as_ref()
            .map_or(self.epoch_boundary, |block| block.block_time);
        Some(now.signed_duration_since(opened_at))
    }
}

/// Detects epoch boundary crossings and the end of epoch windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochTracker {
    period: Duration,
}

impl Default for EpochTracker {
    fn default() -> Self {
        Self {
            period: Duration::hours(EPOCH_PERIOD_HOURS),
        }
    }
}

impl EpochTracker {
    /// Tracker with a custom period.
    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }

    /// Epoch length.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Next boundary after the one recorded in `state`.
    pub fn next_boundary(&self, state: &EpochState) -> DateTime<Utc> {
        state.epoch_boundary + self.period
    }

    /// Enters epoch state when the snapshot's block time reached the next
    /// boundary. The boundary advances by exactly one period per crossing.
    pub fn check_epoch_start(&self, snapshot: &StatusSnapshot, state: &EpochState) -> EpochState {
        let next = self.next_boundary(state);
        if snapshot.block_time < next {
            return state.clone();
        }

        EpochState {
            is_epoch: true,
            epoch_boundary: next,
            epoch_block: Some(snapshot.clone()),
        }
    }

    /// Leaves epoch state once the height moved past the triggering block.
    pub fn check_epoch_over(&self, snapshot: &StatusSnapshot, state: &EpochState) -> EpochState {
        if !state.is_epoch {
            return state.clone();
        }

        let advanced = match &state.epoch_block {
            Some(block) => snapshot.block_height > block.block_height,
            // No anchor to wait for.
            None => true,
        };

        if advanced {
            EpochState {
                is_epoch: false,
                ..state.clone()
            }
        } else {
            state.clone()
        }
    }
}
