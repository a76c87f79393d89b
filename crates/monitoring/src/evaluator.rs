//! Sync verdict computation.

use crate::epoch::{EpochState, EpochTracker};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use syncmon_core::StatusSnapshot;

/// Outcome of evaluating one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Latest block is within the threshold.
    InSync,
    /// Node reports catch-up mode.
    CatchingUp,
    /// Latest block is older than the threshold.
    Stale,
    /// Epoch window; no verdict this cycle.
    EpochPause,
}

impl Verdict {
    /// Binary sync verdict; `None` when the cycle must be skipped.
    pub fn in_sync(self) -> Option<bool> {
        match self {
            Verdict::InSync => Some(true),
            Verdict::CatchingUp | Verdict::Stale => Some(false),
            Verdict::EpochPause => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::InSync => write!(f, "in sync"),
            Verdict::CatchingUp => write!(f, "catching up"),
            Verdict::Stale => write!(f, "stale"),
            Verdict::EpochPause => write!(f, "epoch pause"),
        }
    }
}

/// Result of [`SyncEvaluator::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Epoch state to carry into the next poll.
    pub epoch: EpochState,
    /// `now - block_time`; not computed for catching-up snapshots.
    pub block_age: Option<Duration>,
}

/// Turns snapshots into sync verdicts.
#[derive(Debug, Clone, Copy)]
pub struct SyncEvaluator {
    threshold: Duration,
    tracker: EpochTracker,
}

impl SyncEvaluator {
    /// Evaluator with the default 24h epoch tracker.
    pub fn new(threshold: std::time::Duration) -> Self {
        Self::with_tracker(threshold, EpochTracker::default())
    }

    /// Evaluator with a custom epoch tracker, e.g. a non-daily period.
    pub fn with_tracker(threshold: std::time::Duration, tracker: EpochTracker) -> Self {
        let threshold =
            Duration::from_std(threshold).unwrap_or_else(|_| Duration::milliseconds(i64::MAX));
        Self { threshold, tracker }
    }

    /// Maximum block age still considered in sync.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Epoch tracker used for window start and end checks.
    pub fn tracker(&self) -> &EpochTracker {
        &self.tracker
    }

    /// Computes the verdict for `snapshot` at `now`.
    ///
    /// Catching up short-circuits everything else. Otherwise the epoch state
    /// is advanced (exit check first, then start check); an active epoch wins
    /// over the age comparison. The age comparison is inclusive.
    pub fn evaluate(
        &self,
        snapshot: &StatusSnapshot,
        epoch: &EpochState,
        now: DateTime<Utc>,
    ) -> Evaluation {
        if snapshot.catching_up {
            return Evaluation {
                verdict: Verdict::CatchingUp,
                epoch: epoch.clone(),
                block_age: None,
            };
        }

        let block_age = snapshot.block_age(now);

        let epoch = self.tracker.check_epoch_over(snapshot, epoch);
        let epoch = self.tracker.check_epoch_start(snapshot, &epoch);

        let verdict = if epoch.is_epoch {
            Verdict::EpochPause
        } else if block_age <= self.threshold {
            Verdict::InSync
        } else {
            Verdict::Stale
        };

        Evaluation {
            verdict,
            epoch,
            block_age: Some(block_age),
        }
    }
}
