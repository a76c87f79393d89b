//! Edge-triggered sync alerting.
//!
//! [`SyncState`] remembers the last verdict an alert was raised for. An alert
//! is produced only when a new verdict differs from it; the very first verdict
//! always differs because the initial value is unknown.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use syncmon_core::{NodeIdentity, StatusSnapshot};

/// Kind of sync transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Node fell out of sync.
    Degraded,
    /// Node is back in sync.
    Recovered,
}

impl AlertKind {
    /// Alert kind for a transition into `in_sync`.
    pub fn for_verdict(in_sync: bool) -> Self {
        if in_sync {
            AlertKind::Recovered
        } else {
            AlertKind::Degraded
        }
    }

    /// Headline shown to operators.
    pub fn headline(&self) -> &'static str {
        match self {
            AlertKind::Degraded => "🔄 Node out of sync 🔴",
            AlertKind::Recovered => "🔄 Node back in sync 🟢",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Degraded => "degraded",
            AlertKind::Recovered => "recovered",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published sync state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncState {
    /// Latest verdict; `None` until the first evaluation.
    pub in_sync: Option<bool>,
    /// Verdict of the last alert; `None` until the first alert.
    pub last_notified: Option<bool>,
}

impl SyncState {
    /// Applies a verdict, returning the next state and the alert to send.
    pub fn apply(&self, verdict: bool) -> (SyncState, Option<AlertKind>) {
        if self.last_notified == Some(verdict) {
            let next = SyncState {
                in_sync: Some(verdict),
                last_notified: self.last_notified,
            };
            return (next, None);
        }

        let next = SyncState {
            in_sync: Some(verdict),
            last_notified: Some(verdict),
        };
        (next, Some(AlertKind::for_verdict(verdict)))
    }

    /// Unknown counts as not in sync.
    pub fn is_in_sync(&self) -> bool {
        self.in_sync == Some(true)
    }
}

/// Alert payload handed to a notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub node: NodeIdentity,
    pub block_height: u64,
    pub block_time: DateTime<Utc>,
}

impl Alert {
    pub fn new(kind: AlertKind, node: &NodeIdentity, snapshot: &StatusSnapshot) -> Self {
        Self {
            kind,
            node: node.clone(),
            block_height: snapshot.block_height,
            block_time: snapshot.block_time,
        }
    }
}
