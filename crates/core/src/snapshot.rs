use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One point-in-time read of the node's sync information.
///
/// A fresh snapshot is produced on every poll and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Node reports it is still replaying historical blocks.
    pub catching_up: bool,
    /// Height of the latest block known to the node.
    pub block_height: u64,
    /// Timestamp of the latest block.
    pub block_time: DateTime<Utc>,
    /// Hash of the latest block, kept opaque.
    pub block_hash: String,
}

impl StatusSnapshot {
    /// Time elapsed between the latest block and `now`.
    ///
    /// Negative when the node clock runs ahead of ours.
    pub fn block_age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.block_time)
    }

    /// Returns true if this snapshot reports a lower height than `previous`.
    pub fn regressed_from(&self, previous: &StatusSnapshot) -> bool {
        self.block_height < previous.block_height
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block {} at {}{}",
            self.block_height,
            self.block_time.to_rfc3339(),
            if self.catching_up { " (catching up)" } else { "" }
        )
    }
}

/// Identity of the monitored node, read once from `result.node_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    /// Human readable node name.
    pub moniker: String,
    /// Node id (hex encoded public key hash).
    pub node_id: String,
    /// Chain id the node is connected to.
    pub network: String,
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.moniker, self.network)
    }
}
