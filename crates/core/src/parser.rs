//! Conversion of a raw `/status` document into typed values.
//!
//! The document is the JSON-RPC envelope returned by Tendermint/CometBFT nodes:
//!
//! ```json
//! {
//!   "result": {
//!     "node_info": { "id": "...", "network": "...", "moniker": "..." },
//!     "sync_info": {
//!       "latest_block_hash": "...",
//!       "latest_block_height": "123",
//!       "latest_block_time": "2021-06-18T17:00:00.000000000Z",
//!       "catching_up": false
//!     }
//!   }
//! }
//! ```

use crate::error::{ParseError, ParseResult};
use crate::snapshot::{NodeIdentity, StatusSnapshot};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

const SYNC_INFO: &str = "result.sync_info";
const NODE_INFO: &str = "result.node_info";

#[derive(Deserialize)]
struct RawSyncInfo {
    catching_up: bool,
    latest_block_height: String,
    latest_block_time: String,
    latest_block_hash: String,
}

#[derive(Deserialize)]
struct RawNodeInfo {
    moniker: String,
    id: String,
    network: String,
}

/// Sync information and identity decoded from a single status document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    /// Sync information.
    pub snapshot: StatusSnapshot,
    /// Node identity.
    pub identity: NodeIdentity,
}

/// Extracts the [`StatusSnapshot`] from `result.sync_info`.
pub fn parse_snapshot(doc: &Value) -> ParseResult<StatusSnapshot> {
    let section = section(doc, "sync_info", SYNC_INFO)?;
    let raw = RawSyncInfo::deserialize(section).map_err(|e| ParseError::malformed(SYNC_INFO, e))?;

    Ok(StatusSnapshot {
        catching_up: raw.catching_up,
        block_height: parse_height(&raw.latest_block_height)?,
        block_time: parse_block_time(&raw.latest_block_time)?,
        block_hash: raw.latest_block_hash,
    })
}

/// Extracts the [`NodeIdentity`] from `result.node_info`.
pub fn parse_node_identity(doc: &Value) -> ParseResult<NodeIdentity> {
    let section = section(doc, "node_info", NODE_INFO)?;
    let raw = RawNodeInfo::deserialize(section).map_err(|e| ParseError::malformed(NODE_INFO, e))?;

    Ok(NodeIdentity {
        moniker: raw.moniker,
        node_id: raw.id,
        network: raw.network,
    })
}

/// Extracts both the snapshot and the node identity.
pub fn parse_status(doc: &Value) -> ParseResult<NodeStatus> {
    Ok(NodeStatus {
        snapshot: parse_snapshot(doc)?,
        identity: parse_node_identity(doc)?,
    })
}

fn section<'a>(doc: &'a Value, key: &str, name: &'static str) -> ParseResult<&'a Value> {
    doc.get("result")
        .and_then(|result| result.get(key))
        .filter(|value| !value.is_null())
        .ok_or(ParseError::MissingSection(name))
}

fn parse_height(value: &str) -> ParseResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|source| ParseError::InvalidHeight {
            value: value.to_string(),
            source,
        })
}

fn parse_block_time(value: &str) -> ParseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|time| time.with_timezone(&Utc))
        .map_err(|source| ParseError::InvalidTime {
            value: value.to_string(),
            source,
        })
}
