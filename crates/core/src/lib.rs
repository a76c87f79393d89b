//! # Sync Monitor Core
//!
//! Types shared by every part of the node sync monitor.
//!
//! - [`StatusSnapshot`]: one point-in-time read of a node's sync information
//! - [`NodeIdentity`]: moniker, node id and network of the monitored node
//! - [`parser`]: conversion of a raw `/status` document into the typed values
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use syncmon_core::parse_snapshot;
//!
//! let doc = json!({
//!     "result": {
//!         "sync_info": {
//!             "catching_up": false,
//!             "latest_block_height": "1024",
//!             "latest_block_time": "2021-06-18T17:00:00.123456Z",
//!             "latest_block_hash": "ABCDEF"
//!         }
//!     }
//! });
//!
//! let snapshot = parse_snapshot(&doc).unwrap();
//! assert_eq!(snapshot.block_height, 1024);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Status parsing errors
pub mod error;
/// Status document parsing
pub mod parser;
/// Snapshot and identity types
pub mod snapshot;

pub use error::{ParseError, ParseResult};
pub use parser::{parse_node_identity, parse_snapshot, parse_status, NodeStatus};
pub use snapshot::{NodeIdentity, StatusSnapshot};
