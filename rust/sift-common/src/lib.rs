//! Core definitions (errors, result alias and shared identifiers), relied upon by all sift-* crates.

pub mod error;
pub mod result;

pub use result::Result;

/// Identifier of an index shard. Each shard has its own document ordinal space.
pub type ShardId = u32;

/// Identifier of a transaction, allocated by the transaction coordinator.
pub type TransactionId = u64;

/// Segment-local document ordinal, as delivered by the index scan.
pub type DocId = u32;
