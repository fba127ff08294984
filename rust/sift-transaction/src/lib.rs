//! Transaction state for deduplicated scanning.
//!
//! A transaction spans several query executions. For every shard it keeps a
//! cumulative [`VisitationSet`](sift_collections::VisitationSet) of documents already
//! surfaced, and a [`NetDeltaQueue`] that partitions the transaction's lifetime into
//! ordered groups, each recording the documents newly observed during that window.
//!
//! - [`TransactionContext`]: per-transaction state, shared across concurrent collectors.
//! - [`TransactionRegistry`]: explicit owner of contexts keyed by transaction id.
//! - [`TransactionConfig`]: validated configuration applied to every new context.

pub mod config;
pub mod context;
pub mod net_delta_queue;
pub mod registry;

pub use config::TransactionConfig;
pub use context::TransactionContext;
pub use net_delta_queue::{DeltaGroup, NetDeltaQueue};
pub use registry::TransactionRegistry;
