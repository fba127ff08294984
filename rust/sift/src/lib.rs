//! # Sift: transactional, deduplicated document scanning
//!
//! Sift tracks, per transaction and per shard, which documents of a continuously
//! mutated search index have already been surfaced, so that every query execution
//! under the same transaction reports only documents it has never returned before.
//!
//! ## Flow
//!
//! 1. The coordinator starts a transaction through a [`transaction::TransactionRegistry`].
//! 2. For every query execution against a shard it builds a collector over the
//!    transaction's cumulative visitation set for that shard (and, optionally, the
//!    current group's delta set).
//! 3. The index scan drives the collector through [`collector::Collector`].
//! 4. The coordinator reads back gross/net counts and the ranked documents, then
//!    advances the transaction to its next group.
//!
//! ## Module Organization
//!
//! * [`collections`] - The atomic, grow-only visitation bit set
//! * [`common`] - Errors, result alias and shared identifiers
//! * [`transaction`] - Transaction contexts, net delta groups and the registry
//! * [`collector`] - Scan collectors, sort values and top-K selection

pub use sift_collections as collections;
pub use sift_collector as collector;
pub use sift_common as common;
pub use sift_transaction as transaction;
