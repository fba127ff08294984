//! Per-transaction visitation state.

use std::{
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::Instant,
};

use sift_collections::VisitationSet;
use sift_common::{Result, ShardId, TransactionId};

use crate::{config::TransactionConfig, net_delta_queue::NetDeltaQueue};

/// State of one transaction: the cumulative per-shard visitation sets and the queue
/// of per-group deltas.
///
/// A context is shared as `Arc<TransactionContext>` between the coordinator, which
/// drives the group lifecycle, and any number of concurrently running collectors,
/// which mark documents in the cumulative sets. Visitation sets are handed out as
/// `Arc<VisitationSet>` so collectors do not hold any lock while scanning.
pub struct TransactionContext {
    id: TransactionId,
    config: TransactionConfig,
    visited: RwLock<ahash::HashMap<ShardId, Arc<VisitationSet>>>,
    net_deltas: NetDeltaQueue,
    created_at: Instant,
    last_access: Mutex<Instant>,
}

impl TransactionContext {
    pub fn new(id: TransactionId, config: TransactionConfig) -> TransactionContext {
        let now = Instant::now();
        let net_deltas = NetDeltaQueue::new(config.max_docs_per_shard);
        TransactionContext {
            id,
            config,
            visited: Default::default(),
            net_deltas,
            created_at: now,
            last_access: Mutex::new(now),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Returns the cumulative set of documents of `shard_id` observed by this
    /// transaction, creating an empty one on first access.
    pub fn get_cumulative_set(&self, shard_id: ShardId) -> Arc<VisitationSet> {
        if let Some(set) = self
            .visited
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&shard_id)
        {
            return set.clone();
        }
        self.visited
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(shard_id)
            .or_insert_with(|| {
                log::debug!(
                    "transaction {}: allocating visitation set for shard {shard_id}",
                    self.id
                );
                Arc::new(VisitationSet::new(self.config.max_docs_per_shard))
            })
            .clone()
    }

    /// Opens the transaction's first group. Only the first call over the context's
    /// lifetime has an effect; returns whether this call created the group.
    pub fn begin_new_group(&self) -> bool {
        self.net_deltas.create_group()
    }

    /// Opens a new group unconditionally and returns its sequence number.
    pub fn begin_next_group(&self) -> u64 {
        self.net_deltas.create_next_group()
    }

    /// Retires the oldest group and returns its sequence number.
    ///
    /// Groups are transaction-wide; `shard_id` only identifies the caller's shard in
    /// the log.
    pub fn advance_group(&self, shard_id: ShardId) -> Result<u64> {
        let sequence = self.net_deltas.retire_first()?;
        log::debug!(
            "transaction {}: shard {shard_id} advanced past group {sequence}",
            self.id
        );
        Ok(sequence)
    }

    /// Delta set of `shard_id` in the oldest live group.
    pub fn first_group_set(&self, shard_id: ShardId) -> Result<Arc<VisitationSet>> {
        self.net_deltas.peek_first(shard_id)
    }

    /// Delta set of `shard_id` in the newest group.
    pub fn last_group_set(&self, shard_id: ShardId) -> Result<Arc<VisitationSet>> {
        self.net_deltas.peek_last(shard_id)
    }

    pub fn net_deltas(&self) -> &NetDeltaQueue {
        &self.net_deltas
    }

    /// Number of live groups.
    pub fn group_count(&self) -> usize {
        self.net_deltas.len()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Last time the context was handed out by its registry.
    pub fn last_access(&self) -> Instant {
        *self.last_access.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records an access at the current instant.
    pub fn touch(&self) {
        *self.last_access.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }
}

impl std::fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("groups", &self.net_deltas.sequences())
            .finish()
    }
}
