//! Ordered queue of per-group visitation deltas.
//!
//! A transaction's lifetime is partitioned into groups (execution windows). Each group
//! maps shard ids to the [`VisitationSet`] of documents that became visible during
//! that window. Groups are appended at the tail and retired from the head.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use sift_collections::VisitationSet;
use sift_common::{Result, ShardId, error::Error};

/// One execution window of a transaction: the per-shard sets of newly observed documents.
pub struct DeltaGroup {
    sequence: u64,
    shards: ahash::HashMap<ShardId, Arc<VisitationSet>>,
}

impl DeltaGroup {
    fn new(sequence: u64) -> DeltaGroup {
        DeltaGroup {
            sequence,
            shards: Default::default(),
        }
    }

    /// Position of this group in the transaction's history, starting at zero.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the shard's set within this group, allocating it on first reference.
    pub fn get_or_create_shard_set(
        &mut self,
        shard_id: ShardId,
        capacity: usize,
    ) -> Arc<VisitationSet> {
        self.shards
            .entry(shard_id)
            .or_insert_with(|| Arc::new(VisitationSet::new(capacity)))
            .clone()
    }

    /// Returns the shard's set if it has been referenced within this group.
    pub fn shard_set(&self, shard_id: ShardId) -> Option<&Arc<VisitationSet>> {
        self.shards.get(&shard_id)
    }

    /// Number of shards referenced within this group.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

/// An ordered sequence of [`DeltaGroup`]s.
///
/// Group creation comes in two flavors:
///
/// - [`create_group`](Self::create_group) is a one-shot gate: only the first call over
///   the queue's lifetime appends a group, every later call is a no-op. Under concurrent
///   callers exactly one of them wins.
/// - [`create_next_group`](Self::create_next_group) always appends and is the way to
///   open the second and later windows of a transaction.
///
/// All group lifecycle operations are serialized by an internal mutex and are therefore
/// linearizable with respect to each other.
pub struct NetDeltaQueue {
    capacity: usize,
    group_created: AtomicBool,
    state: Mutex<QueueState>,
}

struct QueueState {
    groups: VecDeque<DeltaGroup>,
    next_sequence: u64,
}

impl QueueState {
    fn push(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.groups.push_back(DeltaGroup::new(sequence));
        sequence
    }
}

impl NetDeltaQueue {
    /// Creates an empty queue whose shard sets have the given capacity.
    pub fn new(capacity: usize) -> NetDeltaQueue {
        NetDeltaQueue {
            capacity,
            group_created: AtomicBool::new(false),
            state: Mutex::new(QueueState {
                groups: VecDeque::new(),
                next_sequence: 0,
            }),
        }
    }

    /// Appends a new empty group if no group was ever created through this queue.
    ///
    /// Returns `true` if this call appended the group, `false` if the gate had already
    /// been passed (by an earlier call, a racing call, or
    /// [`create_next_group`](Self::create_next_group)).
    pub fn create_group(&self) -> bool {
        let mut state = self.lock_state();
        if self
            .group_created
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let sequence = state.push();
        log::debug!("created first net delta group {sequence}");
        true
    }

    /// Appends a new empty group unconditionally and returns its sequence number.
    pub fn create_next_group(&self) -> u64 {
        let mut state = self.lock_state();
        self.group_created.store(true, Ordering::Release);
        let sequence = state.push();
        log::debug!("created net delta group {sequence}");
        sequence
    }

    /// Whether any group has ever been created through this queue.
    pub fn group_created(&self) -> bool {
        self.group_created.load(Ordering::Acquire)
    }

    /// Removes the head group and returns its sequence number.
    ///
    /// Fails with [`EmptyGroupQueue`](sift_common::error::ErrorKind::EmptyGroupQueue) if
    /// the queue holds no group; a group is never created implicitly.
    pub fn retire_first(&self) -> Result<u64> {
        let group = self
            .lock_state()
            .groups
            .pop_front()
            .ok_or_else(|| Error::empty_group_queue("retire_first"))?;
        log::debug!(
            "retired net delta group {} ({} shards)",
            group.sequence(),
            group.shard_count()
        );
        Ok(group.sequence())
    }

    /// Returns the head group's set for `shard_id`, allocating it if absent.
    pub fn peek_first(&self, shard_id: ShardId) -> Result<Arc<VisitationSet>> {
        let mut state = self.lock_state();
        let group = state
            .groups
            .front_mut()
            .ok_or_else(|| Error::empty_group_queue("peek_first"))?;
        Ok(group.get_or_create_shard_set(shard_id, self.capacity))
    }

    /// Returns the tail group's set for `shard_id`, allocating it if absent.
    pub fn peek_last(&self, shard_id: ShardId) -> Result<Arc<VisitationSet>> {
        let mut state = self.lock_state();
        let group = state
            .groups
            .back_mut()
            .ok_or_else(|| Error::empty_group_queue("peek_last"))?;
        Ok(group.get_or_create_shard_set(shard_id, self.capacity))
    }

    /// Sequence numbers of the live groups, head first.
    pub fn sequences(&self) -> Vec<u64> {
        self.lock_state()
            .groups
            .iter()
            .map(DeltaGroup::sequence)
            .collect()
    }

    /// Number of live groups.
    pub fn len(&self) -> usize {
        self.lock_state().groups.len()
    }

    /// Returns `true` if the queue holds no group.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity of the shard sets allocated by this queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        // Every mutation completes before the guard is released, so a poisoned
        // state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
