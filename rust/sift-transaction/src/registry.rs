//! Registry of open transactions.
//!
//! The [`TransactionRegistry`] is the transaction coordinator's view of the world: it
//! owns every live [`TransactionContext`], keyed by transaction id, and exposes explicit
//! create, lookup and close operations. Transaction timeout is a policy decision of
//! the caller; the registry only offers [`TransactionRegistry::expire_idle`] as a hook.
//!
//! # Thread Safety
//!
//! The map is protected by a `RwLock`, allowing concurrent lookups while opening and
//! closing take exclusive access. Contexts are handed out as `Arc`s, so a transaction
//! closed while a scan is still running stays alive until that scan drops it.

use std::{
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use sift_common::{Result, TransactionId, error::Error};

use crate::{config::TransactionConfig, context::TransactionContext};

pub struct TransactionRegistry {
    config: TransactionConfig,
    next_id: AtomicU64,
    transactions: RwLock<ahash::HashMap<TransactionId, Arc<TransactionContext>>>,
}

impl TransactionRegistry {
    /// Creates an empty registry. Every context it opens uses `config`.
    pub fn new(config: TransactionConfig) -> Result<TransactionRegistry> {
        config.validate()?;
        Ok(TransactionRegistry {
            config,
            next_id: AtomicU64::new(1),
            transactions: Default::default(),
        })
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Starts a new transaction under a freshly allocated id.
    ///
    /// Allocated ids skip over any id already registered through [`open`](Self::open).
    pub fn start(&self) -> Arc<TransactionContext> {
        let mut transactions = self.write();
        let id = loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if !transactions.contains_key(&id) {
                break id;
            }
        };
        let context = Arc::new(TransactionContext::new(id, self.config.clone()));
        transactions.insert(id, context.clone());
        log::debug!("started transaction {id}");
        context
    }

    /// Registers a transaction under a caller-supplied id.
    ///
    /// # Errors
    ///
    /// Returns `TransactionExists` if the id is already registered.
    pub fn open(&self, id: TransactionId) -> Result<Arc<TransactionContext>> {
        let mut transactions = self.write();
        if transactions.contains_key(&id) {
            return Err(Error::transaction_exists(id));
        }
        let context = Arc::new(TransactionContext::new(id, self.config.clone()));
        transactions.insert(id, context.clone());
        log::debug!("opened transaction {id}");
        Ok(context)
    }

    /// Looks up a live transaction and records the access.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if the id is not registered.
    pub fn get(&self, id: TransactionId) -> Result<Arc<TransactionContext>> {
        let context = self
            .transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::transaction_not_found(id))?;
        context.touch();
        Ok(context)
    }

    /// Removes a transaction and returns its context.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if the id is not registered.
    pub fn close(&self, id: TransactionId) -> Result<Arc<TransactionContext>> {
        let context = self
            .write()
            .remove(&id)
            .ok_or_else(|| Error::transaction_not_found(id))?;
        log::debug!("closed transaction {id}");
        Ok(context)
    }

    /// Removes every transaction whose last access is older than `max_idle` and returns
    /// their ids in ascending order.
    pub fn expire_idle(&self, max_idle: Duration) -> Vec<TransactionId> {
        let now = Instant::now();
        let mut expired = Vec::new();
        self.write().retain(|&id, context| {
            let idle = now.saturating_duration_since(context.last_access()) >= max_idle;
            if idle {
                expired.push(id);
            }
            !idle
        });
        expired.sort_unstable();
        if !expired.is_empty() {
            log::debug!("expired {} idle transactions: {expired:?}", expired.len());
        }
        expired
    }

    /// Ids of the live transactions in ascending order.
    pub fn ids(&self) -> Vec<TransactionId> {
        let mut ids: Vec<_> = self
            .transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, ahash::HashMap<TransactionId, Arc<TransactionContext>>>
    {
        self.transactions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
