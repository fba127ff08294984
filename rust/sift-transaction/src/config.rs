use sift_common::{Result, verify_arg};

/// Upper bound on per-shard document count used when no configuration is given.
pub const DEFAULT_MAX_DOCS_PER_SHARD: usize = 3_000_000;

/// Configuration applied to every transaction context created by a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionConfig {
    /// Capacity of every visitation set allocated for the transaction: document
    /// ordinals of a shard must be in `[0, max_docs_per_shard)`.
    pub max_docs_per_shard: usize,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        TransactionConfig {
            max_docs_per_shard: DEFAULT_MAX_DOCS_PER_SHARD,
        }
    }
}

impl TransactionConfig {
    /// Creates a configuration with the given per-shard document bound.
    pub fn with_max_docs_per_shard(max_docs_per_shard: usize) -> Result<Self> {
        let config = TransactionConfig { max_docs_per_shard };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<()> {
        verify_arg!(max_docs_per_shard, self.max_docs_per_shard > 0);
        Ok(())
    }
}
