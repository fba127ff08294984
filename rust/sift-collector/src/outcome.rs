use serde::{Deserialize, Serialize};
use sift_common::ShardId;

use crate::sort_limited_doc::SortLimitedDoc;

/// Result of one collector run against one shard, as handed back to the transaction
/// coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardScanOutcome {
    pub shard_id: ShardId,
    /// Documents matched by this execution, repeats included.
    pub gross_count: u64,
    /// Matched documents never surfaced before in the transaction.
    pub net_count: u64,
    /// Numeric field the docs are ranked by, if sorted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Ranked documents, highest value first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<SortLimitedDoc>,
}

impl ShardScanOutcome {
    /// Number of repeat observations, i.e. matches that were already surfaced.
    pub fn repeat_count(&self) -> u64 {
        self.gross_count.saturating_sub(self.net_count)
    }
}
