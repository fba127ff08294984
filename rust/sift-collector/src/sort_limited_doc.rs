use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A shard-global document ordinal paired with its sort value.
///
/// Documents are ranked in descending value order. There is no secondary key: equal
/// values compare as equal, and stable sorting keeps them in observation order.
/// `NaN` ranks above every other value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SortLimitedDoc {
    doc_id: u64,
    value: f64,
}

impl SortLimitedDoc {
    pub fn new(doc_id: u64, value: f64) -> SortLimitedDoc {
        SortLimitedDoc { doc_id, value }
    }

    pub fn doc_id(&self) -> u64 {
        self.doc_id
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Ranking order: `Less` means `self` comes first (has the higher value).
    pub fn cmp_descending(&self, other: &SortLimitedDoc) -> Ordering {
        OrderedFloat(other.value).cmp(&OrderedFloat(self.value))
    }
}

/// Stable-sorts `docs` into ranking order, highest value first.
pub fn sort_descending(docs: &mut [SortLimitedDoc]) {
    docs.sort_by(SortLimitedDoc::cmp_descending);
}
