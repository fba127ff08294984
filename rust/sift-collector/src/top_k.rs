//! Bounded top-K selection over [`SortLimitedDoc`]s.

use std::{cmp::Reverse, collections::BinaryHeap};

use ordered_float::OrderedFloat;

use crate::sort_limited_doc::SortLimitedDoc;

/// Keeps the `limit` highest-ranked documents pushed into it, in `O(limit)` memory.
///
/// The result is identical to collecting every document, stable-sorting them in
/// descending value order and truncating to `limit`: among equal values the earlier
/// pushed document wins.
pub struct TopK {
    limit: usize,
    // Min-heap on rank: the root is the weakest retained document.
    heap: BinaryHeap<Reverse<Ranked>>,
    pushed: u64,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct Ranked {
    value: OrderedFloat<f64>,
    seq: Reverse<u64>,
    doc_id: u64,
}

impl TopK {
    pub fn new(limit: usize) -> TopK {
        TopK {
            limit,
            heap: BinaryHeap::with_capacity(limit.min(1024)),
            pushed: 0,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of retained documents, at most `limit`.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total number of documents offered so far.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    pub fn push(&mut self, doc: SortLimitedDoc) {
        let ranked = Ranked {
            value: OrderedFloat(doc.value()),
            seq: Reverse(self.pushed),
            doc_id: doc.doc_id(),
        };
        self.pushed += 1;
        if self.heap.len() < self.limit {
            self.heap.push(Reverse(ranked));
            return;
        }
        if let Some(mut weakest) = self.heap.peek_mut() {
            if ranked > weakest.0 {
                weakest.0 = ranked;
            }
        }
    }

    /// Consumes the selection and returns it in ranking order.
    pub fn into_sorted_vec(self) -> Vec<SortLimitedDoc> {
        // Ascending order of `Reverse<Ranked>` is descending rank.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(r)| SortLimitedDoc::new(r.doc_id, r.value.0))
            .collect()
    }
}
