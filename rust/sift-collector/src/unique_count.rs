use std::sync::Arc;

use sift_collections::VisitationSet;
use sift_common::{DocId, Result, ShardId, error::Error};

use crate::{collector::Collector, outcome::ShardScanOutcome, segment::SegmentContext};

/// Counts gross and net matches of one query execution against a transaction's
/// cumulative visitation set.
///
/// For every observed document the collector increments the gross count and marks the
/// document's shard-global ordinal in the shared set. If the ordinal was not marked
/// before, the document is new to the transaction and the net count is incremented as
/// well. Marking is an atomic test-and-set, so collectors of concurrent executions that
/// share the set never both count the same document as new.
///
/// When a delta set is attached via [`with_delta`](Self::with_delta), every net-new
/// ordinal is also marked there; this is how a transaction's current group learns which
/// documents became visible during its window.
pub struct UniqueCountCollector {
    visited: Arc<VisitationSet>,
    delta: Option<Arc<VisitationSet>>,
    segment: Option<SegmentContext>,
    gross_count: u64,
    net_count: u64,
}

impl UniqueCountCollector {
    pub fn new(visited: Arc<VisitationSet>) -> UniqueCountCollector {
        UniqueCountCollector {
            visited,
            delta: None,
            segment: None,
            gross_count: 0,
            net_count: 0,
        }
    }

    /// Records net-new documents in `delta` in addition to the cumulative set.
    pub fn with_delta(mut self, delta: Arc<VisitationSet>) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Number of documents observed by this collector, repeats included.
    pub fn gross_count(&self) -> u64 {
        self.gross_count
    }

    /// Number of observed documents that had never been observed in the transaction.
    pub fn net_count(&self) -> u64 {
        self.net_count
    }

    /// Global ordinal of the bound segment's first document.
    pub fn doc_base(&self) -> Option<u32> {
        self.segment.map(|s| s.doc_base)
    }

    pub fn visited(&self) -> &Arc<VisitationSet> {
        &self.visited
    }

    /// Translates `doc` into a shard-global ordinal that fits every attached set.
    ///
    /// Fails without touching any set if no segment is bound or the ordinal is out of
    /// range.
    pub(crate) fn global_ordinal(&self, doc: DocId) -> Result<usize> {
        let segment = self
            .segment
            .ok_or_else(|| Error::invalid_operation("observe before bind_reader"))?;
        let ordinal = segment.global_ordinal(doc);
        if !self.visited.check(ordinal) {
            return Err(Error::ordinal_out_of_range(ordinal, self.visited.capacity()));
        }
        if let Some(delta) = &self.delta {
            if !delta.check(ordinal) {
                return Err(Error::ordinal_out_of_range(ordinal, delta.capacity()));
            }
        }
        Ok(ordinal)
    }

    /// Forgets the bound segment; observations fail until the next successful bind.
    pub(crate) fn unbind(&mut self) {
        self.segment = None;
    }

    /// Counts an already validated ordinal; returns `true` if it is new to the transaction.
    pub(crate) fn record(&mut self, ordinal: usize) -> bool {
        self.gross_count += 1;
        if self.visited.mark(ordinal) {
            return false;
        }
        self.net_count += 1;
        if let Some(delta) = &self.delta {
            delta.mark(ordinal);
        }
        true
    }

    /// Packages the counts of this execution for `shard_id`.
    pub fn into_outcome(self, shard_id: ShardId) -> ShardScanOutcome {
        ShardScanOutcome {
            shard_id,
            gross_count: self.gross_count,
            net_count: self.net_count,
            sort_field: None,
            limit: None,
            docs: Vec::new(),
        }
    }
}

impl Collector for UniqueCountCollector {
    fn bind_reader(&mut self, segment: &SegmentContext) -> Result<()> {
        log::trace!(
            "binding segment {} (doc_base {}, max_doc {})",
            segment.ordinal,
            segment.doc_base,
            segment.max_doc
        );
        self.segment = Some(*segment);
        Ok(())
    }

    fn observe(&mut self, doc: DocId) -> Result<()> {
        let ordinal = self.global_ordinal(doc)?;
        self.record(ordinal);
        Ok(())
    }
}
