use std::sync::Arc;

use sift_collections::VisitationSet;
use sift_common::{DocId, Result, ShardId, error::Error};

use crate::{
    collector::Collector,
    field_values::{DoubleValues, FieldValueSource, MissingValuePolicy},
    outcome::ShardScanOutcome,
    segment::SegmentContext,
    sort_limited_doc::{SortLimitedDoc, sort_descending},
    top_k::TopK,
    unique_count::UniqueCountCollector,
};

/// A [`UniqueCountCollector`] that also records every observed document together with
/// its value of a numeric sort field, for top-K extraction after the scan.
///
/// By default every observation is buffered (one entry per observed document, repeats
/// included) and [`into_sorted`](Self::into_sorted) sorts once and truncates. For large
/// result sets [`with_bounded_limit`](Self::with_bounded_limit) switches to a size-K
/// heap; the resulting ranking is the same.
///
/// The field accessor is re-resolved through the [`FieldValueSource`] on every
/// [`bind_reader`](Collector::bind_reader). Documents without a value are handled per
/// [`MissingValuePolicy`], which defaults to ranking them as `0.0`.
pub struct SortedLimitCollector {
    base: UniqueCountCollector,
    field: String,
    source: Arc<dyn FieldValueSource>,
    values: Option<Box<dyn DoubleValues>>,
    missing: MissingValuePolicy,
    docs: DocBuffer,
}

enum DocBuffer {
    Unbounded(Vec<SortLimitedDoc>),
    Bounded(TopK),
}

impl SortedLimitCollector {
    pub fn new(
        visited: Arc<VisitationSet>,
        field: impl Into<String>,
        source: Arc<dyn FieldValueSource>,
    ) -> SortedLimitCollector {
        SortedLimitCollector {
            base: UniqueCountCollector::new(visited),
            field: field.into(),
            source,
            values: None,
            missing: MissingValuePolicy::default(),
            docs: DocBuffer::Unbounded(Vec::new()),
        }
    }

    /// Records net-new documents in `delta` in addition to the cumulative set.
    pub fn with_delta(mut self, delta: Arc<VisitationSet>) -> Self {
        self.base = self.base.with_delta(delta);
        self
    }

    pub fn with_missing_values(mut self, policy: MissingValuePolicy) -> Self {
        self.missing = policy;
        self
    }

    /// Retains only the `limit` highest-ranked documents while scanning.
    ///
    /// Documents retained so far are carried over. Calling it again replaces the limit;
    /// what the previous limit already dropped is not recovered.
    pub fn with_bounded_limit(mut self, limit: usize) -> Self {
        let retained = match std::mem::replace(&mut self.docs, DocBuffer::Unbounded(Vec::new())) {
            DocBuffer::Unbounded(docs) => docs,
            DocBuffer::Bounded(previous) => previous.into_sorted_vec(),
        };
        let mut top = TopK::new(limit);
        retained.into_iter().for_each(|doc| top.push(doc));
        self.docs = DocBuffer::Bounded(top);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn gross_count(&self) -> u64 {
        self.base.gross_count()
    }

    pub fn net_count(&self) -> u64 {
        self.base.net_count()
    }

    pub fn base(&self) -> &UniqueCountCollector {
        &self.base
    }

    /// The raw observations in arrival order; `None` in bounded mode.
    pub fn doc_values(&self) -> Option<&[SortLimitedDoc]> {
        match &self.docs {
            DocBuffer::Unbounded(docs) => Some(docs),
            DocBuffer::Bounded(_) => None,
        }
    }

    /// Number of currently retained documents.
    pub fn retained(&self) -> usize {
        match &self.docs {
            DocBuffer::Unbounded(docs) => docs.len(),
            DocBuffer::Bounded(top) => top.len(),
        }
    }

    /// Consumes the collector and returns the retained documents in descending value
    /// order, truncated to `limit` if given.
    pub fn into_sorted(self, limit: Option<usize>) -> Vec<SortLimitedDoc> {
        let mut docs = match self.docs {
            DocBuffer::Unbounded(mut docs) => {
                sort_descending(&mut docs);
                docs
            }
            DocBuffer::Bounded(top) => top.into_sorted_vec(),
        };
        if let Some(limit) = limit {
            docs.truncate(limit);
        }
        docs
    }

    /// Packages counts and the ranked documents of this execution for `shard_id`.
    pub fn into_outcome(self, shard_id: ShardId, limit: Option<usize>) -> ShardScanOutcome {
        let gross_count = self.gross_count();
        let net_count = self.net_count();
        let sort_field = self.field.clone();
        ShardScanOutcome {
            shard_id,
            gross_count,
            net_count,
            sort_field: Some(sort_field),
            limit,
            docs: self.into_sorted(limit),
        }
    }
}

impl Collector for SortedLimitCollector {
    fn bind_reader(&mut self, segment: &SegmentContext) -> Result<()> {
        // A failed bind leaves the collector unbound rather than pairing the new
        // segment's ordinals with the previous segment's values.
        self.values = None;
        self.base.unbind();
        let values = self.source.doubles(segment, &self.field)?;
        self.base.bind_reader(segment)?;
        self.values = Some(values);
        Ok(())
    }

    fn observe(&mut self, doc: DocId) -> Result<()> {
        let ordinal = self.base.global_ordinal(doc)?;
        let values = self
            .values
            .as_ref()
            .ok_or_else(|| Error::invalid_operation("observe before bind_reader"))?;
        // Resolve the value before counting so a failed lookup leaves the
        // visitation state untouched.
        let value = self.missing.resolve(&self.field, doc, values.get(doc))?;
        self.base.record(ordinal);

        let entry = SortLimitedDoc::new(ordinal as u64, value);
        match &mut self.docs {
            DocBuffer::Unbounded(docs) => docs.push(entry),
            DocBuffer::Bounded(top) => top.push(entry),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sift_collections::VisitationSet;
    use sift_common::{DocId, Result, error::Error, error::ErrorKind};

    use super::SortedLimitCollector;
    use crate::{
        collector::Collector,
        field_values::{DoubleValues, FieldValueSource, MissingValuePolicy},
        segment::SegmentContext,
        sort_limited_doc::SortLimitedDoc,
    };

    /// Values keyed by global ordinal; `None` marks a document without a value.
    struct GlobalValues {
        field: &'static str,
        values: Arc<Vec<Option<f64>>>,
    }

    impl FieldValueSource for GlobalValues {
        fn doubles(&self, segment: &SegmentContext, field: &str) -> Result<Box<dyn DoubleValues>> {
            if field != self.field {
                return Err(Error::field_not_found(field));
            }
            let values = self.values.clone();
            let base = segment.doc_base as usize;
            Ok(Box::new(move |doc: DocId| {
                values.get(base + doc as usize).copied().flatten()
            }))
        }
    }

    fn source(values: Vec<Option<f64>>) -> Arc<dyn FieldValueSource> {
        Arc::new(GlobalValues {
            field: "score",
            values: Arc::new(values),
        })
    }

    fn ids(docs: &[SortLimitedDoc]) -> Vec<u64> {
        docs.iter().map(SortLimitedDoc::doc_id).collect()
    }

    #[test]
    fn test_sorts_descending_by_value() {
        let mut values = vec![None; 20];
        values[10] = Some(3.0);
        values[11] = Some(1.0);
        values[12] = Some(2.0);

        let visited = Arc::new(VisitationSet::new(20));
        let mut collector = SortedLimitCollector::new(visited, "score", source(values));
        collector
            .bind_reader(&SegmentContext::new(0, 0, 20))
            .unwrap();
        for doc in [10, 11, 12] {
            collector.observe(doc).unwrap();
        }
        assert_eq!(collector.doc_values().unwrap().len(), 3);

        let sorted = collector.into_sorted(None);
        assert_eq!(ids(&sorted), vec![10, 12, 11]);
        let values: Vec<_> = sorted.iter().map(SortLimitedDoc::value).collect();
        assert_eq!(values, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_records_repeats_and_counts_like_base() {
        let values = (0..10).map(|i| Some(i as f64)).collect();
        let visited = Arc::new(VisitationSet::new(10));
        visited.mark(4);

        let mut collector = SortedLimitCollector::new(visited, "score", source(values));
        collector
            .bind_reader(&SegmentContext::new(0, 0, 10))
            .unwrap();
        for doc in [4, 5, 6] {
            collector.observe(doc).unwrap();
        }
        assert_eq!(collector.gross_count(), 3);
        assert_eq!(collector.net_count(), 2);
        assert_eq!(ids(&collector.into_sorted(Some(2))), vec![6, 5]);
    }

    #[test]
    fn test_values_are_resolved_per_segment() {
        let values = (0..8).map(|i| Some(100.0 - i as f64)).collect();
        let visited = Arc::new(VisitationSet::new(8));
        let mut collector = SortedLimitCollector::new(visited, "score", source(values));

        collector
            .bind_reader(&SegmentContext::new(0, 0, 4))
            .unwrap();
        collector.observe(3).unwrap();
        collector
            .bind_reader(&SegmentContext::new(1, 4, 4))
            .unwrap();
        collector.observe(0).unwrap();

        let sorted = collector.into_sorted(None);
        assert_eq!(sorted, vec![
            SortLimitedDoc::new(3, 97.0),
            SortLimitedDoc::new(4, 96.0),
        ]);
    }

    #[test]
    fn test_missing_value_defaults_to_zero() {
        let values = vec![Some(-1.0), None, Some(1.0)];
        let visited = Arc::new(VisitationSet::new(3));
        let mut collector = SortedLimitCollector::new(visited, "score", source(values));
        collector
            .bind_reader(&SegmentContext::new(0, 0, 3))
            .unwrap();
        for doc in 0..3 {
            collector.observe(doc).unwrap();
        }
        let sorted = collector.into_sorted(None);
        assert_eq!(sorted[1], SortLimitedDoc::new(1, 0.0));
    }

    #[test]
    fn test_missing_value_fail_policy_leaves_state_untouched() {
        let values = vec![Some(1.0), None];
        let visited = Arc::new(VisitationSet::new(2));
        let mut collector = SortedLimitCollector::new(visited.clone(), "score", source(values))
            .with_missing_values(MissingValuePolicy::Fail);
        collector
            .bind_reader(&SegmentContext::new(0, 0, 2))
            .unwrap();
        collector.observe(0).unwrap();
        let err = collector.observe(1).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingValue { doc: 1, .. }));
        assert!(!visited.contains(1));
        assert_eq!(collector.gross_count(), 1);
        assert_eq!(collector.retained(), 1);
    }

    #[test]
    fn test_unknown_field_fails_bind() {
        let visited = Arc::new(VisitationSet::new(2));
        let mut collector = SortedLimitCollector::new(visited, "price", source(vec![]));
        let err = collector
            .bind_reader(&SegmentContext::new(0, 0, 2))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::FieldNotFound { .. }));
    }

    /// Serves `100 + doc` for segment 0 and has no values for any later segment.
    struct FirstSegmentOnly;

    impl FieldValueSource for FirstSegmentOnly {
        fn doubles(&self, segment: &SegmentContext, field: &str) -> Result<Box<dyn DoubleValues>> {
            if segment.ordinal != 0 {
                return Err(Error::field_not_found(field));
            }
            Ok(Box::new(|doc: DocId| Some(100.0 + doc as f64)))
        }
    }

    #[test]
    fn test_failed_bind_leaves_collector_unbound() {
        let visited = Arc::new(VisitationSet::new(20));
        let mut collector =
            SortedLimitCollector::new(visited.clone(), "score", Arc::new(FirstSegmentOnly));
        collector
            .bind_reader(&SegmentContext::new(0, 0, 10))
            .unwrap();
        collector.observe(3).unwrap();

        assert!(collector
            .bind_reader(&SegmentContext::new(1, 10, 10))
            .is_err());
        let err = collector.observe(3).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidOperation { .. }));
        assert!(!visited.contains(13));
        assert_eq!(visited.count(), 1);
        assert_eq!(collector.gross_count(), 1);
        assert_eq!(
            collector.into_sorted(None),
            vec![SortLimitedDoc::new(3, 103.0)]
        );
    }

    #[test]
    fn test_rebounding_limit_keeps_retained_docs() {
        let values = (0..6).map(|i| Some(i as f64)).collect();
        let visited = Arc::new(VisitationSet::new(6));
        let mut collector =
            SortedLimitCollector::new(visited, "score", source(values)).with_bounded_limit(3);
        collector
            .bind_reader(&SegmentContext::new(0, 0, 6))
            .unwrap();
        for doc in 0..6 {
            collector.observe(doc).unwrap();
        }

        let collector = collector.with_bounded_limit(2);
        assert_eq!(collector.retained(), 2);
        assert_eq!(ids(&collector.into_sorted(None)), vec![5, 4]);
    }

    #[test]
    fn test_bounded_limit_matches_unbounded() {
        fastrand::seed(77_001);
        let values: Vec<_> = (0..500).map(|_| Some(fastrand::f64() * 10.0)).collect();
        let docs: Vec<u32> = (0..500).map(|_| fastrand::u32(0..500)).collect();

        let run = |bounded: bool| {
            let visited = Arc::new(VisitationSet::new(500));
            let mut collector =
                SortedLimitCollector::new(visited, "score", source(values.clone()));
            if bounded {
                collector = collector.with_bounded_limit(25);
            }
            collector
                .bind_reader(&SegmentContext::new(0, 0, 500))
                .unwrap();
            for &doc in &docs {
                collector.observe(doc).unwrap();
            }
            let counts = (collector.gross_count(), collector.net_count());
            (counts, collector.into_sorted(Some(25)))
        };

        let (unbounded_counts, unbounded) = run(false);
        let (bounded_counts, bounded) = run(true);
        assert_eq!(unbounded_counts, bounded_counts);
        assert_eq!(unbounded.len(), 25);
        assert_eq!(unbounded, bounded);
    }

    #[test]
    fn test_into_outcome_carries_sort_parameters() {
        let values = vec![Some(2.0), Some(5.0), Some(1.0)];
        let visited = Arc::new(VisitationSet::new(3));
        let mut collector = SortedLimitCollector::new(visited, "score", source(values))
            .with_bounded_limit(2);
        collector
            .bind_reader(&SegmentContext::new(0, 0, 3))
            .unwrap();
        for doc in 0..3 {
            collector.observe(doc).unwrap();
        }
        assert!(collector.doc_values().is_none());
        let outcome = collector.into_outcome(7, Some(2));
        assert_eq!(outcome.shard_id, 7);
        assert_eq!(outcome.gross_count, 3);
        assert_eq!(outcome.sort_field.as_deref(), Some("score"));
        assert_eq!(outcome.limit, Some(2));
        assert_eq!(ids(&outcome.docs), vec![1, 0]);
    }
}
