//! An in-memory shard that drives collectors the way an index scan does.

use std::{collections::HashMap, sync::Arc};

use sift_collector::{Collector, DoubleValues, FieldValueSource, SegmentContext};
use sift_common::{DocId, Result, error::Error};

/// One segment: a local ordinal space plus per-field values.
#[derive(Debug, Clone, Default)]
pub struct MemorySegment {
    max_doc: u32,
    fields: HashMap<String, Arc<Vec<Option<f64>>>>,
}

impl MemorySegment {
    pub fn new(max_doc: u32) -> MemorySegment {
        MemorySegment {
            max_doc,
            fields: HashMap::new(),
        }
    }

    /// Adds a numeric field. `values[doc]` is the value of local document `doc`;
    /// documents past the end of `values` have no value.
    pub fn with_field(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.fields.insert(name.into(), Arc::new(values));
        self
    }

    pub fn max_doc(&self) -> u32 {
        self.max_doc
    }
}

/// A shard made of consecutive segments whose total document count fits in a `u32`.
#[derive(Debug, Clone, Default)]
pub struct MemoryShard {
    segments: Vec<MemorySegment>,
}

impl MemoryShard {
    /// Builds a shard from consecutive segments.
    ///
    /// Fails if the segments together hold more documents than a `u32` ordinal can
    /// address.
    pub fn new(segments: Vec<MemorySegment>) -> Result<MemoryShard> {
        segments
            .iter()
            .try_fold(0u32, |total, segment| total.checked_add(segment.max_doc))
            .ok_or_else(|| {
                Error::invalid_arg("segments", "document count exceeds the u32 ordinal space")
            })?;
        Ok(MemoryShard { segments })
    }

    /// Segment descriptors with their doc bases, in segment order.
    pub fn contexts(&self) -> Vec<SegmentContext> {
        let mut doc_base = 0;
        self.segments
            .iter()
            .enumerate()
            .map(|(ordinal, segment)| {
                let context = SegmentContext::new(ordinal, doc_base, segment.max_doc);
                doc_base += segment.max_doc;
                context
            })
            .collect()
    }

    /// Total number of document ordinals in the shard.
    pub fn max_doc(&self) -> u32 {
        self.segments.iter().map(MemorySegment::max_doc).sum()
    }

    /// Drives `collector` over the documents whose global ordinals are in `matches`.
    ///
    /// Segments are bound in increasing order; within a segment documents are delivered
    /// in the order they appear in `matches`. Ordinals past the end of the shard are
    /// ignored, as a real index would never produce them.
    pub fn scan(&self, matches: &[u32], collector: &mut dyn Collector) -> Result<()> {
        for context in self.contexts() {
            collector.bind_reader(&context)?;
            let range = context.doc_base..context.doc_base + context.max_doc;
            for &doc in matches.iter().filter(|&&doc| range.contains(&doc)) {
                collector.observe(doc - context.doc_base)?;
            }
        }
        Ok(())
    }

    /// Like [`scan`](Self::scan), but delivers each segment's matches in random order.
    pub fn scan_shuffled(
        &self,
        matches: &[u32],
        rng: &mut fastrand::Rng,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let mut shuffled = matches.to_vec();
        rng.shuffle(&mut shuffled);
        self.scan(&shuffled, collector)
    }

    /// Global ordinals of all documents whose `field` value satisfies `predicate`.
    pub fn select(&self, field: &str, predicate: impl Fn(f64) -> bool) -> Vec<u32> {
        self.contexts()
            .into_iter()
            .zip(&self.segments)
            .flat_map(|(context, segment)| {
                let values = segment.fields.get(field).cloned().unwrap_or_default();
                (0..segment.max_doc)
                    .filter(|&doc| {
                        values
                            .get(doc as usize)
                            .copied()
                            .flatten()
                            .is_some_and(&predicate)
                    })
                    .map(move |doc| context.doc_base + doc)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Value of `field` for a global ordinal.
    pub fn value(&self, field: &str, ordinal: u32) -> Option<f64> {
        let (context, segment) = self
            .contexts()
            .into_iter()
            .zip(&self.segments)
            .find(|(context, _)| ordinal < context.doc_base + context.max_doc)?;
        let values = segment.fields.get(field)?;
        values
            .get((ordinal - context.doc_base) as usize)
            .copied()
            .flatten()
    }
}

impl FieldValueSource for MemoryShard {
    fn doubles(&self, segment: &SegmentContext, field: &str) -> Result<Box<dyn DoubleValues>> {
        let values = self
            .segments
            .get(segment.ordinal)
            .ok_or_else(|| Error::invalid_arg("segment", "unknown segment ordinal"))?
            .fields
            .get(field)
            .cloned()
            .ok_or_else(|| Error::field_not_found(field))?;
        Ok(Box::new(move |doc: DocId| {
            values.get(doc as usize).copied().flatten()
        }))
    }
}
