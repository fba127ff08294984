use sift_common::DocId;

/// Describes one segment of a shard as seen by a collector.
///
/// A segment has its own local document ordinal space `[0, max_doc)`; `doc_base` maps
/// it into the shard-global ordinal space: `global = doc_base + local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentContext {
    /// Position of the segment within the shard's segment list.
    pub ordinal: usize,
    /// Shard-global ordinal of the segment's first document.
    pub doc_base: u32,
    /// Number of document ordinals in the segment.
    pub max_doc: u32,
}

impl SegmentContext {
    pub fn new(ordinal: usize, doc_base: u32, max_doc: u32) -> SegmentContext {
        SegmentContext {
            ordinal,
            doc_base,
            max_doc,
        }
    }

    /// Translates a segment-local document id into the shard-global ordinal.
    #[inline]
    pub fn global_ordinal(&self, doc: DocId) -> usize {
        self.doc_base as usize + doc as usize
    }

    /// Exclusive upper bound of the global ordinals covered by this segment.
    pub fn global_end(&self) -> usize {
        self.doc_base as usize + self.max_doc as usize
    }
}
