use sift_common::{DocId, Result};

use crate::segment::SegmentContext;

/// Callback interface invoked by an index scan.
///
/// Per query execution the scan calls [`bind_reader`](Self::bind_reader) once per
/// segment, in increasing segment order, and then [`observe`](Self::observe) zero or
/// more times with segment-local ids of the matching documents of the bound segment.
///
/// An error returned from either method aborts the scan of this collector only; the
/// scan driver reports it to its caller.
pub trait Collector {
    /// Prepares the collector for documents of `segment`.
    fn bind_reader(&mut self, segment: &SegmentContext) -> Result<()>;

    /// Consumes one matching document of the currently bound segment.
    fn observe(&mut self, doc: DocId) -> Result<()>;

    /// Whether documents may be delivered out of ordinal order.
    fn accepts_docs_out_of_order(&self) -> bool {
        true
    }
}

impl<C: Collector + ?Sized> Collector for &mut C {
    fn bind_reader(&mut self, segment: &SegmentContext) -> Result<()> {
        (**self).bind_reader(segment)
    }

    fn observe(&mut self, doc: DocId) -> Result<()> {
        (**self).observe(doc)
    }

    fn accepts_docs_out_of_order(&self) -> bool {
        (**self).accepts_docs_out_of_order()
    }
}
