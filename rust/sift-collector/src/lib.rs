//! Segment-scan collectors for transactional, deduplicated scanning.
//!
//! An external index scan drives a [`Collector`] through a plain synchronous callback
//! protocol: [`Collector::bind_reader`] once per segment, in increasing segment order,
//! followed by any number of [`Collector::observe`] calls for the matching documents of
//! that segment, in any order.
//!
//! - [`UniqueCountCollector`] counts gross and net matches against a transaction's
//!   cumulative [`VisitationSet`](sift_collections::VisitationSet).
//! - [`SortedLimitCollector`] additionally records `(document, sort value)` pairs for
//!   top-K extraction in descending value order.

pub mod collector;
pub mod field_values;
pub mod outcome;
pub mod segment;
pub mod sort_limited_doc;
pub mod sorted_limit;
pub mod top_k;
pub mod unique_count;

#[cfg(test)]
mod tests;

pub use collector::Collector;
pub use field_values::{DoubleValues, FieldValueSource, MissingValuePolicy};
pub use outcome::ShardScanOutcome;
pub use segment::SegmentContext;
pub use sort_limited_doc::SortLimitedDoc;
pub use sorted_limit::SortedLimitCollector;
pub use top_k::TopK;
pub use unique_count::UniqueCountCollector;
