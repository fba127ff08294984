//! Contract of the numeric field-value lookup used for sorting.

use sift_common::{DocId, Result, error::Error};

use crate::segment::SegmentContext;

/// Per-segment accessor of a numeric field: maps segment-local document ids to values.
pub trait DoubleValues: Send {
    /// Returns the document's value, or `None` if the document has no value.
    fn get(&self, doc: DocId) -> Option<f64>;
}

impl<F> DoubleValues for F
where
    F: Fn(DocId) -> Option<f64> + Send,
{
    fn get(&self, doc: DocId) -> Option<f64> {
        self(doc)
    }
}

/// Resolves per-segment numeric field accessors.
///
/// Implemented by the index; the sorted collector asks for a fresh accessor every time
/// it is bound to a new segment.
pub trait FieldValueSource: Send + Sync {
    /// Returns the accessor of `field` for `segment`.
    ///
    /// # Errors
    ///
    /// Implementations typically return `FieldNotFound` for an unknown field.
    fn doubles(&self, segment: &SegmentContext, field: &str) -> Result<Box<dyn DoubleValues>>;
}

/// What a collector does when a document has no value for the sort field.
///
/// The default is [`Zero`](Self::Zero): missing values sort as `0.0` and the scan
/// carries on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MissingValuePolicy {
    /// Treat a missing value as `0.0`.
    #[default]
    Zero,
    /// Treat a missing value as the given constant.
    Default(f64),
    /// Fail the observation with `MissingValue`.
    Fail,
}

impl MissingValuePolicy {
    /// Applies the policy to a looked-up value.
    pub fn resolve(&self, field: &str, doc: DocId, value: Option<f64>) -> Result<f64> {
        match (value, self) {
            (Some(value), _) => Ok(value),
            (None, MissingValuePolicy::Zero) => Ok(0.0),
            (None, MissingValuePolicy::Default(value)) => Ok(*value),
            (None, MissingValuePolicy::Fail) => Err(Error::missing_value(field, doc)),
        }
    }
}
