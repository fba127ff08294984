//! Low-level concurrent collections shared by the sift-* crates.

pub mod visitation_set;

pub use visitation_set::VisitationSet;
