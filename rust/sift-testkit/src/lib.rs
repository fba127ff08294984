//! Test utilities for the sift crates.
//!
//! This crate provides:
//! - An in-memory shard made of segments, with numeric field values, that plays the
//!   role of the external index scan and field-value accessor
//! - Deterministic generation of synthetic shards and queries
//!
//! # Usage
//!
//! This crate is intended for use within the sift test suites.

pub mod data_gen;
pub mod memory_shard;

pub use memory_shard::{MemorySegment, MemoryShard};
