//! Deterministic generation of synthetic shards and query matches.

use crate::memory_shard::{MemorySegment, MemoryShard};

/// Shape of a generated shard.
#[derive(Debug, Clone)]
pub struct ShardSpec {
    /// Number of documents in each segment.
    pub segment_sizes: Vec<u32>,
    /// Name of the numeric field populated for every segment.
    pub field: String,
    /// Fraction of documents that have no value for `field`, in `[0, 1]`.
    pub missing_ratio: f64,
    pub seed: u64,
}

impl Default for ShardSpec {
    fn default() -> Self {
        ShardSpec {
            segment_sizes: vec![1000, 500, 250],
            field: "price".to_string(),
            missing_ratio: 0.05,
            seed: 5_489_034_811,
        }
    }
}

/// Builds a shard with random values in `[0, 1000)` for `spec.field`.
pub fn generate_shard(spec: &ShardSpec) -> anyhow::Result<MemoryShard> {
    anyhow::ensure!(
        !spec.segment_sizes.is_empty(),
        "a shard needs at least one segment"
    );
    anyhow::ensure!(
        (0.0..=1.0).contains(&spec.missing_ratio),
        "missing_ratio {} is outside [0, 1]",
        spec.missing_ratio
    );
    let total: u64 = spec.segment_sizes.iter().map(|&s| s as u64).sum();
    anyhow::ensure!(
        total <= u32::MAX as u64,
        "shard of {total} documents exceeds the ordinal space"
    );

    let mut rng = fastrand::Rng::with_seed(spec.seed);
    let segments = spec
        .segment_sizes
        .iter()
        .map(|&size| {
            let values = (0..size)
                .map(|_| {
                    if rng.f64() < spec.missing_ratio {
                        None
                    } else {
                        Some((rng.f64() * 1000.0).floor())
                    }
                })
                .collect();
            MemorySegment::new(size).with_field(spec.field.clone(), values)
        })
        .collect();
    Ok(MemoryShard::new(segments)?)
}

/// Picks `count` random global ordinals of `shard`, repeats allowed.
pub fn random_matches(shard: &MemoryShard, count: usize, rng: &mut fastrand::Rng) -> Vec<u32> {
    let max_doc = shard.max_doc();
    if max_doc == 0 {
        return Vec::new();
    }
    (0..count).map(|_| rng.u32(0..max_doc)).collect()
}
