use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use sift_collections::VisitationSet;

use crate::{collector::Collector, segment::SegmentContext, unique_count::UniqueCountCollector};

const SEGMENT_SIZE: u32 = 256;
const SEGMENTS: u32 = 4;

/// Runs one collector over `docs` (global ordinals), binding segments in increasing
/// order and delivering each segment's documents in the given, unsorted order.
fn run(visited: &Arc<VisitationSet>, docs: &[u32]) -> (u64, u64) {
    let mut collector = UniqueCountCollector::new(visited.clone());
    for segment in 0..SEGMENTS {
        let base = segment * SEGMENT_SIZE;
        collector
            .bind_reader(&SegmentContext::new(segment as usize, base, SEGMENT_SIZE))
            .unwrap();
        for &doc in docs.iter().filter(|&&d| d / SEGMENT_SIZE == segment) {
            collector.observe(doc - base).unwrap();
        }
    }
    (collector.gross_count(), collector.net_count())
}

fn random_docs(count: usize) -> Vec<u32> {
    (0..count)
        .map(|_| fastrand::u32(0..SEGMENT_SIZE * SEGMENTS))
        .collect()
}

#[test]
fn net_counts_sum_to_distinct_ordinals() {
    fastrand::seed(1_234_567);
    for _ in 0..20 {
        let visited = Arc::new(VisitationSet::new((SEGMENT_SIZE * SEGMENTS) as usize));
        let executions: Vec<_> = (0..fastrand::usize(1..6))
            .map(|_| random_docs(fastrand::usize(0..400)))
            .collect();

        let mut net_total = 0;
        for docs in &executions {
            let (gross, net) = run(&visited, docs);
            assert_eq!(gross, docs.len() as u64);
            net_total += net;
        }

        let distinct: HashSet<_> = executions.iter().flatten().copied().collect();
        assert_eq!(net_total, distinct.len() as u64);
        assert_eq!(visited.count(), distinct.len());
    }
}

#[test]
fn net_counts_are_independent_of_delivery_order() {
    fastrand::seed(99);
    let docs = random_docs(500);
    let mut shuffled = docs.clone();
    fastrand::shuffle(&mut shuffled);

    let a = run(&Arc::new(VisitationSet::new(1024)), &docs);
    let b = run(&Arc::new(VisitationSet::new(1024)), &shuffled);
    assert_eq!(a, b);
}

#[test]
fn concurrent_collectors_never_double_count() {
    let visited = Arc::new(VisitationSet::new((SEGMENT_SIZE * SEGMENTS) as usize));
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let visited = visited.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                fastrand::seed(t as u64);
                let docs = random_docs(600);
                barrier.wait();
                let counts = run(&visited, &docs);
                (docs, counts)
            })
        })
        .collect();

    let mut distinct = HashSet::new();
    let mut net_total = 0;
    for handle in handles {
        let (docs, (gross, net)) = handle.join().unwrap();
        assert_eq!(gross, docs.len() as u64);
        net_total += net;
        distinct.extend(docs);
    }
    assert_eq!(net_total, distinct.len() as u64);
}
