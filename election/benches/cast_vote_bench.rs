use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ballot_election::{ElectionConfig, ElectionProcessor, RecordKey};
use ballot_nullables::NullLedger;
use ballot_types::CandidateId;

fn initialized() -> ElectionProcessor<NullLedger> {
    let processor = ElectionProcessor::new(Arc::new(NullLedger::new()), ElectionConfig::default());
    processor.init_election().unwrap();
    processor
}

fn bench_cast_vote(c: &mut Criterion) {
    let processor = initialized();
    let mut next = 0u64;
    c.bench_function("cast_vote_fresh_receipt", |b| {
        b.iter(|| {
            next += 1;
            let receipt = format!("R{next}");
            black_box(processor.cast_vote(&receipt, "01", "north").unwrap())
        });
    });

    c.bench_function("cast_vote_duplicate_receipt", |b| {
        b.iter(|| black_box(processor.cast_vote("R1", "02", "north").is_err()));
    });
}

fn bench_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("reads");

    // History length grows with the number of votes a candidate received.
    for votes in [10u64, 100, 1_000] {
        let processor = initialized();
        for i in 0..votes {
            processor
                .cast_vote(&format!("R{i}"), "01", "north")
                .unwrap();
        }
        let key = RecordKey::Candidate(CandidateId::new("01").unwrap());

        group.bench_with_input(BenchmarkId::new("history", votes), &key, |b, key| {
            b.iter(|| black_box(processor.get_history(key).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("audit", votes), &votes, |b, _| {
            b.iter(|| black_box(processor.audit_tally().unwrap()));
        });
    }
    group.bench_function("results", |b| {
        let processor = initialized();
        b.iter(|| black_box(processor.get_results().unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_cast_vote, bench_reads);
criterion_main!(benches);
