use criterion::{black_box, criterion_group, criterion_main, Criterion};
use seqdex::{IndexOptions, Input, SeqDex};
use std::fmt::Write as _;
use tempfile::tempdir;

/// Build a moderately large multi-record FASTA file and return the engine
/// opened against it, so each benchmark iteration measures only the query
/// path, not indexing.
fn build_engine(record_count: usize, line_len: usize) -> (tempfile::TempDir, SeqDex) {
    let dir = tempdir().unwrap();
    let fa_path = dir.path().join("bench.fa");

    let mut content = String::new();
    for i in 0..record_count {
        let _ = write!(content, ">seq{i}\n");
        let line = "ACGT".repeat(line_len / 4 + 1);
        for _ in 0..20 {
            content.push_str(&line[..line_len]);
            content.push('\n');
        }
    }
    std::fs::write(&fa_path, content).unwrap();

    let opts = IndexOptions::default().with_index_name(dir.path().join("bench.index").to_string_lossy());
    let engine = SeqDex::open(Input::File(fa_path), opts).unwrap();
    (dir, engine)
}

fn bench_subseq(c: &mut Criterion) {
    let (_dir, mut engine) = build_engine(500, 70);

    c.bench_function("subseq_small_window", |b| {
        b.iter(|| {
            let (bytes, _strand) = engine.subseq(black_box("seq250"), black_box(Some(100)), black_box(Some(140))).unwrap();
            black_box(bytes);
        })
    });

    c.bench_function("subseq_full_record", |b| {
        b.iter(|| {
            let (bytes, _strand) = engine.subseq(black_box("seq250"), black_box(None), black_box(None)).unwrap();
            black_box(bytes);
        })
    });
}

fn bench_lookup(c: &mut Criterion) {
    let (_dir, engine) = build_engine(2000, 60);

    c.bench_function("length_lookup", |b| {
        b.iter(|| {
            black_box(engine.length(black_box(b"seq1000")).unwrap());
        })
    });
}

criterion_group!(benches, bench_subseq, bench_lookup);
criterion_main!(benches);
