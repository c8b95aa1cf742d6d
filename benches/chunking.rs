use criterion::{Criterion, criterion_group, criterion_main};
use ragserve::ingest::{ChunkingConfig, split_text};
use std::hint::black_box;

fn sample_corpus() -> String {
    let paragraph = "The vector index is rebuilt whenever the corpus directory changes. \
        Each document is split into overlapping chunks before embedding. \
        Retrieval returns the nearest chunks to the query vector.\n\n";
    paragraph.repeat(200)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let text = sample_corpus();
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| split_text(black_box(&text), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
