//! Embedding lookup and decode benchmarks
//!
//! Decode is a brute-force cosine scan over the whole table, so its cost grows
//! with vocab_size * embedding_dim. Forward is a row copy per token.
//!
//! Run with: cargo bench --bench decode_bench
//! With parallel: cargo bench --bench decode_bench --features parallel

use charembed::{EmbeddingTable, TokenId};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn create_table(vocab_size: usize, embedding_dim: usize) -> EmbeddingTable {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    EmbeddingTable::new(vocab_size, embedding_dim, &mut rng).unwrap()
}

fn bench_decode_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_vector");

    // Character vocabularies: ASCII, Latin + Cyrillic, broad Unicode corpus
    let sizes = [(96, 64), (512, 128), (4096, 256)];

    for (vocab_size, embedding_dim) in sizes {
        let table = create_table(vocab_size, embedding_dim);
        let query = table.forward(&[(vocab_size / 2) as TokenId]).remove(0);

        group.throughput(Throughput::Elements((vocab_size * embedding_dim) as u64));
        group.bench_with_input(
            BenchmarkId::new("scan", format!("{}x{}", vocab_size, embedding_dim)),
            &query,
            |b, query| b.iter(|| table.decode_vector(black_box(query.view()))),
        );
    }

    group.finish();
}

fn bench_decode_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_batch");
    let table = create_table(512, 128);

    for seq_len in [16, 128] {
        let tokens: Vec<TokenId> = (0..seq_len).map(|i| (i * 7 % 512) as TokenId).collect();
        let vectors = table.forward(&tokens);

        group.throughput(Throughput::Elements(seq_len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(seq_len), &vectors, |b, v| {
            b.iter(|| table.decode(black_box(v)))
        });
    }

    group.finish();
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward");
    let table = create_table(512, 128);

    for seq_len in [16, 1024] {
        let tokens: Vec<TokenId> = (0..seq_len).map(|i| (i % 600) as TokenId - 50).collect();

        group.throughput(Throughput::Elements(seq_len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(seq_len), &tokens, |b, t| {
            b.iter(|| table.forward(black_box(t)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode_vector, bench_decode_batch, bench_forward);
criterion_main!(benches);
