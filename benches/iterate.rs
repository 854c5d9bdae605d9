use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;

use kmercore::{KmerModel, KmerValue, ModelCanonical, ModelDirect, ModelMinimizer, SeqData};

/// Generate a random DNA sequence for benchmarking.
fn random_dna(len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect()
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    for seq_len in [1_000usize, 100_000] {
        let seq = random_dna(seq_len);
        group.throughput(Throughput::Bytes(seq_len as u64));

        group.bench_with_input(BenchmarkId::new("direct_k31", seq_len), &seq, |b, seq| {
            let model = ModelDirect::<1>::new(31).unwrap();
            b.iter(|| {
                let mut acc = 0u64;
                model.iterate(&SeqData::ascii(seq), |v, _| {
                    acc ^= v.value().to_u64();
                });
                black_box(acc)
            });
        });

        group.bench_with_input(BenchmarkId::new("canonical_k31", seq_len), &seq, |b, seq| {
            let model = ModelCanonical::<1>::new(31).unwrap();
            b.iter(|| {
                let mut acc = 0u64;
                model.iterate(&SeqData::ascii(seq), |v, _| {
                    acc ^= v.value().to_u64();
                });
                black_box(acc)
            });
        });

        group.bench_with_input(
            BenchmarkId::new("minimizer_k31_m10", seq_len),
            &seq,
            |b, seq| {
                let model = ModelMinimizer::<1, ModelCanonical<1>>::new(31, 10).unwrap();
                b.iter(|| {
                    let mut acc = 0u64;
                    model.iterate(&SeqData::ascii(seq), |v, _| {
                        acc ^= v.minimizer().value().to_u64();
                    });
                    black_box(acc)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("canonical_k63", seq_len),
            &seq,
            |b, seq| {
                let model = ModelCanonical::<2>::new(63).unwrap();
                b.iter(|| {
                    let mut acc = 0u64;
                    model.iterate(&SeqData::ascii(seq), |v, _| {
                        acc ^= v.value().to_u64();
                    });
                    black_box(acc)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_iterate);
criterion_main!(benches);
