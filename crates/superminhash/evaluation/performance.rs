use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use superminhash::build_hasher::UnstableDefaultBuildHasher;
use superminhash::{ChaChaSeeder, Signature};

fn criterion_benchmark(c: &mut Criterion) {
    let lengths = [64, 256, 1024];
    let sizes = [100, 1000, 10000];

    for size in &sizes {
        let mut group = c.benchmark_group(format!("push:{size}"));

        for length in lengths {
            group.bench_function(format!("signature_{length}"), |b| {
                b.iter(|| {
                    let mut s = Signature::new(length).expect("valid length");
                    for i in 0..*size {
                        s.push_hash(i);
                    }
                    black_box(s.active_bound())
                })
            });
        }
        group.bench_function("signature_bytes_256", |b| {
            let items: Vec<String> = (0..*size).map(|i| i.to_string()).collect();
            b.iter(|| {
                let mut s = Signature::new(256).expect("valid length");
                s.extend(&items);
                black_box(s.active_bound())
            })
        });
        group.bench_function("signature_std_hasher_256", |b| {
            let seeder = ChaChaSeeder::<UnstableDefaultBuildHasher>::default();
            b.iter(|| {
                let mut s = Signature::with_seeder(256, seeder.clone()).expect("valid length");
                for i in 0..*size {
                    s.push(i.to_le_bytes());
                }
                black_box(s.active_bound())
            })
        });
    }

    let mut group = c.benchmark_group("similarity");
    for length in lengths {
        let mut a = Signature::new(length).expect("valid length");
        let mut b = Signature::new(length).expect("valid length");
        for i in 0..1000u64 {
            a.push_hash(i);
            b.push_hash(i * 2);
        }
        group.bench_function(format!("signature_{length}"), |bench| {
            bench.iter(|| black_box(a.similarity(&b)))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
