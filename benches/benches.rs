use std::{fs, hint::black_box};

use criterion::{criterion_group, criterion_main, Criterion};
use syzygy_platform::{BitOps, Context, SearchPath, TableKind};

fn words() -> Vec<u64> {
    let mut x = 0x9e37_79b9_7f4a_7c15u64;
    (0..1024)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x | 1 << 63
        })
        .collect()
}

fn bench_bitops(c: &mut Criterion) {
    let words = words();
    let mut group = c.benchmark_group("bitops");

    let mut tiers = vec![BitOps::builtin(), BitOps::software()];
    tiers.extend(BitOps::hardware());

    for ops in tiers {
        group.bench_function(format!("popcount/{}", ops.strategy()), |b| {
            b.iter(|| {
                black_box(&words)
                    .iter()
                    .map(|&w| ops.popcount(w))
                    .sum::<u32>()
            })
        });
        group.bench_function(format!("lsb/{}", ops.strategy()), |b| {
            b.iter(|| black_box(&words).iter().map(|&w| ops.lsb(w)).sum::<u32>())
        });
    }

    group.finish();
}

fn bench_open_table(c: &mut Criterion) {
    let dirs: Vec<_> = (0..8)
        .map(|_| tempfile::tempdir().expect("temp dir"))
        .collect();
    let last = dirs.last().expect("at least one directory");
    let mut contents = TableKind::Wdl.magic().to_le_bytes().to_vec();
    contents.resize(1 << 16, 0);
    fs::write(last.path().join("KRPvKR.rtbw"), contents).expect("write");

    let ctx = Context::with_search_path(SearchPath::from_iter(dirs.iter().map(|d| d.path())));

    c.bench_function("open_table", |b| {
        b.iter(|| {
            ctx.open_table(black_box("KRPvKR"), TableKind::Wdl)
                .expect("valid table")
        })
    });
}

criterion_group!(benches, bench_bitops, bench_open_table);
criterion_main!(benches);
