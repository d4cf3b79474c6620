//! Benchmark for the nonce search kernels

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use scanhash_core::{BlockHeader, KernelKind, NonceRange, ShareTarget, Work, new_scanner};

const BATCH: u64 = 4096;

fn bench_work() -> Work {
    // A target nothing meets, so every scan walks the whole range.
    Work::from_header(&BlockHeader::new([0x42; 80]), ShareTarget::DIFFICULTY_ONE)
}

fn bench_kernels(c: &mut Criterion) {
    let work = bench_work();
    let mut group = c.benchmark_group("scan");
    group.throughput(Throughput::Elements(BATCH));

    for kind in KernelKind::available() {
        let Ok(mut scanner) = new_scanner(kind) else {
            continue;
        };
        scanner.prepare_work(&work);

        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            let mut start: u32 = 0;
            b.iter(|| {
                let range = NonceRange::new(start, u64::from(start) + BATCH).unwrap();
                start = start.wrapping_add(BATCH as u32) % (u32::MAX - BATCH as u32);
                scanner.scan(black_box(range)).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_reference(c: &mut Criterion) {
    let header = BlockHeader::new([0x42; 80]);

    c.bench_function("sha256d_reference", |b| {
        let mut nonce: u32 = 0;
        b.iter(|| {
            nonce = nonce.wrapping_add(1);
            header.sha256d_with_nonce(black_box(nonce))
        })
    });
}

criterion_group!(benches, bench_kernels, bench_reference);
criterion_main!(benches);
