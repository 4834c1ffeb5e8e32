use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};

use kestrel::board::perft::perft;
use kestrel::Board;

fn perft_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("Perft");
    let start = Board::start_pos();
    let kiwipete =
        Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", false).unwrap();
    for depth in [2u16, 3] {
        group.bench_with_input(BenchmarkId::new("start", depth), &depth, |b, d| {
            b.iter(|| black_box(perft(&start, *d)))
        });
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, d| {
            b.iter(|| black_box(perft(&kiwipete, *d)))
        });
    }
    group.finish();
}

criterion_group!(name = perft_benches;
    config = Criterion::default().sample_size(10);
    targets = perft_all
);
