use std::sync::Arc;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion};

use kestrel::board::fen::BENCH_FENS;
use kestrel::Board;
use kestrel_engine::nnue::Network;
use kestrel_engine::threadpool::ThreadPool;
use kestrel_engine::time::uci_timer::PreLimits;

fn bench_fixed_depth(c: &mut Criterion) {
    let boards: Vec<Board> = BENCH_FENS
        .iter()
        .take(6)
        .map(|f| Board::from_fen(f, false).unwrap())
        .collect();
    let mut pool = ThreadPool::new(1, 16, Arc::new(Network::internal()), false).unwrap();

    let mut group = c.benchmark_group("Search");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));
    for depth in [5u16, 7, 9] {
        group.bench_with_input(BenchmarkId::new("Fixed depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                for board in boards.iter() {
                    pool.clear_all();
                    pool.search(board, &PreLimits::depth(depth));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(search_benches, bench_fixed_depth);
