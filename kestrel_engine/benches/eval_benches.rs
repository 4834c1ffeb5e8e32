use std::hint::black_box;

use criterion::{BatchSize, Criterion};

use kestrel::board::fen::BENCH_FENS;
use kestrel::{BitMove, Board};
use kestrel_engine::nnue::{AccumulatorStack, Network};

fn bench_boards() -> Vec<(Board, Vec<BitMove>)> {
    BENCH_FENS
        .iter()
        .map(|f| {
            let board = Board::from_fen(f, false).unwrap();
            let moves = board.generate_moves().vec();
            (board, moves)
        })
        .collect()
}

fn bench_full_refresh(c: &mut Criterion) {
    let net = Network::internal();
    let boards = bench_boards();
    c.bench_function("NNUE full refresh", |b| {
        b.iter(|| {
            for (board, _) in boards.iter() {
                black_box(net.evaluate_board(black_box(board)));
            }
        })
    });
}

fn bench_incremental(c: &mut Criterion) {
    let net = Network::internal();
    let boards = bench_boards();
    c.bench_function("NNUE incremental update", |b| {
        b.iter_batched(
            || (boards.clone(), AccumulatorStack::new(&net)),
            |(mut boards, mut acc)| {
                for (board, moves) in boards.iter_mut() {
                    acc.reset(board, &net);
                    for m in moves.iter() {
                        board.apply_move(*m);
                        acc.push(board.dirty_piece());
                        black_box(acc.evaluate(board, &net));
                        acc.pop();
                        board.undo_move();
                    }
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(name = eval_benches;
    config = Criterion::default().sample_size(30);
    targets = bench_full_refresh, bench_incremental
);
