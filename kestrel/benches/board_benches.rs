use std::hint::black_box;

use criterion::Criterion;

use kestrel::board::fen::BENCH_FENS;
use kestrel::{BitMove, Board};

fn bench_boards() -> Vec<Board> {
    BENCH_FENS.iter().map(|f| Board::from_fen(f, false).unwrap()).collect()
}

fn bench_board_clone(c: &mut Criterion) {
    let boards = bench_boards();
    c.bench_function("Board clone", |b| {
        b.iter(|| {
            for board in boards.iter() {
                black_box(board.clone());
            }
        })
    });
}

fn bench_apply_undo(c: &mut Criterion) {
    let mut boards: Vec<(Board, Vec<BitMove>)> = bench_boards()
        .into_iter()
        .map(|b| {
            let moves = b.generate_moves().vec();
            (b, moves)
        })
        .collect();
    c.bench_function("Board apply / undo all moves", |b| {
        b.iter(|| {
            for (board, moves) in boards.iter_mut() {
                for m in moves.iter() {
                    black_box(board.apply_move(*m));
                    board.undo_move();
                }
            }
        })
    });
}

fn bench_see(c: &mut Criterion) {
    let boards: Vec<(Board, Vec<BitMove>)> = bench_boards()
        .into_iter()
        .map(|b| {
            let moves = b.generate_moves().vec();
            (b, moves)
        })
        .collect();
    c.bench_function("Board see_ge", |b| {
        b.iter(|| {
            for (board, moves) in boards.iter() {
                for m in moves.iter() {
                    black_box(board.see_ge(*m, 0));
                }
            }
        })
    });
}

fn bench_fen_parse(c: &mut Criterion) {
    c.bench_function("Board from_fen", |b| {
        b.iter(|| {
            for fen in BENCH_FENS.iter() {
                black_box(Board::from_fen(black_box(fen), false).unwrap());
            }
        })
    });
}

criterion_group!(name = board_benches;
    config = Criterion::default().sample_size(30);
    targets = bench_board_clone, bench_apply_undo, bench_see, bench_fen_parse
);
