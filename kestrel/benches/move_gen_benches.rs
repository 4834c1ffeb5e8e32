use std::hint::black_box;

use criterion::Criterion;

use kestrel::board::fen::BENCH_FENS;
use kestrel::core::GenTypes;
use kestrel::Board;

fn movegen_ty(c: &mut Criterion, name: &str, gen_type: Option<GenTypes>, legal: bool) {
    let boards: Vec<Board> = BENCH_FENS
        .iter()
        .map(|f| Board::from_fen(f, false).unwrap())
        .filter(|b| !b.in_check())
        .collect();
    c.bench_function(name, |b| {
        b.iter(|| {
            for board in boards.iter() {
                match (gen_type, legal) {
                    (Some(g), _) => black_box(board.generate_moves_of_type(g)),
                    (None, true) => black_box(board.generate_moves()),
                    (None, false) => black_box(board.generate_pseudolegal_moves()),
                };
            }
        })
    });
}

fn all_movegen(c: &mut Criterion) {
    movegen_ty(c, "MoveGen All Legal", None, true);
    movegen_ty(c, "MoveGen All PseudoLegal", None, false);
    movegen_ty(c, "MoveGen Captures Legal", Some(GenTypes::Captures), true);
    movegen_ty(c, "MoveGen Quiets Legal", Some(GenTypes::Quiets), true);
}

criterion_group!(name = movegen_benches;
    config = Criterion::default().sample_size(50);
    targets = all_movegen
);
