#[macro_use]
extern crate criterion;

mod board_benches;
mod move_gen_benches;
mod perft_benches;

criterion_main! {
    board_benches::board_benches,
    move_gen_benches::movegen_benches,
    perft_benches::perft_benches
}
