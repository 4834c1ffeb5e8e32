//! Staged move ordering.
//!
//! A `MovePicker` hands out the pseudo-legal moves of a position one at a time, generating
//! and scoring each category only when the previous one is exhausted. The moves most likely to
//! cause a cutoff come first, so most nodes never generate their quiet moves at all. Legality is
//! left to the caller.

mod pick;

use kestrel::core::score::PIECE_VALUES;
use kestrel::{BitMove, Board, GenTypes, PieceType, ScoringMove, ScoringMoveList};

use crate::tables::prelude::*;

pub use self::pick::Pick;

pub struct MovePicker {
    pick: Pick,
    moves: ScoringMoveList,
    depth: i32,
    ttm: BitMove,
    killers: [BitMove; 2],
    cm: BitMove,
    threshold: i32,
    cont: [ContKey; 3],
    cur: usize,
    end: usize,
    end_bad_captures: usize,
}

impl MovePicker {
    fn with_stage(pick: Pick, ttm: BitMove, depth: i32) -> Self {
        MovePicker {
            pick,
            moves: ScoringMoveList::default(),
            depth,
            ttm,
            killers: [BitMove::null(); 2],
            cm: BitMove::null(),
            threshold: 0,
            cont: [ContKey::NONE; 3],
            cur: 0,
            end: 0,
            end_bad_captures: 0,
        }
    }

    /// MovePicker constructor for the main search. `cont` holds the continuation keys of
    /// one, two and four plies ago.
    pub fn main_search(
        board: &Board,
        depth: i32,
        ttm: BitMove,
        killers: &[BitMove; 2],
        counter_move: BitMove,
        cont: [ContKey; 3],
    ) -> Self {
        debug_assert!(depth > 0);
        let mut pick = if board.in_check() {
            Pick::EvasionSearch
        } else {
            Pick::MainSearch
        };

        let ttm = if ttm.is_null() || !board.pseudo_legal_move(ttm) {
            pick.incr();
            BitMove::null()
        } else {
            ttm
        };

        let mut mp = MovePicker::with_stage(pick, ttm, depth);
        mp.killers = *killers;
        mp.cm = counter_move;
        mp.cont = cont;
        mp
    }

    /// MovePicker constructor for quiescence search. Out of check only noisy moves are
    /// returned.
    pub fn qsearch(board: &Board, ttm: BitMove, cont: [ContKey; 3]) -> Self {
        let in_check = board.in_check();
        let mut pick = if in_check {
            Pick::EvasionSearch
        } else {
            Pick::QSearch
        };

        let ttm = if ttm.is_null()
            || !board.pseudo_legal_move(ttm)
            || !(in_check || board.is_noisy(ttm))
        {
            pick.incr();
            BitMove::null()
        } else {
            ttm
        };

        let mut mp = MovePicker::with_stage(pick, ttm, 0);
        mp.cont = cont;
        mp
    }

    /// MovePicker constructor for ProbCut: we generate captures with SEE higher
    /// than or equal to the given threshold.
    pub fn probcut_search(board: &Board, threshold: i32, ttm: BitMove) -> Self {
        debug_assert!(!board.in_check());
        let mut pick = Pick::ProbCutSearch;

        let ttm = if !ttm.is_null()
            && board.pseudo_legal_move(ttm)
            && board.is_noisy(ttm)
            && board.see_ge(ttm, threshold)
        {
            ttm
        } else {
            pick.incr();
            BitMove::null()
        };

        let mut mp = MovePicker::with_stage(pick, ttm, 0);
        mp.threshold = threshold;
        mp
    }

    /// The current stage.
    pub fn stage(&self) -> Pick {
        self.pick
    }

    fn score_captures(&mut self, board: &Board, hist: &Histories) {
        for m in self.moves[self.cur..self.end].iter_mut() {
            let mov = m.bit_move;
            let captured = board.captured_piece(mov).type_of();
            let moved = board.moved_piece(mov);
            m.score = 7 * PIECE_VALUES[captured as usize]
                + hist.capture[(moved, mov.get_dest(), captured)] as i32;
        }
    }

    fn score_quiets(&mut self, board: &Board, hist: &Histories) {
        let us = board.turn();
        let cont = self.cont;
        for m in self.moves[self.cur..self.end].iter_mut() {
            let mov = m.bit_move;
            let piece = board.moved_piece(mov);
            let to = mov.get_dest();
            m.score = 2 * hist.main[(us, mov)] as i32
                + 2 * hist.continuation[cont[0]][(piece, to)] as i32
                + hist.continuation[cont[1]][(piece, to)] as i32
                + hist.continuation[cont[2]][(piece, to)] as i32;
        }
    }

    fn score_evasions(&mut self, board: &Board, hist: &Histories) {
        let us = board.turn();
        let cont = self.cont;
        for m in self.moves[self.cur..self.end].iter_mut() {
            let mov = m.bit_move;
            if board.is_capture(mov) {
                let captured = board.captured_piece(mov).type_of();
                let moved = board.moved_piece(mov).type_of();
                m.score = PIECE_VALUES[captured as usize] - moved as i32 + (1 << 28);
            } else {
                let piece = board.moved_piece(mov);
                m.score = hist.main[(us, mov)] as i32
                    + hist.continuation[cont[0]][(piece, mov.get_dest())] as i32;
            }
        }
    }

    /// Swaps the best scoring move of `[cur, end)` to the front and returns it.
    fn pick_best(&mut self) -> ScoringMove {
        let slice = &mut self.moves[self.cur..self.end];
        let mut best = 0;
        for i in 1..slice.len() {
            if slice[i].score > slice[best].score {
                best = i;
            }
        }
        slice.swap(0, best);
        let mov = slice[0];
        self.cur += 1;
        mov
    }

    fn generate(&mut self, board: &Board, gen_type: GenTypes) {
        board.generate_pseudolegal_into(gen_type, &mut self.moves);
        self.end = self.moves.len();
    }

    /// Returns the next move, or a null move once every move has been returned. While
    /// `skip_quiets` is set the quiet stages are passed over.
    pub fn next(&mut self, board: &Board, hist: &Histories, skip_quiets: bool) -> BitMove {
        loop {
            match self.pick {
                Pick::MainSearch | Pick::EvasionSearch | Pick::QSearch | Pick::ProbCutSearch => {
                    self.pick.incr();
                    return self.ttm;
                }
                Pick::CapturesInit | Pick::ProbCutCapturesInit | Pick::QSearchInit => {
                    self.moves.clear();
                    self.cur = 0;
                    self.end_bad_captures = 0;
                    self.generate(board, GenTypes::Captures);
                    self.score_captures(board, hist);
                    partial_insertion_sort(&mut self.moves[..self.end], i32::MIN);
                    self.pick.incr();
                }
                Pick::GoodCaptures => {
                    while self.cur < self.end {
                        let mov = self.moves[self.cur];
                        self.cur += 1;
                        if mov.bit_move == self.ttm {
                            continue;
                        }
                        if board.see_ge(mov.bit_move, -mov.score / 18) {
                            return mov.bit_move;
                        }
                        self.moves[self.end_bad_captures] = mov;
                        self.end_bad_captures += 1;
                    }
                    self.pick.incr();
                }
                Pick::KillerOne | Pick::KillerTwo => {
                    let idx = self.pick as usize - Pick::KillerOne as usize;
                    let mov = self.killers[idx];
                    self.pick.incr();
                    if !mov.is_null()
                        && mov != self.ttm
                        && (idx == 0 || mov != self.killers[0])
                        && board.pseudo_legal_move(mov)
                        && !board.is_noisy(mov)
                    {
                        return mov;
                    }
                    // Only refutations that were returned are skipped by the quiet stage.
                    self.killers[idx] = BitMove::null();
                }
                Pick::CounterMove => {
                    self.pick.incr();
                    let cm = self.cm;
                    if !cm.is_null()
                        && cm != self.ttm
                        && cm != self.killers[0]
                        && cm != self.killers[1]
                        && board.pseudo_legal_move(cm)
                        && !board.is_noisy(cm)
                    {
                        return cm;
                    }
                    self.cm = BitMove::null();
                }
                Pick::QuietInit => {
                    if !skip_quiets {
                        self.moves.truncate(self.end_bad_captures);
                        self.cur = self.end_bad_captures;
                        self.generate(board, GenTypes::Quiets);
                        self.score_quiets(board, hist);
                        let limit = -3000 * self.depth;
                        partial_insertion_sort(&mut self.moves[self.cur..self.end], limit);
                    } else {
                        self.cur = self.end;
                    }
                    self.pick.incr();
                }
                Pick::QuietMoves => {
                    if !skip_quiets {
                        while self.cur < self.end {
                            let mov = self.moves[self.cur].bit_move;
                            self.cur += 1;
                            if mov != self.ttm
                                && mov != self.killers[0]
                                && mov != self.killers[1]
                                && mov != self.cm
                            {
                                return mov;
                            }
                        }
                    }
                    self.pick.incr();
                    self.cur = 0;
                }
                Pick::BadCaptures => {
                    if self.cur < self.end_bad_captures {
                        let mov = self.moves[self.cur].bit_move;
                        self.cur += 1;
                        return mov;
                    }
                    return BitMove::null();
                }
                Pick::EvasionsInit => {
                    self.moves.clear();
                    self.cur = 0;
                    self.generate(board, GenTypes::Evasions);
                    self.score_evasions(board, hist);
                    self.pick.incr();
                }
                Pick::AllEvasions | Pick::QCaptures => {
                    while self.cur < self.end {
                        let mov = self.pick_best().bit_move;
                        if mov != self.ttm {
                            return mov;
                        }
                    }
                    return BitMove::null();
                }
                Pick::ProbCutCaptures => {
                    while self.cur < self.end {
                        let mov = self.pick_best().bit_move;
                        if mov != self.ttm && board.see_ge(mov, self.threshold) {
                            return mov;
                        }
                    }
                    return BitMove::null();
                }
            }
        }
    }
}

/// Sorts the moves scoring at least `limit` to the front in descending order. The order of
/// the remaining moves is unspecified.
fn partial_insertion_sort(moves: &mut [ScoringMove], limit: i32) {
    if moves.is_empty() {
        return;
    }
    let mut sorted_end = 0;
    for p in 1..moves.len() {
        if moves[p].score >= limit {
            let tmp = moves[p];
            sorted_end += 1;
            moves[p] = moves[sorted_end];
            let mut q = sorted_end;
            while q > 0 && moves[q - 1].score < tmp.score {
                moves[q] = moves[q - 1];
                q -= 1;
            }
            moves[q] = tmp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel::core::masks::START_FEN;
    use kestrel::{MoveList, SQ};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn mp_partial_insertion_sort() {
        let scores = [34, 20, -5, 50, 3, 0, 9, -1, 2];
        let mut moves = ScoringMoveList::default();
        for s in scores.iter() {
            moves.push_score(ScoringMove::new_score(BitMove::null(), *s));
        }
        partial_insertion_sort(&mut moves, 4);
        let front: Vec<i32> = moves[..4].iter().map(|m| m.score).collect();
        assert_eq!(front, vec![50, 34, 20, 9]);
        assert!(moves[4..].iter().all(|m| m.score < 4));
    }

    #[test]
    fn mp_partial_insertion_sort_rand() {
        let mut rng = StdRng::seed_from_u64(11);
        for _x in 0..10 {
            let num = rng.gen_range(10..200);
            let mut moves = ScoringMoveList::default();
            for _ in 0..num {
                let s = rng.gen_range(-30_000..30_000);
                moves.push_score(ScoringMove::new_score(BitMove::null(), s));
            }
            let limit = rng.gen_range(-30_000..30_000);
            partial_insertion_sort(&mut moves, limit);

            let sorted = moves.iter().take_while(|m| m.score >= limit).count();
            assert!(moves[..sorted].windows(2).all(|w| w[0].score >= w[1].score));
            assert!(moves[sorted..].iter().all(|m| m.score < limit));
        }
    }

    fn random_move(rng: &mut StdRng) -> BitMove {
        BitMove::new(rng.gen())
    }

    /// Walks the picker to the end and checks it returns exactly the pseudo-legal moves.
    fn movepick_main_search(b: &Board, ttm: BitMove, killers: &[BitMove; 2], cm: BitMove, depth: i32) {
        let hist = Histories::new();
        let real_moves = b.generate_pseudolegal_moves();
        let mut mp = MovePicker::main_search(b, depth, ttm, killers, cm, [ContKey::NONE; 3]);

        let mut moves_mp = MoveList::default();
        let mut mp_next = mp.next(b, &hist, false);
        while !mp_next.is_null() {
            assert!(
                !moves_mp.contains(mp_next),
                "duplicate move {} in {}",
                mp_next,
                b.fen()
            );
            moves_mp.push(mp_next);
            mp_next = mp.next(b, &hist, false);
        }

        for mov in real_moves.iter() {
            assert!(
                moves_mp.contains(*mov),
                "MovePicker is missing {} in {} (ttm {}, killers {} {}, counter {})",
                mov,
                b.fen(),
                ttm,
                killers[0],
                killers[1],
                cm
            );
        }
        assert_eq!(moves_mp.len(), real_moves.len(), "fen: {}", b.fen());
    }

    #[test]
    fn movepick_startpos_blank() {
        movepick_main_search(
            &Board::start_pos(),
            BitMove::null(),
            &[BitMove::null(); 2],
            BitMove::null(),
            5,
        );
    }

    #[test]
    fn movepick_startpos_rand_op() {
        let b = Board::from_fen(START_FEN, false).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _x in 0..25 {
            let killers = [random_move(&mut rng), random_move(&mut rng)];
            movepick_main_search(&b, random_move(&mut rng), &killers, random_move(&mut rng), 4);
        }
    }

    #[test]
    fn movepick_valid_refutations() {
        let b = Board::start_pos();
        let killers = [BitMove::make(SQ::G1, SQ::F3), BitMove::make(SQ::B1, SQ::C3)];
        let ttm = BitMove::make(SQ::E2, SQ::E4);
        let hist = Histories::new();
        let mut mp = MovePicker::main_search(&b, 3, ttm, &killers, killers[0], [ContKey::NONE; 3]);
        assert_eq!(mp.next(&b, &hist, false), ttm);
        assert_eq!(mp.next(&b, &hist, false), killers[0]);
        assert_eq!(mp.next(&b, &hist, false), killers[1]);
        movepick_main_search(&b, ttm, &killers, killers[0], 3);
    }

    #[test]
    fn movepick_random_positions() {
        let mut rng = StdRng::seed_from_u64(99);
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ];
        for fen in fens.iter() {
            let mut b = Board::from_fen(fen, false).unwrap();
            for _ in 0..30 {
                let moves = b.generate_moves();
                if moves.is_empty() {
                    break;
                }
                let ttm = moves[rng.gen_range(0..moves.len())];
                let killers = [random_move(&mut rng), random_move(&mut rng)];
                movepick_main_search(&b, ttm, &killers, random_move(&mut rng), rng.gen_range(1..20));
                b.apply_move(moves[rng.gen_range(0..moves.len())]);
            }
        }
    }

    #[test]
    fn movepick_incorrect_move1() {
        let b = Board::from_fen(
            "rnb1k2r/pppp1ppp/7n/2b1P3/4P3/2P5/PP3PPP/RN1QKBNR w KQkq - 1 6",
            false,
        )
        .unwrap();
        let ttm = BitMove::new(54048);
        let killers = [BitMove::new(5443), BitMove::new(65354)];
        let cm = BitMove::new(62443);
        movepick_main_search(&b, ttm, &killers, cm, 42);
    }

    #[test]
    fn movepick_incorrect_move2() {
        let b = Board::from_fen(
            "r4r2/1n1k1pp1/p1p4p/5n1P/1PpPB3/6PR/P3NP2/3RK3 w - - 4 28",
            false,
        )
        .unwrap();
        let ttm = BitMove::new(31709);
        let killers = [BitMove::new(3442), BitMove::new(29836)];
        let cm = BitMove::new(836);
        movepick_main_search(&b, ttm, &killers, cm, 15);
    }

    #[test]
    fn qsearch_only_noisy_and_evasions_complete() {
        let hist = Histories::new();
        let b = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            false,
        )
        .unwrap();
        let mut mp = MovePicker::qsearch(&b, BitMove::make(SQ::A2, SQ::A3), [ContKey::NONE; 3]);
        let mut count = 0;
        loop {
            let m = mp.next(&b, &hist, false);
            if m.is_null() {
                break;
            }
            assert!(b.is_noisy(m));
            count += 1;
        }
        let mut captures = ScoringMoveList::default();
        b.generate_pseudolegal_into(GenTypes::Captures, &mut captures);
        assert_eq!(count, captures.len());

        let check = Board::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1", false).unwrap();
        let mut mp = MovePicker::qsearch(&check, BitMove::null(), [ContKey::NONE; 3]);
        let mut n = 0;
        while !mp.next(&check, &hist, false).is_null() {
            n += 1;
        }
        assert_eq!(n, check.generate_pseudolegal_moves().len());
    }

    #[test]
    fn probcut_respects_threshold() {
        let hist = Histories::new();
        // Queen takes a defended pawn, knight takes an undefended rook.
        let b = Board::from_fen("4k3/8/2p5/1p3r2/8/4N3/1Q6/4K3 w - - 0 1", false).unwrap();
        let mut mp = MovePicker::probcut_search(&b, 200, BitMove::null());
        let mut got = Vec::new();
        loop {
            let m = mp.next(&b, &hist, false);
            if m.is_null() {
                break;
            }
            got.push(m);
        }
        assert_eq!(got, vec![BitMove::make(SQ::E3, SQ::F5)]);
    }
}
