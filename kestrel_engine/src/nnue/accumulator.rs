//! Incremental maintenance of the hidden layer along the search path.
//!
//! Every move made by the search pushes a frame recording which pieces moved. Frames are
//! only materialised when a position is actually evaluated: the nearest ancestor holding a
//! computed accumulator is found and the recorded changes are replayed from there. A king
//! move into another input bucket (or across the mirroring line) invalidates everything
//! before it for that perspective, and is handled by a refresh through the [`FinnyCache`].

use kestrel::board::board_state::DirtyPiece;
use kestrel::core::masks::PIECE_CNT;
use kestrel::core::score::Value;
use kestrel::core::ALL_PIECES;
use kestrel::core::sq::NO_SQ;
use kestrel::{BitBoard, Board, Piece, PieceType, Player};

use super::features::*;
use super::network::Network;
use crate::consts::THREAD_STACK_SIZE;

const PERSPECTIVES: [Player; 2] = [Player::White, Player::Black];

/// The hidden layer of both perspectives, indexed by `Player`.
#[derive(Clone)]
#[repr(C, align(64))]
pub struct Accumulator {
    pub vals: [[i16; HIDDEN]; 2],
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator {
            vals: [[0; HIDDEN]; 2],
        }
    }
}

#[derive(Clone, Default)]
struct Frame {
    acc: Accumulator,
    computed: [bool; 2],
    dirty: DirtyPiece,
}

/// A cached accumulator for one (perspective, bucket, mirror) triple, together with the
/// pieces it was computed from.
#[derive(Clone)]
struct CacheEntry {
    acc: [i16; HIDDEN],
    pieces: [BitBoard; PIECE_CNT],
}

/// Refresh table keyed by king bucket. A refresh only applies the difference between the
/// cached piece set and the current board, which is far smaller than rebuilding from the
/// biases.
pub struct FinnyCache {
    entries: Vec<CacheEntry>,
}

impl FinnyCache {
    fn new(net: &Network) -> FinnyCache {
        let mut acc = [0; HIDDEN];
        acc.copy_from_slice(net.biases());
        let entry = CacheEntry {
            acc,
            pieces: [BitBoard(0); PIECE_CNT],
        };
        FinnyCache {
            entries: vec![entry; 2 * KING_BUCKETS * 2],
        }
    }

    fn reset(&mut self, net: &Network) {
        for entry in self.entries.iter_mut() {
            entry.acc.copy_from_slice(net.biases());
            entry.pieces = [BitBoard(0); PIECE_CNT];
        }
    }

    /// Brings the entry of the board's king position up to date and copies it out.
    fn refresh(&mut self, board: &Board, net: &Network, perspective: Player, out: &mut [i16]) {
        let key = KingKey::of(board, perspective);
        let entry = &mut self.entries[perspective as usize * KING_BUCKETS * 2 + key.slot()];
        for piece in ALL_PIECES.iter().copied() {
            let now = board.piece_bb(piece.player_lossy(), piece.type_of());
            let was = entry.pieces[piece as usize];
            for sq in now & !was {
                net.add_feature(&mut entry.acc, feature_index(perspective, key, piece, sq));
            }
            for sq in was & !now {
                net.sub_feature(&mut entry.acc, feature_index(perspective, key, piece, sq));
            }
            entry.pieces[piece as usize] = now;
        }
        out.copy_from_slice(&entry.acc);
    }
}

/// Stack of accumulators mirroring the moves made on a search thread's board.
pub struct AccumulatorStack {
    frames: Vec<Frame>,
    len: usize,
    cache: FinnyCache,
}

impl AccumulatorStack {
    pub fn new(net: &Network) -> AccumulatorStack {
        AccumulatorStack {
            frames: vec![Frame::default(); THREAD_STACK_SIZE],
            len: 1,
            cache: FinnyCache::new(net),
        }
    }

    /// Discards every frame and computes the root accumulator of `board` from scratch.
    pub fn reset(&mut self, board: &Board, net: &Network) {
        self.cache.reset(net);
        self.len = 1;
        let root = &mut self.frames[0];
        root.dirty = DirtyPiece::default();
        for p in PERSPECTIVES {
            self.cache.refresh(board, net, p, &mut root.acc.vals[p as usize]);
            root.computed[p as usize] = true;
        }
    }

    /// Records a move just made on the board, deferring any computation.
    #[inline]
    pub fn push(&mut self, dirty: &DirtyPiece) {
        debug_assert!(self.len < self.frames.len());
        let frame = &mut self.frames[self.len];
        frame.dirty = *dirty;
        frame.computed = [false; 2];
        self.len += 1;
    }

    /// Forgets the last move.
    #[inline]
    pub fn pop(&mut self) {
        debug_assert!(self.len > 1);
        self.len -= 1;
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.len
    }

    /// Evaluates the board, whose state must match the frames pushed since the last reset.
    pub fn evaluate(&mut self, board: &Board, net: &Network) -> Value {
        for p in PERSPECTIVES {
            self.materialise(board, net, p);
        }
        let top = &self.frames[self.len - 1].acc;
        let us = board.turn();
        net.evaluate(
            &top.vals[us as usize],
            &top.vals[!us as usize],
            output_bucket(board),
        )
    }

    /// The accumulator of the current position, computing it if needed.
    pub fn current(&mut self, board: &Board, net: &Network) -> &Accumulator {
        for p in PERSPECTIVES {
            self.materialise(board, net, p);
        }
        &self.frames[self.len - 1].acc
    }

    fn materialise(&mut self, board: &Board, net: &Network, perspective: Player) {
        let p = perspective as usize;
        let top = self.len - 1;
        if self.frames[top].computed[p] {
            return;
        }

        let mut base = top;
        while !self.frames[base].computed[p] {
            if base == 0 || requires_refresh(&self.frames[base].dirty, perspective) {
                let frame = &mut self.frames[top];
                self.cache.refresh(board, net, perspective, &mut frame.acc.vals[p]);
                frame.computed[p] = true;
                return;
            }
            base -= 1;
        }

        let key = KingKey::of(board, perspective);
        for i in base + 1..=top {
            self.apply_frame(net, i, perspective, key);
        }
    }

    fn apply_frame(&mut self, net: &Network, i: usize, perspective: Player, key: KingKey) {
        let p = perspective as usize;
        let (before, after) = self.frames.split_at_mut(i);
        let src = &before[i - 1].acc.vals[p];
        let frame = &mut after[0];

        let mut adds = [0usize; 3];
        let mut subs = [0usize; 3];
        let (mut n_add, mut n_sub) = (0, 0);
        for (piece, from, to) in frame.dirty.iter() {
            if from != NO_SQ {
                subs[n_sub] = feature_index(perspective, key, piece, from);
                n_sub += 1;
            }
            if to != NO_SQ {
                adds[n_add] = feature_index(perspective, key, piece, to);
                n_add += 1;
            }
        }
        net.update(src, &mut frame.acc.vals[p], &adds[..n_add], &subs[..n_sub]);
        frame.computed[p] = true;
    }
}

/// Returns if a move changed the input bucket or the mirroring of a perspective.
#[inline]
fn requires_refresh(dirty: &DirtyPiece, perspective: Player) -> bool {
    let king = Piece::make(perspective, PieceType::K);
    dirty.iter().any(|(piece, from, to)| {
        piece == king
            && from != NO_SQ
            && to != NO_SQ
            && KingKey::new(perspective, from) != KingKey::new(perspective, to)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn check_against_scratch(stack: &mut AccumulatorStack, board: &Board, net: &Network) {
        let acc = stack.current(board, net).clone();
        for p in PERSPECTIVES {
            let mut scratch = [0i16; HIDDEN];
            net.refresh(board, p, &mut scratch);
            assert!(
                acc.vals[p as usize].iter().eq(scratch.iter()),
                "incremental accumulator diverged at {}",
                board.fen()
            );
        }
    }

    #[test]
    fn incremental_matches_refresh_on_random_walks() {
        let net = Network::internal();
        let mut rng = StdRng::seed_from_u64(0x6b65_7374);
        let fens = [
            kestrel::core::masks::START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ];
        for fen in fens.iter() {
            let mut board = Board::from_fen(fen, false).unwrap();
            let mut stack = AccumulatorStack::new(&net);
            stack.reset(&board, &net);
            let mut made = 0;
            for step in 0..120 {
                let moves = board.generate_moves();
                let undo = made > 0 && (moves.is_empty() || rng.gen_range(0..4) == 0);
                if undo {
                    board.undo_move();
                    stack.pop();
                    made -= 1;
                } else if !moves.is_empty() {
                    let mv = moves[rng.gen_range(0..moves.len())];
                    board.apply_move(mv);
                    stack.push(board.dirty_piece());
                    made += 1;
                } else {
                    break;
                }
                // Skip some evaluations so several frames are replayed at once.
                if step % 3 == 0 {
                    check_against_scratch(&mut stack, &board, &net);
                    assert_eq!(stack.evaluate(&board, &net), net.evaluate_board(&board));
                }
            }
        }
    }

    #[test]
    fn king_bucket_change_refreshes() {
        let net = Network::internal();
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", false).unwrap();
        let mut stack = AccumulatorStack::new(&net);
        stack.reset(&board, &net);
        // Castling short moves the king into another bucket.
        assert!(board.apply_uci_move("e1g1"));
        stack.push(board.dirty_piece());
        assert!(requires_refresh(board.dirty_piece(), Player::White));
        assert!(!requires_refresh(board.dirty_piece(), Player::Black));
        check_against_scratch(&mut stack, &board, &net);
        assert!(board.apply_uci_move("e8d8"));
        stack.push(board.dirty_piece());
        check_against_scratch(&mut stack, &board, &net);
        board.undo_move();
        stack.pop();
        board.undo_move();
        stack.pop();
        check_against_scratch(&mut stack, &board, &net);
    }

    #[test]
    fn null_moves_keep_the_accumulator() {
        let net = Network::internal();
        let mut board = Board::start_pos();
        let mut stack = AccumulatorStack::new(&net);
        stack.reset(&board, &net);
        let before = stack.evaluate(&board, &net);
        board.apply_null_move();
        stack.push(&DirtyPiece::default());
        assert_eq!(stack.evaluate(&board, &net), -before);
        check_against_scratch(&mut stack, &board, &net);
        board.undo_null_move();
        stack.pop();
        assert_eq!(stack.evaluate(&board, &net), before);
    }
}
