//! Zobrist keys: one per (piece, square), one per en-passant file, one per castling-rights
//! combination and one for the side to move.

use super::prng::PRNG;
use crate::core::masks::*;

/// Seed for the Zobrist's pseudo-random number generator.
const ZOBRIST_SEED: u64 = 1_070_372;

pub struct Zobrist {
    pub psq: [[u64; SQ_CNT]; PIECE_CNT],
    pub enpassant: [u64; FILE_CNT],
    pub castle: [u64; ALL_CASTLING_RIGHTS],
    pub side: u64,
    pub no_pawns: u64,
}

lazy_static! {
    pub static ref ZOBRIST: Zobrist = Zobrist::generate();
}

impl Zobrist {
    #[cold]
    fn generate() -> Zobrist {
        let mut rng = PRNG::init(ZOBRIST_SEED);
        let mut z = Zobrist {
            psq: [[0; SQ_CNT]; PIECE_CNT],
            enpassant: [0; FILE_CNT],
            castle: [0; ALL_CASTLING_RIGHTS],
            side: 0,
            no_pawns: 0,
        };
        for piece in z.psq.iter_mut() {
            for key in piece.iter_mut() {
                *key = rng.rand();
            }
        }
        for key in z.enpassant.iter_mut() {
            *key = rng.rand();
        }
        // A combination of rights hashes as the XOR of its single rights.
        let singles: [u64; 4] = [rng.rand(), rng.rand(), rng.rand(), rng.rand()];
        for (cr, key) in z.castle.iter_mut().enumerate() {
            *key = (0..4)
                .filter(|bit| cr & (1 << bit) != 0)
                .fold(0, |acc, bit| acc ^ singles[bit]);
        }
        z.side = rng.rand();
        z.no_pawns = rng.rand();
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castle_keys_compose() {
        let z = &*ZOBRIST;
        assert_eq!(z.castle[0], 0);
        assert_eq!(z.castle[0b1111], z.castle[1] ^ z.castle[2] ^ z.castle[4] ^ z.castle[8]);
        assert_ne!(z.side, 0);
    }
}
