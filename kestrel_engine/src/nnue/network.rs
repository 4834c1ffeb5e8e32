//! Network parameters, loading and the output layer.
//!
//! # File format
//!
//! All values are little-endian, laid out back to back:
//!
//! 1. feature weights, `i16`, `INPUTS * HIDDEN`, one row of `HIDDEN` per input feature
//! 2. feature biases, `i16`, `HIDDEN`
//! 3. output weights, `i8`, `OUTPUT_BUCKETS * 2 * HIDDEN`, side to move's half first
//! 4. output biases, `i32`, `OUTPUT_BUCKETS`
//! 5. a trailing `u32` magic word naming the activation of the hidden layer

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use kestrel::core::score::{Value, EVAL_MAX};
use kestrel::{Board, Player};

use super::features::*;
use super::simd::{self, LANES};

pub const QA: i32 = 255;
pub const QB: i32 = 64;
pub const SCALE: i32 = 400;

pub const MAGIC_CRELU: u32 = 0x4B45_4E31;
pub const MAGIC_SCRELU: u32 = 0x4B45_4E32;

/// Name the `EvalFile` option uses for the built-in network.
pub const INTERNAL_NAME: &str = "<internal>";

const CHUNKS: usize = HIDDEN / LANES;

/// Activation applied to the hidden layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Clipped ReLU, `clamp(x, 0, QA)`.
    CReLU,
    /// Squared clipped ReLU, `clamp(x, 0, QA)^2`.
    SCReLU,
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("could not read network file: {0}")]
    Io(#[from] io::Error),
    #[error("network file has {found} bytes, expected {expected}")]
    SizeMismatch { expected: usize, found: usize },
    #[error("unknown network magic {0:#010x}")]
    BadMagic(u32),
}

/// The parameters of a network. Immutable once built and shared by every search thread.
pub struct Network {
    ft_weights: Vec<i16>,
    ft_biases: Vec<i16>,
    out_weights: Vec<i8>,
    out_biases: [i32; OUTPUT_BUCKETS],
    activation: Activation,
}

impl Network {
    /// Size in bytes of a serialized network.
    pub const fn file_size() -> usize {
        INPUTS * HIDDEN * 2 + HIDDEN * 2 + OUTPUT_BUCKETS * 2 * HIDDEN + OUTPUT_BUCKETS * 4 + 4
    }

    /// Reads a network from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Network, NetworkError> {
        let bytes = fs::read(path)?;
        Network::from_bytes(&bytes)
    }

    /// Parses a network from its serialized form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Network, NetworkError> {
        if bytes.len() != Network::file_size() {
            return Err(NetworkError::SizeMismatch {
                expected: Network::file_size(),
                found: bytes.len(),
            });
        }
        let (magic_bytes, _) = split_last_word(bytes);
        let magic = u32::from_le_bytes(magic_bytes);
        let activation = match magic {
            MAGIC_CRELU => Activation::CReLU,
            MAGIC_SCRELU => Activation::SCReLU,
            other => return Err(NetworkError::BadMagic(other)),
        };

        let (ft_w, rest) = bytes.split_at(INPUTS * HIDDEN * 2);
        let (ft_b, rest) = rest.split_at(HIDDEN * 2);
        let (out_w, rest) = rest.split_at(OUTPUT_BUCKETS * 2 * HIDDEN);
        let (out_b, _) = rest.split_at(OUTPUT_BUCKETS * 4);

        let mut out_biases = [0; OUTPUT_BUCKETS];
        for (b, chunk) in out_biases.iter_mut().zip(out_b.chunks_exact(4)) {
            *b = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        Ok(Network {
            ft_weights: read_i16s(ft_w),
            ft_biases: read_i16s(ft_b),
            out_weights: out_w.iter().map(|&b| b as i8).collect(),
            out_biases,
            activation,
        })
    }

    /// Serializes the network in the format read by `from_bytes`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Network::file_size());
        for w in self.ft_weights.iter().chain(self.ft_biases.iter()) {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        bytes.extend(self.out_weights.iter().map(|&w| w as u8));
        for b in self.out_biases.iter() {
            bytes.extend_from_slice(&b.to_le_bytes());
        }
        let magic = match self.activation {
            Activation::CReLU => MAGIC_CRELU,
            Activation::SCReLU => MAGIC_SCRELU,
        };
        bytes.extend_from_slice(&magic.to_le_bytes());
        bytes
    }

    /// The built-in network, used when no network file is configured.
    ///
    /// Each hidden neuron watches a single (piece, square) feature of its perspective, staying
    /// at exactly `0` or `QA`, so the clipped activation acts linearly. The output layer then
    /// holds a material plus piece-square table, split evenly between both perspectives.
    pub fn internal() -> Network {
        let mut ft_weights = vec![0i16; INPUTS * HIDDEN];
        for bucket in 0..KING_BUCKETS {
            for f in 0..FEATURES_PER_BUCKET {
                ft_weights[(bucket * FEATURES_PER_BUCKET + f) * HIDDEN + f] = QA as i16;
            }
        }

        let mut us = [0i8; HIDDEN];
        for (color, piece_type) in (0..2).flat_map(|c| (0..6).map(move |t| (c, t))) {
            for sq in 0..64 {
                let f = (color * 6 + piece_type) * 64 + sq;
                us[f] = if color == 0 {
                    half_weight(piece_type, sq)
                } else {
                    -half_weight(piece_type, sq ^ 56)
                };
            }
        }

        let mut out_weights = vec![0i8; OUTPUT_BUCKETS * 2 * HIDDEN];
        for bucket in out_weights.chunks_exact_mut(2 * HIDDEN) {
            let (own, other) = bucket.split_at_mut(HIDDEN);
            own.copy_from_slice(&us);
            for (o, u) in other.iter_mut().zip(us.iter()) {
                *o = -*u;
            }
        }

        Network {
            ft_weights,
            ft_biases: vec![0; HIDDEN],
            out_weights,
            out_biases: [0; OUTPUT_BUCKETS],
            activation: Activation::CReLU,
        }
    }

    #[inline(always)]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline(always)]
    pub fn biases(&self) -> &[i16] {
        &self.ft_biases
    }

    #[inline(always)]
    fn feature_weights(&self, idx: usize) -> &[i16] {
        &self.ft_weights[idx * HIDDEN..(idx + 1) * HIDDEN]
    }

    #[inline]
    pub fn add_feature(&self, acc: &mut [i16], idx: usize) {
        simd::add_assign(acc, self.feature_weights(idx));
    }

    #[inline]
    pub fn sub_feature(&self, acc: &mut [i16], idx: usize) {
        simd::sub_assign(acc, self.feature_weights(idx));
    }

    /// Writes `src` with the given features added and removed into `dst`, in one pass.
    pub fn update(&self, src: &[i16], dst: &mut [i16], adds: &[usize], subs: &[usize]) {
        for (c, (s, d)) in src
            .chunks_exact(LANES)
            .zip(dst.chunks_exact_mut(LANES))
            .enumerate()
        {
            let offset = c * LANES;
            let mut v = simd::load(s);
            for &a in adds {
                v = simd::add_i16(v, simd::load(&self.feature_weights(a)[offset..]));
            }
            for &r in subs {
                v = simd::sub_i16(v, simd::load(&self.feature_weights(r)[offset..]));
            }
            simd::store(d, v);
        }
    }

    /// Builds the hidden layer of one perspective from scratch.
    pub fn refresh(&self, board: &Board, perspective: Player, acc: &mut [i16]) {
        acc.copy_from_slice(&self.ft_biases);
        let key = KingKey::of(board, perspective);
        for sq in board.occupied() {
            let piece = board.piece_at_sq(sq);
            self.add_feature(acc, feature_index(perspective, key, piece, sq));
        }
    }

    /// Runs the output layer over both perspectives' hidden layers.
    pub fn evaluate(&self, us: &[i16], them: &[i16], bucket: usize) -> Value {
        let weights = &self.out_weights[bucket * 2 * HIDDEN..(bucket + 1) * 2 * HIDDEN];
        let bias = self.out_biases[bucket] as i64;
        let (w_us, w_them) = weights.split_at(HIDDEN);
        let qa = QA as i64;
        let qab = (QA * QB) as i64;

        let raw = match self.activation {
            Activation::CReLU => {
                let sum = activated_sum(us, w_us, |v, w| simd::dot(simd::crelu(v, QA as i16), w))
                    + activated_sum(them, w_them, |v, w| {
                        simd::dot(simd::crelu(v, QA as i16), w)
                    });
                (sum + bias) * SCALE as i64 / qab
            }
            Activation::SCReLU => {
                let sum = activated_sum(us, w_us, |v, w| simd::screlu_dot(v, w, QA as i16))
                    + activated_sum(them, w_them, |v, w| simd::screlu_dot(v, w, QA as i16));
                (sum / qa + bias) * SCALE as i64 / qab
            }
        };
        (raw as Value).clamp(-EVAL_MAX, EVAL_MAX)
    }

    /// Evaluates a board without any incremental state, from the side to move's view.
    pub fn evaluate_board(&self, board: &Board) -> Value {
        let mut us = vec![0; HIDDEN];
        let mut them = vec![0; HIDDEN];
        self.refresh(board, board.turn(), &mut us);
        self.refresh(board, !board.turn(), &mut them);
        self.evaluate(&us, &them, output_bucket(board))
    }
}

#[inline(always)]
fn activated_sum<F>(acc: &[i16], weights: &[i8], f: F) -> i64
where
    F: Fn(simd::VecI16, &[i8]) -> i32,
{
    debug_assert_eq!(acc.len(), CHUNKS * LANES);
    acc.chunks_exact(LANES)
        .zip(weights.chunks_exact(LANES))
        .map(|(a, w)| f(simd::load(a), w) as i64)
        .sum()
}

fn read_i16s(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect()
}

fn split_last_word(bytes: &[u8]) -> ([u8; 4], &[u8]) {
    let (head, tail) = bytes.split_at(bytes.len() - 4);
    ([tail[0], tail[1], tail[2], tail[3]], head)
}

const PIECE_CP: [i32; 6] = [100, 320, 330, 500, 900, 0];
const PAWN_RANK_CP: [i32; 8] = [0, 0, 5, 10, 20, 35, 60, 0];

/// Centipawn value of a piece type on a square, from its owner's side of the board.
fn piece_square_cp(piece_type: usize, sq: usize) -> i32 {
    let file = sq & 7;
    let rank = sq >> 3;
    let centrality = (file.min(7 - file) + rank.min(7 - rank)) as i32;
    let bonus = match piece_type {
        0 => PAWN_RANK_CP[rank] + if (3..=4).contains(&file) && rank >= 2 { 5 } else { 0 },
        1 => 5 * centrality - 15,
        2 => 3 * centrality - 5,
        3 => {
            if rank == 6 {
                15
            } else {
                0
            }
        }
        4 => 2 * centrality - 5,
        _ => 0,
    };
    PIECE_CP[piece_type] + bonus
}

/// Output weight holding half a piece-square value. One step of weight is worth
/// `SCALE / QB` centipawns once multiplied by a saturated neuron.
fn half_weight(piece_type: usize, sq: usize) -> i8 {
    let step = SCALE as f64 / QB as f64;
    (piece_square_cp(piece_type, sq) as f64 / 2.0 / step).round() as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_is_balanced() {
        let net = Network::internal();
        assert_eq!(net.evaluate_board(&Board::start_pos()), 0);
    }

    #[test]
    fn internal_network_counts_material() {
        let net = Network::internal();
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1", false).unwrap();
        let white = net.evaluate_board(&board);
        assert!(white > 800 && white < 1100, "{}", white);
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1", false).unwrap();
        assert_eq!(net.evaluate_board(&board), -white);
    }

    #[test]
    fn file_round_trip_and_errors() {
        let net = Network::internal();
        let bytes = net.to_bytes();
        assert_eq!(bytes.len(), Network::file_size());
        let back = Network::from_bytes(&bytes).unwrap();
        let board = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -", false).unwrap();
        assert_eq!(back.evaluate_board(&board), net.evaluate_board(&board));

        match Network::from_bytes(&bytes[1..]) {
            Err(NetworkError::SizeMismatch { expected, found }) => {
                assert_eq!(expected, Network::file_size());
                assert_eq!(found, Network::file_size() - 1);
            }
            _ => panic!("expected a size mismatch"),
        }

        let mut bad = bytes;
        let n = bad.len();
        bad[n - 4..].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        assert!(matches!(Network::from_bytes(&bad), Err(NetworkError::BadMagic(0xDEAD_BEEF))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            Network::load("/nonexistent/kestrel.nnue"),
            Err(NetworkError::Io(_))
        ));
    }

    #[test]
    fn screlu_output_is_finite() {
        let mut net = Network::internal();
        net.activation = Activation::SCReLU;
        let v = net.evaluate_board(&Board::start_pos());
        assert_eq!(v, 0);
    }
}
