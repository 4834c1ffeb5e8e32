//! Efficiently updatable neural network evaluation.
//!
//! The network is a single hidden layer "HalfKA" network: every (piece, square) pair is an
//! input feature, seen from both players' perspectives, with the inputs bucketed by the
//! position of the perspective's own king. The hidden layer is kept up to date incrementally
//! along the search path by an [`AccumulatorStack`], and a small output layer selected by
//! the remaining material turns the two hidden vectors into a score.
//!
//! [`AccumulatorStack`]: accumulator/struct.AccumulatorStack.html

pub mod accumulator;
pub mod features;
pub mod network;
pub mod simd;

pub use self::accumulator::{Accumulator, AccumulatorStack};
pub use self::network::{Activation, Network, NetworkError};
