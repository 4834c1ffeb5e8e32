//! A UCI compatible chess engine built on top of the `kestrel` board library.
//!
//! The engine runs a Lazy-SMP alpha-beta search guided by an efficiently updatable neural
//! network evaluator. It is mostly useful as a direct executable, but the search can also be
//! driven from other crates through [`ThreadPool`] or [`KestrelEngine`].
//!
//! # Usage as a Dependency
//!
//! ```no_run
//! use kestrel_engine::engine::KestrelEngine;
//!
//! let mut engine = KestrelEngine::init(false).unwrap();
//! engine.execute("position startpos moves e2e4");
//! engine.execute("go depth 8");
//! engine.await_search();
//! let result = engine.last_result().unwrap();
//! println!("bestmove {}", result.best_move);
//! ```
//!
//! [`ThreadPool`]: threadpool/struct.ThreadPool.html
//! [`KestrelEngine`]: engine/struct.KestrelEngine.html

pub mod consts;
pub mod engine;
pub mod movepick;
pub mod nnue;
pub mod root_moves;
pub mod search;
pub mod sync;
pub mod tables;
pub mod threadpool;
pub mod time;
pub mod tt;
pub mod uci;

pub use crate::consts::*;
