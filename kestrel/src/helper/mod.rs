//! Statically initialized lookup tables.
//!
//! The tables are built lazily the first time any of them is accessed. Creating a `Board`
//! touches all of them, so move generation never pays the initialization cost mid-search.
//! [`init_statics`] forces initialization up front, which the engine does at startup.
//!
//! [`init_statics`]: prelude/fn.init_statics.html

mod boards;
mod magic;
pub mod prelude;
pub mod prng;
mod zobrist;
