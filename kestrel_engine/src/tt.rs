//! The Transposition Table, a type of hashmap where Zobrist Keys map to information about a
//! position.
//!
//! A Transposition Table is a structure to quickly lookup chess positions and determine
//! information from them. It maps from Board positions to information such as the evaluation of
//! that position, the best move found so far, the depth that move was found at, etc.
//!
//! The table is shared between every search thread without any locking. Each entry is stored as
//! two 64-bit words: the packed data, and the full key xor'd with that data. A reader only trusts
//! an entry when both words agree, so a torn write from a racing thread reads as a miss rather
//! than as a corrupt entry.

use std::collections::TryReserveError;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use rayon::prelude::*;
use thiserror::Error;

use kestrel::core::score::*;
use kestrel::BitMove;

/// Value used to retrieve and store Entries.
pub type Key = u64;

/// Number of Entries per Cluster.
pub const CLUSTER_SIZE: usize = 4;

const BYTES_PER_MB: usize = 1024 * 1024;

/// Depth stored for entries only carrying a static evaluation.
pub const DEPTH_UNSEARCHED: i32 = -2;
/// Depth stored by the quiescence search.
pub const DEPTH_QS: i32 = 0;
/// Stored depths are offset so that an occupied entry never packs to zero.
const DEPTH_ENTRY_OFFSET: i32 = -3;

const GENERATION_BITS: u8 = 3;
const GENERATION_DELTA: u8 = 1 << GENERATION_BITS;
const GENERATION_CYCLE: u16 = 255 + GENERATION_DELTA as u16;
const GENERATION_MASK: u16 = (0xFF << GENERATION_BITS) & 0xFF;

/// Designates the type of bound a stored score represents.
/// See the [ChessWiki](https://www.chessprogramming.org/Node_Types) for more information
/// about PV Node types and their use.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum NodeBound {
    NoBound = 0,
    LowerBound = 1,
    UpperBound = 2,
    Exact = 3,
}

impl NodeBound {
    #[inline(always)]
    fn from_bits(bits: u8) -> NodeBound {
        match bits & 0b11 {
            0 => NodeBound::NoBound,
            1 => NodeBound::LowerBound,
            2 => NodeBound::UpperBound,
            _ => NodeBound::Exact,
        }
    }

    /// Returns if this bound covers the other, e.g. `Exact` covers `LowerBound`.
    #[inline(always)]
    pub fn includes(self, other: NodeBound) -> bool {
        (self as u8) & (other as u8) != 0
    }
}

/// A copy of the information stored for a position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub best_move: BitMove,
    pub score: Value,
    pub eval: Value,
    pub depth: i32,
    pub bound: NodeBound,
    pub is_pv: bool,
}

impl TTEntry {
    #[inline(always)]
    fn unpack(data: u64) -> TTEntry {
        TTEntry {
            best_move: BitMove::new(data as u16),
            score: (data >> 16) as u16 as i16 as Value,
            eval: (data >> 32) as u16 as i16 as Value,
            depth: depth8(data) as i32 + DEPTH_ENTRY_OFFSET,
            bound: NodeBound::from_bits(gen_bound8(data)),
            is_pv: gen_bound8(data) & 0b100 != 0,
        }
    }
}

#[inline(always)]
fn depth8(data: u64) -> u8 {
    (data >> 48) as u8
}

#[inline(always)]
fn gen_bound8(data: u64) -> u8 {
    (data >> 56) as u8
}

#[inline(always)]
fn pack(mv: BitMove, score: Value, eval: Value, depth8: u8, gen_bound8: u8) -> u64 {
    debug_assert!(score.abs() <= i16::MAX as Value);
    debug_assert!(eval.abs() <= i16::MAX as Value);
    mv.get_raw() as u64
        | ((score as i16 as u16 as u64) << 16)
        | ((eval as i16 as u16 as u64) << 32)
        | ((depth8 as u64) << 48)
        | ((gen_bound8 as u64) << 56)
}

#[inline(always)]
fn relative_age(gen_bound8: u8, generation8: u8) -> u8 {
    ((GENERATION_CYCLE + generation8 as u16 - gen_bound8 as u16) & GENERATION_MASK) as u8
}

#[derive(Default)]
#[repr(C)]
struct Slot {
    key: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    #[inline(always)]
    fn load(&self) -> (Key, u64) {
        let data = self.data.load(Ordering::Relaxed);
        (self.key.load(Ordering::Relaxed) ^ data, data)
    }

    #[inline(always)]
    fn write(&self, key: Key, data: u64) {
        self.key.store(key ^ data, Ordering::Relaxed);
        self.data.store(data, Ordering::Relaxed);
    }
}

/// A cache-line sized group of entries sharing one index.
#[derive(Default)]
#[repr(C, align(64))]
struct Cluster {
    slots: [Slot; CLUSTER_SIZE],
}

impl Cluster {
    fn clear(&self) {
        for slot in self.slots.iter() {
            slot.key.store(0, Ordering::Relaxed);
            slot.data.store(0, Ordering::Relaxed);
        }
    }
}

/// Error returned when the table cannot be allocated.
#[derive(Debug, Error)]
#[error("unable to allocate a {megabytes} MB transposition table: {source}")]
pub struct TTAllocError {
    pub megabytes: usize,
    #[source]
    pub source: TryReserveError,
}

/// Structure for representing a `TranspositionTable`. A Transposition Table is a type
/// of HashTable that maps Zobrist Keys to information about that position, including the best
/// move found, the score, the static evaluation and the depth the move was found at.
pub struct TranspositionTable {
    clusters: Vec<Cluster>,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Creates a new `TranspositionTable` of approximately `mb` megabytes, halving the size
    /// until an allocation succeeds. Fails only if a 1 MB table cannot be allocated either.
    pub fn new(mb: usize) -> Result<Self, TTAllocError> {
        halving_alloc(mb, TranspositionTable::try_new)
    }

    /// Attempts to create a new `TranspositionTable` of at most `mb` megabytes. The number of
    /// clusters is rounded down to a power of two.
    pub fn try_new(mb: usize) -> Result<Self, TTAllocError> {
        let count = num_clusters(mb);
        let mut clusters: Vec<Cluster> = Vec::new();
        clusters
            .try_reserve_exact(count)
            .map_err(|source| TTAllocError { megabytes: mb, source })?;
        clusters.resize_with(count, Cluster::default);
        Ok(TranspositionTable {
            clusters,
            generation: AtomicU8::new(0),
        })
    }

    /// Returns the size of the table in megabytes.
    pub fn size_megabytes(&self) -> usize {
        (self.clusters.len() * std::mem::size_of::<Cluster>()) / BYTES_PER_MB
    }

    /// Returns the number of entries the table can hold.
    pub fn num_entries(&self) -> usize {
        self.clusters.len() * CLUSTER_SIZE
    }

    /// Zeroes every entry, in parallel.
    pub fn clear(&self) {
        self.clusters.par_iter().for_each(|c| c.clear());
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Advances the age of the table. Called once at the start of every search.
    #[inline]
    pub fn new_search(&self) {
        self.generation.fetch_add(GENERATION_DELTA, Ordering::Relaxed);
    }

    /// Returns the current age of the table.
    #[inline(always)]
    pub fn time_age(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn cluster(&self, key: Key) -> &Cluster {
        let index = ((key as u128 * self.clusters.len() as u128) >> 64) as usize;
        debug_assert!(index < self.clusters.len());
        unsafe { self.clusters.get_unchecked(index) }
    }

    /// Looks up a position. A hit returns a copy of the stored entry and refreshes its age.
    pub fn probe(&self, key: Key) -> Option<TTEntry> {
        let generation8 = self.time_age();
        for slot in self.cluster(key).slots.iter() {
            let (k, data) = slot.load();
            if data == 0 || k != key {
                continue;
            }
            let gb = gen_bound8(data);
            if gb & GENERATION_MASK as u8 != generation8 {
                let refreshed =
                    (data & !(0xFF << 56)) | (((generation8 | (gb & 0b111)) as u64) << 56);
                slot.write(key, refreshed);
            }
            return Some(TTEntry::unpack(data));
        }
        None
    }

    /// Stores information about a position.
    ///
    /// An entry for the same key is overwritten when the new information is exact, deeper or
    /// from a newer search. Otherwise the least valuable entry of the cluster is replaced, value
    /// being its depth minus eight times its age.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &self,
        key: Key,
        best_move: BitMove,
        score: Value,
        eval: Value,
        depth: i32,
        bound: NodeBound,
        is_pv: bool,
    ) {
        let generation8 = self.time_age();
        let cluster = self.cluster(key);

        let mut replace = &cluster.slots[0];
        let mut replace_value = i32::MAX;
        let mut same_key = false;
        for slot in cluster.slots.iter() {
            let (k, data) = slot.load();
            if data == 0 || k == key {
                replace = slot;
                same_key = data != 0;
                break;
            }
            let value = depth8(data) as i32 - relative_age(gen_bound8(data), generation8) as i32;
            if value < replace_value {
                replace = slot;
                replace_value = value;
            }
        }

        let new_depth8 = (depth - DEPTH_ENTRY_OFFSET).clamp(1, 255) as u8;
        let (_, old) = replace.load();

        let mv = if best_move.is_null() && same_key {
            BitMove::new(old as u16)
        } else {
            best_move
        };

        let overwrite = !same_key
            || bound == NodeBound::Exact
            || new_depth8 as i32 + 2 * is_pv as i32 > depth8(old) as i32 - 4
            || relative_age(gen_bound8(old), generation8) != 0;

        let data = if overwrite {
            let gb = generation8 | ((is_pv as u8) << 2) | bound as u8;
            pack(mv, score, eval, new_depth8, gb)
        } else {
            (old & !0xFFFF) | mv.get_raw() as u64
        };
        replace.write(key, data);
    }

    /// Hints the processor to load the cluster of a key into cache.
    #[inline(always)]
    pub fn prefetch(&self, key: Key) {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
            let ptr = self.cluster(key) as *const Cluster as *const i8;
            _mm_prefetch(ptr, _MM_HINT_T0);
        }
        #[cfg(not(target_arch = "x86_64"))]
        let _ = key;
    }

    /// Returns the permille of sampled entries written during the current search.
    pub fn hashfull(&self) -> u16 {
        let generation8 = self.time_age();
        let sample = self.clusters.len().min(1000 / CLUSTER_SIZE);
        let used = self.clusters[..sample]
            .iter()
            .flat_map(|c| c.slots.iter())
            .filter(|s| {
                let (_, data) = s.load();
                data != 0 && gen_bound8(data) & GENERATION_MASK as u8 == generation8
            })
            .count();
        (used * 1000 / (sample * CLUSTER_SIZE)) as u16
    }
}

/// Calls `alloc` with `mb`, then with half as many megabytes after each failure, down to one.
fn halving_alloc<T>(
    mb: usize,
    mut alloc: impl FnMut(usize) -> Result<T, TTAllocError>,
) -> Result<T, TTAllocError> {
    let mut size = mb.max(1);
    loop {
        match alloc(size) {
            Ok(t) => return Ok(t),
            Err(e) if size > 1 => {
                log::warn!("{}, retrying with {} MB", e, size / 2);
                size /= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

fn num_clusters(mb: usize) -> usize {
    let bytes = mb.max(1) * BYTES_PER_MB;
    let count = (bytes / std::mem::size_of::<Cluster>()).max(1);
    1 << (usize::BITS - 1 - count.leading_zeros())
}

/// Adjusts a mate score from "plies to mate from the root" to "plies to mate from the
/// current position" before it is stored.
#[inline]
pub fn value_to_tt(v: Value, ply: i32) -> Value {
    if v == NONE {
        v
    } else if v >= TB_WIN_IN_MAX_PLY {
        v + ply
    } else if v <= TB_LOSS_IN_MAX_PLY {
        v - ply
    } else {
        v
    }
}

/// Inverse of `value_to_tt`. A mate that cannot be delivered before the fifty-move rule
/// strikes is downgraded to a plain winning score, so it is never trusted as a mate.
#[inline]
pub fn value_from_tt(v: Value, ply: i32, rule_50: i32) -> Value {
    if v == NONE {
        return NONE;
    }
    if v >= TB_WIN_IN_MAX_PLY {
        if v >= MATE_IN_MAX_PLY && MATE - v > 100 - rule_50 {
            return TB_WIN_IN_MAX_PLY - 1;
        }
        if TB_WIN - v > 100 - rule_50 {
            return TB_WIN_IN_MAX_PLY - 1;
        }
        return v - ply;
    }
    if v <= TB_LOSS_IN_MAX_PLY {
        if v <= MATED_IN_MAX_PLY && MATE + v > 100 - rule_50 {
            return TB_LOSS_IN_MAX_PLY + 1;
        }
        if TB_WIN + v > 100 - rule_50 {
            return TB_LOSS_IN_MAX_PLY + 1;
        }
        return v + ply;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel::SQ;
    use std::sync::Arc;
    use std::thread;

    fn mv() -> BitMove {
        BitMove::make(SQ::E2, SQ::E4)
    }

    #[test]
    fn cluster_is_a_cache_line() {
        assert_eq!(std::mem::size_of::<Cluster>(), 64);
        assert_eq!(std::mem::align_of::<Cluster>(), 64);
    }

    #[test]
    fn sizes_are_powers_of_two() {
        for mb in [1, 3, 16, 100] {
            let tt = TranspositionTable::new(mb).unwrap();
            assert!(tt.clusters.len().is_power_of_two());
            assert!(tt.size_megabytes() <= mb);
        }
    }

    #[test]
    fn store_then_probe() {
        let tt = TranspositionTable::new(1).unwrap();
        let key: Key = 0x1234_5678_9ABC_DEF0;
        assert!(tt.probe(key).is_none());
        tt.store(key, mv(), 57, -12, 9, NodeBound::LowerBound, true);
        let entry = tt.probe(key).unwrap();
        assert_eq!(entry.best_move, mv());
        assert_eq!(entry.score, 57);
        assert_eq!(entry.eval, -12);
        assert_eq!(entry.depth, 9);
        assert_eq!(entry.bound, NodeBound::LowerBound);
        assert!(entry.is_pv);
        assert!(tt.probe(key ^ 1).is_none());
    }

    #[test]
    fn negative_depths_and_none_eval() {
        let tt = TranspositionTable::new(1).unwrap();
        tt.store(77, BitMove::null(), NONE, NONE, DEPTH_UNSEARCHED, NodeBound::NoBound, false);
        let entry = tt.probe(77).unwrap();
        assert_eq!(entry.depth, DEPTH_UNSEARCHED);
        assert_eq!(entry.score, NONE);
        assert_eq!(entry.eval, NONE);
        assert!(entry.best_move.is_null());
    }

    #[test]
    fn keeps_move_when_storing_null() {
        let tt = TranspositionTable::new(1).unwrap();
        tt.store(5, mv(), 10, 0, 4, NodeBound::Exact, false);
        tt.store(5, BitMove::null(), 20, 0, 6, NodeBound::UpperBound, false);
        let entry = tt.probe(5).unwrap();
        assert_eq!(entry.best_move, mv());
        assert_eq!(entry.score, 20);
        assert_eq!(entry.depth, 6);
    }

    #[test]
    fn shallow_store_does_not_clobber_deep_entry() {
        let tt = TranspositionTable::new(1).unwrap();
        tt.store(5, mv(), 10, 0, 20, NodeBound::LowerBound, false);
        tt.store(5, mv(), 99, 0, 2, NodeBound::UpperBound, false);
        let entry = tt.probe(5).unwrap();
        assert_eq!(entry.depth, 20);
        assert_eq!(entry.score, 10);
    }

    #[test]
    fn replaces_oldest_shallowest() {
        let tt = TranspositionTable::new(1).unwrap();
        // Keys mapping to cluster zero.
        let keys: Vec<Key> = (1..=5u64).collect();
        for (i, k) in keys.iter().take(4).enumerate() {
            tt.store(*k, mv(), 0, 0, 10 + i as i32, NodeBound::Exact, false);
        }
        tt.new_search();
        tt.store(keys[4], mv(), 0, 0, 1, NodeBound::Exact, false);
        assert!(tt.probe(keys[4]).is_some());
        // The shallowest old entry went first.
        assert!(tt.probe(keys[0]).is_none());
        assert!(tt.probe(keys[3]).is_some());
    }

    #[test]
    fn clear_and_hashfull() {
        let tt = TranspositionTable::new(1).unwrap();
        assert_eq!(tt.hashfull(), 0);
        for i in 0..200_000u64 {
            let key = i.wrapping_mul(0x9E37_79B9_7F4A_7C15);
            tt.store(key, mv(), 0, 0, 5, NodeBound::Exact, false);
        }
        assert!(tt.hashfull() > 900);
        tt.new_search();
        assert_eq!(tt.hashfull(), 0);
        tt.clear();
        assert_eq!(tt.hashfull(), 0);
        assert!(tt.probe(0x9E37_79B9_7F4A_7C15).is_none());
    }

    #[test]
    fn mate_scores_are_ply_relative() {
        let stored = value_to_tt(mate_in(7), 3);
        assert_eq!(stored, mate_in(4));
        assert_eq!(value_from_tt(stored, 3, 0), mate_in(7));
        assert_eq!(value_from_tt(value_to_tt(mated_in(6), 2), 2, 0), mated_in(6));
        assert_eq!(value_to_tt(150, 9), 150);
        assert_eq!(value_from_tt(NONE, 5, 0), NONE);
    }

    #[test]
    fn mates_beyond_rule_50_are_downgraded() {
        let stored = value_to_tt(mate_in(30), 0);
        assert_eq!(value_from_tt(stored, 0, 90), TB_WIN_IN_MAX_PLY - 1);
        let stored = value_to_tt(mated_in(30), 0);
        assert_eq!(value_from_tt(stored, 0, 90), TB_LOSS_IN_MAX_PLY + 1);
    }

    fn alloc_error(mb: usize) -> TTAllocError {
        let source = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        TTAllocError { megabytes: mb, source }
    }

    #[test]
    fn allocation_falls_back_to_smaller_tables() {
        let mut tried = Vec::new();
        let got = halving_alloc(64, |mb| {
            tried.push(mb);
            if mb > 8 {
                Err(alloc_error(mb))
            } else {
                Ok(mb)
            }
        });
        assert_eq!(got.unwrap(), 8);
        assert_eq!(tried, vec![64, 32, 16, 8]);

        let failed: Result<usize, TTAllocError> = halving_alloc(4, |mb| Err(alloc_error(mb)));
        assert_eq!(failed.unwrap_err().megabytes, 1);
        assert!(TranspositionTable::try_new(1 << 40).is_err());
    }

    #[test]
    fn concurrent_writers_never_corrupt() {
        let tt = Arc::new(TranspositionTable::new(1).unwrap());
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let tt = Arc::clone(&tt);
                thread::spawn(move || {
                    for i in 0..50_000u64 {
                        let key = (i % 512).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                        // Score and eval are derived from the key, so any torn entry shows up.
                        let check = (key >> 50) as Value;
                        tt.store(key, mv(), check, -check, (t as i32) + 1, NodeBound::Exact, false);
                        if let Some(entry) = tt.probe(key) {
                            assert_eq!(entry.score, check);
                            assert_eq!(entry.eval, -check);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
