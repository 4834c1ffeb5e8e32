//! Contains the ThreadPool and the signals shared by its threads.
//!
//! Every search thread owns a [`Searcher`] behind a mutex that only the thread itself locks
//! while searching. Between searches the pool locks the searchers to hand them the new root
//! position, then wakes the main thread, which in turn wakes the helpers.
//!
//! [`Searcher`]: ../search/struct.Searcher.html

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_utils::CachePadded;

use kestrel::{BitMove, Board, Player};

use crate::consts::*;
use crate::nnue::Network;
use crate::root_moves::RootMoveList;
use crate::search::params::SearchParams;
use crate::search::{SearchResult, Searcher};
use crate::sync::{GuardedBool, LockLatch};
use crate::time::{PreLimits, SearchLimiter};
use crate::tt::{TTAllocError, TranspositionTable};

#[inline]
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Signals and counters every search thread can see.
pub struct SearchShared {
    stop: AtomicBool,
    ponder: AtomicBool,
    stop_on_ponderhit: AtomicBool,
    use_stdout: AtomicBool,
    nodes: Vec<CachePadded<AtomicU64>>,
    result: Mutex<Option<SearchResult>>,
}

impl SearchShared {
    pub fn new(use_stdout: bool) -> Self {
        SearchShared {
            stop: AtomicBool::new(true),
            ponder: AtomicBool::new(false),
            stop_on_ponderhit: AtomicBool::new(false),
            use_stdout: AtomicBool::new(use_stdout),
            nodes: (0..MAX_THREADS)
                .map(|_| CachePadded::new(AtomicU64::new(0)))
                .collect(),
            result: Mutex::new(None),
        }
    }

    /// Prepares the signals for a new search.
    fn reset(&self, ponder: bool) {
        for n in self.nodes.iter() {
            n.store(0, Ordering::Relaxed);
        }
        *lock(&self.result) = None;
        self.ponder.store(ponder, Ordering::Release);
        self.stop_on_ponderhit.store(false, Ordering::Release);
        self.stop.store(false, Ordering::Release);
    }

    #[inline(always)]
    pub fn stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn set_stop(&self, stop: bool) {
        self.stop.store(stop, Ordering::Release);
    }

    #[inline(always)]
    pub fn pondering(&self) -> bool {
        self.ponder.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn stop_on_ponderhit(&self) -> bool {
        self.stop_on_ponderhit.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn set_stop_on_ponderhit(&self, value: bool) {
        self.stop_on_ponderhit.store(value, Ordering::Release);
    }

    /// The opponent played the expected move: the search continues as a normal one, or
    /// stops if it already decided to.
    pub fn ponderhit(&self) {
        self.ponder.store(false, Ordering::Release);
        if self.stop_on_ponderhit() {
            self.set_stop(true);
        }
    }

    /// Stops the search, pondering or not.
    pub fn abort(&self) {
        self.ponder.store(false, Ordering::Release);
        self.set_stop(true);
    }

    #[inline(always)]
    pub fn use_stdout(&self) -> bool {
        self.use_stdout.load(Ordering::Relaxed)
    }

    /// Sets the use of standard out. This can be changed mid search as well.
    pub fn set_use_stdout(&self, use_stdout: bool) {
        self.use_stdout.store(use_stdout, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn set_nodes(&self, id: usize, nodes: u64) {
        self.nodes[id].store(nodes, Ordering::Relaxed);
    }

    /// Returns total number of nodes searched so far.
    pub fn total_nodes(&self) -> u64 {
        self.nodes.iter().map(|n| n.load(Ordering::Relaxed)).sum()
    }

    pub(crate) fn store_result(&self, result: SearchResult) {
        *lock(&self.result) = Some(result);
    }

    pub fn result(&self) -> Option<SearchResult> {
        lock(&self.result).clone()
    }
}

/// What the main searcher needs to drive a helper thread.
pub(crate) struct HelperHandle {
    pub(crate) searcher: Arc<Mutex<Searcher>>,
    pub(crate) searching: Arc<GuardedBool>,
    latch: Arc<LockLatch>,
}

impl HelperHandle {
    pub(crate) fn start(&self) {
        self.searching.set(true);
        self.latch.set();
    }
}

struct Worker {
    searcher: Arc<Mutex<Searcher>>,
    latch: Arc<LockLatch>,
    searching: Arc<GuardedBool>,
    kill: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns the thread of a searcher. Without a stack size the platform default is used.
    fn spawn(id: usize, searcher: Searcher, stack_size: Option<usize>) -> io::Result<Worker> {
        let searcher = Arc::new(Mutex::new(searcher));
        let latch = Arc::new(LockLatch::new());
        let searching = Arc::new(GuardedBool::new(false));
        let kill = Arc::new(AtomicBool::new(false));

        let (s, l, g, k) = (
            Arc::clone(&searcher),
            Arc::clone(&latch),
            Arc::clone(&searching),
            Arc::clone(&kill),
        );
        let mut builder = thread::Builder::new().name(format!("search-{}", id));
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }
        let handle = builder.spawn(move || idle_loop(s, l, g, k))?;

        Ok(Worker {
            searcher,
            latch,
            searching,
            kill,
            handle: Some(handle),
        })
    }

    fn helper_handle(&self) -> HelperHandle {
        HelperHandle {
            searcher: Arc::clone(&self.searcher),
            searching: Arc::clone(&self.searching),
            latch: Arc::clone(&self.latch),
        }
    }

    fn start(&self) {
        self.searching.set(true);
        self.latch.set();
    }
}

fn idle_loop(
    searcher: Arc<Mutex<Searcher>>,
    latch: Arc<LockLatch>,
    searching: Arc<GuardedBool>,
    kill: Arc<AtomicBool>,
) {
    loop {
        latch.wait();
        latch.lock();
        if kill.load(Ordering::Acquire) {
            searching.set(false);
            return;
        }
        lock(&searcher).go();
        searching.set(false);
    }
}

/// The thread-pool for the chess engine.
///
/// Owns the search threads and the state they share. The pool is non-blocking: starting a
/// search returns right away, and only [`wait_for_finish`] awaits its result.
///
/// [`wait_for_finish`]: #method.wait_for_finish
pub struct ThreadPool {
    workers: Vec<Worker>,
    shared: Arc<SearchShared>,
    tt: Arc<TranspositionTable>,
    net: Arc<Network>,
    params: SearchParams,
}

impl ThreadPool {
    /// Creates a pool with `threads` search threads and a table of `tt_mb` megabytes. Fails
    /// if no transposition table at all can be allocated.
    pub fn new(
        threads: usize,
        tt_mb: usize,
        net: Arc<Network>,
        use_stdout: bool,
    ) -> Result<Self, TTAllocError> {
        let mut pool = ThreadPool {
            workers: Vec::new(),
            shared: Arc::new(SearchShared::new(use_stdout)),
            tt: Arc::new(TranspositionTable::new(tt_mb)?),
            net,
            params: SearchParams::default(),
        };
        pool.set_thread_count(threads);
        Ok(pool)
    }

    /// Returns the number of threads
    #[inline]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn shared(&self) -> &Arc<SearchShared> {
        &self.shared
    }

    pub fn tt(&self) -> &Arc<TranspositionTable> {
        &self.tt
    }

    pub fn network(&self) -> &Arc<Network> {
        &self.net
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Sets the thread count of the pool. The main thread always exists; helpers that fail to
    /// spawn are skipped.
    pub fn set_thread_count(&mut self, num: usize) {
        let num = num.clamp(1, MAX_THREADS);
        self.wait_for_finish();
        self.kill_all();

        for id in 0..num {
            let searcher = self.new_searcher(id);
            match Worker::spawn(id, searcher, Some(SEARCH_THREAD_STACK)) {
                Ok(w) => self.workers.push(w),
                Err(e) => {
                    log::warn!("failed to spawn search thread {}: {}", id, e);
                    break;
                }
            }
        }
        if self.workers.is_empty() {
            // Retry the main thread with the platform's default stack.
            let searcher = self.new_searcher(0);
            match Worker::spawn(0, searcher, None) {
                Ok(w) => self.workers.push(w),
                Err(e) => log::error!("failed to spawn the main search thread: {}", e),
            }
        }

        let helpers: Vec<HelperHandle> = self.workers.iter().skip(1).map(Worker::helper_handle).collect();
        if let Some(main) = self.workers.first() {
            lock(&main.searcher).helpers = helpers;
        }
        log::debug!("thread pool running {} threads", self.workers.len());
    }

    fn new_searcher(&self, id: usize) -> Searcher {
        let mut s = Searcher::new(
            id,
            Arc::clone(&self.shared),
            Arc::clone(&self.tt),
            Arc::clone(&self.net),
        );
        s.set_params(self.params);
        s
    }

    /// Kills and joins all the threads. Blocks until the current search finishes.
    fn kill_all(&mut self) {
        self.shared.set_stop(true);
        self.wait_for_finish();
        if let Some(main) = self.workers.first() {
            lock(&main.searcher).helpers.clear();
        }
        for w in self.workers.iter() {
            w.kill.store(true, Ordering::Release);
            w.latch.set();
        }
        for mut w in self.workers.drain(..) {
            if let Some(handle) = w.handle.take() {
                if handle.join().is_err() {
                    log::error!("a search thread panicked");
                }
            }
        }
    }

    /// Replaces the transposition table with one of `mb` megabytes. On failure the current
    /// table is kept.
    pub fn resize_tt(&mut self, mb: usize) -> Result<(), TTAllocError> {
        self.wait_for_finish();
        self.tt = Arc::new(TranspositionTable::new(mb)?);
        for w in self.workers.iter() {
            lock(&w.searcher).set_tt(Arc::clone(&self.tt));
        }
        log::info!("hash resized to {} MB", self.tt.size_megabytes());
        Ok(())
    }

    pub fn clear_tt(&self) {
        self.wait_for_finish();
        self.tt.clear();
    }

    /// Clears the table and every thread's histories.
    pub fn clear_all(&self) {
        self.clear_tt();
        for w in self.workers.iter() {
            lock(&w.searcher).clear();
        }
    }

    pub fn set_network(&mut self, net: Arc<Network>) {
        self.wait_for_finish();
        self.net = net;
        for w in self.workers.iter() {
            lock(&w.searcher).set_network(Arc::clone(&self.net));
        }
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.wait_for_finish();
        self.params = params;
        for w in self.workers.iter() {
            lock(&w.searcher).set_params(params);
        }
    }

    /// Starts a search. Output goes to stdout if the pool was created to use it; the result
    /// is also kept and returned by [`last_result`].
    ///
    /// [`last_result`]: #method.last_result
    pub fn start_thinking(
        &mut self,
        board: &Board,
        limits: &PreLimits,
        multi_pv: usize,
        move_overhead: i64,
    ) {
        self.wait_for_finish();
        let main = match self.workers.first() {
            Some(main) => main,
            None => {
                log::error!("no search thread available");
                return;
            }
        };

        let search_moves: Vec<BitMove> = limits
            .search_moves
            .iter()
            .filter_map(|m| board.parse_uci_move(m))
            .collect();
        let root_moves = RootMoveList::from_board(board, &search_moves);
        let limiter = SearchLimiter::new(limits, board.turn(), board.moves_played(), move_overhead);

        self.shared.reset(limits.ponder);
        self.tt.new_search();

        for w in self.workers.iter() {
            let mut s = lock(&w.searcher);
            s.board = board.clone();
            s.root_moves = root_moves.clone();
            s.limits = limiter.clone();
            s.multi_pv = multi_pv.max(1);
            s.depth_completed = 0;
        }

        log::debug!(
            "search started: {} root moves, {} threads",
            root_moves.len(),
            self.workers.len()
        );
        main.start();
    }

    /// Signals the search to stop as soon as possible.
    pub fn stop(&self) {
        self.shared.abort();
    }

    pub fn ponderhit(&self) {
        self.shared.ponderhit();
    }

    /// Returns if a search is running.
    pub fn is_searching(&self) -> bool {
        self.workers.first().map_or(false, |w| w.searching.get())
    }

    /// Waits for the current search to finish. The main thread only finishes once every
    /// helper has.
    pub fn wait_for_finish(&self) {
        if let Some(main) = self.workers.first() {
            main.searching.wait(false);
        }
    }

    /// The result of the last finished search.
    pub fn last_result(&self) -> Option<SearchResult> {
        self.shared.result()
    }

    /// Performs a search with a single principal variation, and blocks waiting for its
    /// result.
    pub fn search(&mut self, board: &Board, limits: &PreLimits) -> Option<SearchResult> {
        self.start_thinking(board, limits, 1, DEFAULT_MOVE_OVERHEAD);
        self.wait_for_finish();
        self.last_result()
    }

    /// Static evaluation of a position from white's point of view.
    pub fn static_eval(&self, board: &Board) -> i32 {
        self.wait_for_finish();
        match self.workers.first() {
            Some(main) => {
                let mut s = lock(&main.searcher);
                s.board = board.clone();
                s.static_eval()
            }
            None => {
                let v = self.net.evaluate_board(board);
                if board.turn() == Player::White {
                    v
                } else {
                    -v
                }
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.kill_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(threads: usize) -> ThreadPool {
        ThreadPool::new(threads, 1, Arc::new(Network::internal()), false).unwrap()
    }

    #[test]
    fn resize_threads() {
        let mut p = pool(1);
        assert_eq!(p.size(), 1);
        p.set_thread_count(3);
        assert_eq!(p.size(), 3);
        p.set_thread_count(0);
        assert_eq!(p.size(), 1);
    }

    #[test]
    fn resize_hash_between_searches() {
        let mut p = pool(1);
        p.resize_tt(2).unwrap();
        assert_eq!(p.tt().size_megabytes(), 2);
        let board = Board::start_pos();
        let result = p.search(&board, &PreLimits::depth(3)).unwrap();
        assert!(board.generate_moves().contains(result.best_move));
    }

    #[test]
    fn fixed_depth_search() {
        let mut p = pool(2);
        let board = Board::start_pos();
        let result = p.search(&board, &PreLimits::depth(4)).unwrap();
        assert!(board.generate_moves().contains(result.best_move));
        assert!(result.depth >= 4);
        assert!(result.nodes > 0);
        assert!(!p.is_searching());
    }

    #[test]
    fn stop_infinite_search() {
        let mut p = pool(2);
        let board = Board::start_pos();
        let limits = PreLimits {
            infinite: true,
            ..PreLimits::default()
        };
        p.start_thinking(&board, &limits, 1, 0);
        thread::sleep(std::time::Duration::from_millis(50));
        assert!(p.is_searching());
        p.stop();
        p.wait_for_finish();
        let result = p.last_result().unwrap();
        assert!(board.generate_moves().contains(result.best_move));
    }

    #[test]
    fn search_moves_restrict_root() {
        let mut p = pool(1);
        let board = Board::start_pos();
        let limits = PreLimits {
            depth: Some(3),
            search_moves: vec!["a2a3".to_string()],
            ..PreLimits::default()
        };
        let result = p.search(&board, &limits).unwrap();
        assert_eq!(result.best_move.stringify(false), "a2a3");
    }
}
