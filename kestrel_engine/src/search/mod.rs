//! The main searching function.
//!
//! Each search thread owns a [`Searcher`]: its own board, accumulator stack, history tables
//! and search stack. The only state shared with other threads is the transposition table,
//! the network and the [`SearchShared`] signals.
//!
//! [`Searcher`]: struct.Searcher.html
//! [`SearchShared`]: ../threadpool/struct.SearchShared.html

pub mod params;

use std::fmt;
use std::sync::{Arc, PoisonError};
use std::thread;
use std::time::Duration;

use kestrel::core::score::{
    is_decisive, mate_in, mated_in, Value, DRAW, INFINITE, MATE, MATED_IN_MAX_PLY,
    MATE_IN_MAX_PLY, NEG_INFINITE, NONE, PAWN, PIECE_VALUES, TB_LOSS_IN_MAX_PLY,
    TB_WIN_IN_MAX_PLY, ZERO,
};
use kestrel::{BitMove, Board, Piece, Player, SQ};

use crate::consts::*;
use crate::movepick::MovePicker;
use crate::nnue::{AccumulatorStack, Network};
use crate::root_moves::{RootMove, RootMoveList};
use crate::tables::correction::CORRECTION_MAX_BONUS;
use crate::tables::prelude::*;
use crate::threadpool::{HelperHandle, SearchShared};
use crate::time::{SearchLimiter, SoftStopFactors};
use crate::tt::*;

use self::params::{LmrTable, SearchParams};

const THREAD_DIST: usize = 20;

//                                      1  2  3  4  5  6  7  8  9 10 11 12 13 14 15 16 17 18 19 20
static SKIP_SIZE: [i32; THREAD_DIST] = [1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4, 4, 4, 4];
static START_PLY: [i32; THREAD_DIST] = [0, 1, 0, 1, 2, 3, 0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 6, 7];

/// Nodes searched between two looks at the clock.
const TIME_CHECK_INTERVAL: i32 = 2048;

/// Converts static exchange units into evaluation units.
#[inline(always)]
fn see_value_cp(captured: Piece) -> Value {
    PIECE_VALUES[captured.type_of() as usize] * 100 / PAWN
}

/// Per-ply information of the current line.
#[derive(Copy, Clone)]
pub struct Stack {
    current_move: BitMove,
    excluded_move: BitMove,
    killers: [BitMove; 2],
    /// Continuation history key of `current_move`.
    cont: ContKey,
    static_eval: Value,
    stat_score: i32,
    move_count: usize,
    in_check: bool,
    tt_pv: bool,
    double_extensions: i32,
    cutoff_cnt: i32,
}

impl Default for Stack {
    fn default() -> Self {
        Stack {
            current_move: BitMove::null(),
            excluded_move: BitMove::null(),
            killers: [BitMove::null(); 2],
            cont: ContKey::NONE,
            static_eval: NONE,
            stat_score: 0,
            move_count: 0,
            in_check: false,
            tt_pv: false,
            double_extensions: 0,
            cutoff_cnt: 0,
        }
    }
}

/// Triangular table of principal variations, one line per ply.
struct PvTable {
    moves: Vec<[BitMove; MAX_PLY + 1]>,
    len: Vec<usize>,
}

impl PvTable {
    fn new() -> Self {
        PvTable {
            moves: vec![[BitMove::null(); MAX_PLY + 1]; MAX_PLY + 2],
            len: vec![0; MAX_PLY + 2],
        }
    }

    #[inline]
    fn clear(&mut self, ply: usize) {
        self.len[ply] = 0;
    }

    /// The line at `ply` becomes `mv` followed by the line of the child.
    fn update(&mut self, ply: usize, mv: BitMove) {
        let child_len = self.len[ply + 1].min(MAX_PLY);
        let (head, tail) = self.moves.split_at_mut(ply + 1);
        head[ply][0] = mv;
        head[ply][1..=child_len].copy_from_slice(&tail[0][..child_len]);
        self.len[ply] = child_len + 1;
    }

    #[inline]
    fn line(&self, ply: usize) -> &[BitMove] {
        &self.moves[ply][..self.len[ply]]
    }
}

/// The outcome of a finished search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Null when the root has no legal move.
    pub best_move: BitMove,
    pub ponder_move: BitMove,
    pub score: Value,
    pub depth: i32,
    pub nodes: u64,
    pub pv: Vec<BitMove>,
}

/// Formats a score the way the `info` command expects it.
pub fn score_to_uci(v: Value) -> String {
    if v >= MATE_IN_MAX_PLY {
        format!("mate {}", (MATE - v + 1) / 2)
    } else if v <= MATED_IN_MAX_PLY {
        format!("mate {}", -(MATE + v) / 2)
    } else {
        format!("cp {}", to_centipawns(v))
    }
}

fn pv_string(pv: &[BitMove], chess960: bool) -> String {
    pv.iter()
        .map(|m| m.stringify(chess960))
        .collect::<Vec<String>>()
        .join(" ")
}

/// One `info` line of search progress.
pub struct InfoLine<'a> {
    pub depth: i32,
    pub sel_depth: i32,
    pub multi_pv: usize,
    pub score: Value,
    pub lowerbound: bool,
    pub upperbound: bool,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub hashfull: u16,
    pub pv: &'a [BitMove],
    pub chess960: bool,
}

impl<'a> fmt::Display for InfoLine<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let nps = self.nodes * 1000 / (self.elapsed_ms + 1);
        let bound = if self.lowerbound {
            " lowerbound"
        } else if self.upperbound {
            " upperbound"
        } else {
            ""
        };
        write!(
            f,
            "info depth {} seldepth {} multipv {} score {}{} nodes {} nps {} hashfull {} time {} pv {}",
            self.depth,
            self.sel_depth,
            self.multi_pv,
            score_to_uci(self.score),
            bound,
            self.nodes,
            nps,
            self.hashfull,
            self.elapsed_ms,
            pv_string(self.pv, self.chess960)
        )
    }
}

pub struct Searcher {
    pub id: usize,
    shared: Arc<SearchShared>,
    tt: Arc<TranspositionTable>,
    net: Arc<Network>,
    pub(crate) helpers: Vec<HelperHandle>,

    // search data
    pub board: Board,
    pub params: SearchParams,
    pub limits: SearchLimiter,
    pub root_moves: RootMoveList,
    pub multi_pv: usize,
    pub depth_completed: i32,
    lmr: LmrTable,
    acc: AccumulatorStack,
    hist: Histories,
    stack: Vec<Stack>,
    pv: PvTable,
    nodes: u64,
    sel_depth: i32,
    root_depth: i32,
    pv_idx: usize,
    pv_last: usize,
    nmp_min_ply: usize,
    root_drawn: bool,
    calls_cnt: i32,

    // MainThread Information
    previous_score: Value,
    iter_values: [Value; 4],
    best_move_changes: f64,
    previous_time_reduction: f64,
}

impl Searcher {
    /// Creates a new `Searcher` with the given ID. ID zero is the main thread.
    pub fn new(
        id: usize,
        shared: Arc<SearchShared>,
        tt: Arc<TranspositionTable>,
        net: Arc<Network>,
    ) -> Self {
        let params = SearchParams::default();
        let acc = AccumulatorStack::new(&net);
        Searcher {
            id,
            shared,
            tt,
            net,
            helpers: Vec::new(),
            board: Board::start_pos(),
            lmr: LmrTable::new(&params),
            params,
            limits: SearchLimiter::infinite(),
            root_moves: RootMoveList::new(),
            multi_pv: 1,
            depth_completed: 0,
            acc,
            hist: Histories::new(),
            stack: vec![Stack::default(); THREAD_STACK_SIZE],
            pv: PvTable::new(),
            nodes: 0,
            sel_depth: 0,
            root_depth: 0,
            pv_idx: 0,
            pv_last: 0,
            nmp_min_ply: 0,
            root_drawn: false,
            calls_cnt: TIME_CHECK_INTERVAL,
            previous_score: INFINITE,
            iter_values: [0; 4],
            best_move_changes: 0.0,
            previous_time_reduction: 1.0,
        }
    }

    /// Resets the histories, as done for a new game.
    pub fn clear(&mut self) {
        self.hist.clear();
        self.previous_time_reduction = 1.0;
        self.previous_score = INFINITE;
    }

    pub fn set_tt(&mut self, tt: Arc<TranspositionTable>) {
        self.tt = tt;
    }

    pub fn set_network(&mut self, net: Arc<Network>) {
        self.net = net;
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
        self.lmr = LmrTable::new(&params);
    }

    #[inline(always)]
    pub fn main_thread(&self) -> bool {
        self.id == 0
    }

    #[inline(always)]
    fn stop(&self) -> bool {
        self.shared.stop()
    }

    #[inline(always)]
    fn use_stdout(&self) -> bool {
        self.shared.use_stdout() && self.main_thread()
    }

    /// Starts the searching. Assumes the Board, root moves and limits are set.
    pub fn go(&mut self) {
        if self.main_thread() {
            self.main_thread_go();
        } else {
            self.iterative_deepening();
        }
    }

    /// Main thread searching function.
    fn main_thread_go(&mut self) {
        if self.root_moves.is_empty() {
            if self.use_stdout() {
                let score = if self.board.in_check() { "mate 0" } else { "cp 0" };
                println!("info depth 0 score {}", score);
            }
        } else {
            // Start each of the helper threads
            for h in self.helpers.iter() {
                h.start();
            }
            self.iterative_deepening();
        }

        // A pondering or infinite search may only finish once told so.
        while !self.stop() && (self.shared.pondering() || self.limits.infinite) {
            thread::sleep(Duration::from_millis(1));
        }

        // Tell the threads to stop, then wait for all the helpers to finish searching.
        self.shared.set_stop(true);
        for h in self.helpers.iter() {
            h.searching.wait(false);
        }

        let result = if self.root_moves.is_empty() {
            SearchResult {
                best_move: BitMove::null(),
                ponder_move: BitMove::null(),
                score: if self.board.in_check() { mated_in(0) } else { DRAW },
                depth: 0,
                nodes: self.shared.total_nodes(),
                pv: Vec::new(),
            }
        } else {
            let (best, depth, from_helper) = self.best_thread_move();
            if from_helper && self.use_stdout() {
                self.print_line(depth, 1, &best, false);
            }
            self.previous_score = best.score;
            let ponder_move = self.ponder_move(&best);
            SearchResult {
                best_move: best.bit_move(),
                ponder_move,
                score: if self.root_drawn { DRAW } else { best.score },
                depth,
                nodes: self.shared.total_nodes(),
                pv: best.pv,
            }
        };

        log::debug!(
            "search finished: bestmove {} score {} depth {} nodes {}",
            result.best_move,
            result.score,
            result.depth,
            result.nodes
        );

        if self.shared.use_stdout() {
            let chess960 = self.board.is_chess960();
            if result.best_move.is_null() {
                println!("bestmove 0000");
            } else if result.ponder_move.is_null() {
                println!("bestmove {}", result.best_move.stringify(chess960));
            } else {
                println!(
                    "bestmove {} ponder {}",
                    result.best_move.stringify(chess960),
                    result.ponder_move.stringify(chess960)
                );
            }
        }
        self.shared.store_result(result);
    }

    /// Votes between the threads for the move to play. Every thread votes for its best move,
    /// weighted by its score and completed depth. Returns the winning root move, the depth it
    /// was searched to, and whether it came from a helper.
    fn best_thread_move(&self) -> (RootMove, i32, bool) {
        let mut candidates: Vec<(RootMove, i32)> =
            vec![(self.root_moves[0].clone(), self.depth_completed)];

        let voting = self.multi_pv == 1 && self.limits.depth.is_none() && !self.helpers.is_empty();
        if voting {
            for h in self.helpers.iter() {
                let th = h.searcher.lock().unwrap_or_else(PoisonError::into_inner);
                if th.depth_completed > 0 && !th.root_moves.is_empty() {
                    candidates.push((th.root_moves[0].clone(), th.depth_completed));
                }
            }
        }

        let min_score = candidates.iter().map(|c| c.0.score).min().unwrap_or(0);
        let votes = |mv: BitMove| -> i64 {
            candidates
                .iter()
                .filter(|c| c.0.bit_move() == mv)
                .map(|c| (c.0.score - min_score + 14) as i64 * c.1 as i64)
                .sum()
        };

        let mut best = 0;
        for i in 1..candidates.len() {
            let (ref b, _) = candidates[best];
            let (ref c, _) = candidates[i];
            if b.score >= TB_WIN_IN_MAX_PLY {
                // Make sure we pick the shortest mate
                if c.score > b.score {
                    best = i;
                }
            } else if c.score >= TB_WIN_IN_MAX_PLY || votes(c.bit_move()) > votes(b.bit_move()) {
                best = i;
            }
        }
        let (rm, depth) = candidates.swap_remove(best);
        (rm, depth, best != 0)
    }

    /// The expected reply to the best move, from its PV or else from the table.
    fn ponder_move(&mut self, best: &RootMove) -> BitMove {
        if best.pv.len() > 1 {
            return best.pv[1];
        }
        let mv = best.bit_move();
        self.board.apply_move(mv);
        let board = &self.board;
        let ponder = self
            .tt
            .probe(board.zobrist())
            .map(|e| e.best_move)
            .filter(|m| !m.is_null() && board.pseudo_legal_move(*m) && board.legal_move(*m));
        self.board.undo_move();
        ponder.unwrap_or_else(BitMove::null)
    }

    /// Iterative deepening: searches the root to increasing depths until a limit is hit.
    pub fn iterative_deepening(&mut self) {
        let main = self.main_thread();

        for frame in self.stack.iter_mut() {
            *frame = Stack::default();
        }
        self.acc.reset(&self.board, &self.net);
        self.nodes = 0;
        self.sel_depth = 0;
        self.depth_completed = 0;
        self.nmp_min_ply = 0;
        self.calls_cnt = TIME_CHECK_INTERVAL;
        self.best_move_changes = 0.0;
        self.root_drawn = self.board.is_draw(0);

        let multi_pv = self.multi_pv.max(1).min(self.root_moves.len());
        let max_depth = if main {
            self.limits
                .depth
                .map_or(MAX_PLY as i32 - 1, |d| d.clamp(1, MAX_PLY as i32 - 1))
        } else {
            MAX_PLY as i32 - 1
        };

        if self.previous_score == INFINITE {
            self.iter_values = [0; 4];
        } else {
            self.iter_values = [self.previous_score; 4];
        }
        let mut iter_idx = 0;
        let mut time_reduction: f64 = 1.0;
        let mut last_best_move = BitMove::null();
        let mut last_best_move_depth = 0;

        // The depth to start searching at based on the thread ID.
        let start_ply = START_PLY[self.id % THREAD_DIST];
        // The number of plies to skip each iteration.
        let skip_size = SKIP_SIZE[self.id % THREAD_DIST];
        let mut root_depth = start_ply + 1;

        // Iterative deeping. Start at the base ply (determined by thread_id), and then increment
        // by the skip size after searching that depth. If searching for depth, non-main threads
        // will ignore the max_depth and instead wait for a stop signal.
        'iterative_deepening: while !self.stop() && root_depth <= max_depth {
            self.root_depth = root_depth;
            if main {
                self.best_move_changes *= 0.5;
            }

            // rollback all the root moves, ala set the previous score to the current score.
            self.root_moves.rollback();
            self.pv_last = self.root_moves.len();

            for pv_idx in 0..multi_pv {
                self.pv_idx = pv_idx;
                self.sel_depth = 0;

                // Aspiration windows, centered on the running average of the move.
                let avg = self.root_moves[pv_idx].average_score;
                let mut delta = self.params.aspiration_delta
                    + (self.id % 8) as i32 * self.params.aspiration_thread_perturb
                    + avg.abs() / 10_000;
                let (mut alpha, mut beta) = if root_depth >= 4 && avg != NEG_INFINITE {
                    ((avg - delta).max(NEG_INFINITE), (avg + delta).min(INFINITE))
                } else {
                    (NEG_INFINITE, INFINITE)
                };
                let mut failed_high_cnt = 0;

                // Loop until we find a value that is within the bounds of alpha and beta.
                'aspiration_window: loop {
                    let adjusted_depth = (root_depth - failed_high_cnt).max(1);
                    let best_value = self.search::<Root>(alpha, beta, adjusted_depth, 0, false);

                    // Order root moves by the score retrieved post search. Moves not
                    // searched to completion keep their place.
                    self.root_moves.sort_range(pv_idx, self.pv_last);

                    if self.stop() {
                        break 'aspiration_window;
                    }

                    if main
                        && multi_pv == 1
                        && (best_value <= alpha || best_value >= beta)
                        && self.limits.elapsed() > 3000
                        && self.use_stdout()
                    {
                        self.print_info(root_depth);
                    }

                    if best_value <= alpha {
                        beta = (alpha + beta) / 2;
                        alpha = (best_value - delta).max(NEG_INFINITE);
                        failed_high_cnt = 0;
                        if main {
                            self.shared.set_stop_on_ponderhit(false);
                        }
                    } else if best_value >= beta {
                        beta = (best_value + delta).min(INFINITE);
                        failed_high_cnt += 1;
                    } else {
                        break 'aspiration_window;
                    }

                    delta += delta / 3;
                    if delta > 1500 {
                        alpha = NEG_INFINITE;
                        beta = INFINITE;
                    }
                    debug_assert!(alpha >= NEG_INFINITE && beta <= INFINITE);
                }

                self.root_moves.sort_range(0, pv_idx + 1);

                if self.use_stdout()
                    && (self.stop() || pv_idx + 1 == multi_pv || self.limits.elapsed() > 3000)
                {
                    self.print_info(root_depth);
                }
            }

            if !self.stop() {
                self.depth_completed = root_depth;
            }

            let curr_best_move = self.root_moves[0].bit_move();
            if curr_best_move != last_best_move {
                last_best_move = curr_best_move;
                last_best_move_depth = root_depth;
            }

            // Have we found a "mate in x"?
            if let Some(mate) = self.limits.mate {
                let score = self.root_moves[0].score;
                if score >= MATE_IN_MAX_PLY && MATE - score <= 2 * mate {
                    self.shared.set_stop(true);
                }
            }

            root_depth += skip_size;

            if !main {
                continue;
            }

            // Main thread only from here on!
            if self.stop() || self.shared.stop_on_ponderhit() {
                continue;
            }

            let best_value = self.root_moves[0].score;
            let previous = if self.previous_score == INFINITE {
                best_value
            } else {
                self.previous_score
            };
            let falling_eval = ((66 + 14 * (previous - best_value)
                + 6 * (self.iter_values[iter_idx] - best_value)) as f64
                / 616.6)
                .clamp(0.51, 1.51);

            // If the bestMove is stable over several iterations, reduce time accordingly
            time_reduction = if last_best_move_depth + 8 < self.depth_completed {
                1.56
            } else {
                0.69
            };
            let reduction = (1.4 + self.previous_time_reduction) / (2.17 * time_reduction);
            let instability = 1.0 + 1.88 * self.best_move_changes / (1 + self.helpers.len()) as f64;
            let node_share = self.root_moves[0].effort as f64 / self.nodes.max(1) as f64;

            let factors = SoftStopFactors {
                falling_eval,
                time_reduction: reduction,
                instability,
                node_share,
            };

            // Stop the search if we have only one legal move, or if available time elapsed
            let only_move = self.root_moves.len() == 1 && self.limits.use_time_management();
            if only_move || self.limits.should_stop_soft(self.shared.total_nodes(), &factors) {
                if self.shared.pondering() {
                    self.shared.set_stop_on_ponderhit(true);
                } else {
                    self.shared.set_stop(true);
                    break 'iterative_deepening;
                }
            }

            self.iter_values[iter_idx] = best_value;
            iter_idx = (iter_idx + 1) & 3;
        }

        if main {
            self.previous_time_reduction = time_reduction;
        }
    }

    // The searching function for a specific depth.
    fn search<N: PVNode>(
        &mut self,
        mut alpha: Value,
        mut beta: Value,
        depth: i32,
        ply: usize,
        cut_node: bool,
    ) -> Value {
        let pv_node = N::is_pv();
        let root_node = N::is_root();

        if depth <= 0 {
            return self.qsearch::<N>(alpha, beta, ply);
        }

        let mut depth = depth.min(MAX_PLY as i32 - 1);
        let ss = ply + STACK_OFFSET;
        let in_check = self.board.in_check();
        let us = self.board.turn();
        let orig_alpha = alpha;

        if pv_node {
            self.pv.clear(ply);
            self.sel_depth = self.sel_depth.max(ply as i32 + 1);
        }

        // If we are the main thread, check the time.
        if self.main_thread() {
            self.check_time();
        }

        if !root_node {
            // Check for stop conditions.
            if self.stop() || ply >= MAX_PLY - 1 || self.board.is_draw(ply as i32) {
                return if ply >= MAX_PLY - 1 && !in_check {
                    self.evaluate()
                } else {
                    DRAW
                };
            }

            // Mate distance pruning. This ensures that checkmates closer to the root
            // have a higher value than otherwise.
            alpha = alpha.max(mated_in(ply as i32));
            beta = beta.min(mate_in(ply as i32 + 1));
            if alpha >= beta {
                return alpha;
            }
        }

        let excluded_move = self.stack[ss].excluded_move;
        self.stack[ss].in_check = in_check;
        self.stack[ss].move_count = 0;
        self.stack[ss + 1].excluded_move = BitMove::null();
        // Set the killer moves two plies in advance to be nothing.
        self.stack[ss + 2].killers = [BitMove::null(); 2];
        self.stack[ss + 2].cutoff_cnt = 0;
        self.stack[ss].double_extensions = self.stack[ss - 1].double_extensions;

        let prev_move = self.stack[ss - 1].current_move;
        let prev_sq = prev_move.get_dest();
        let prior_capture = self.board.piece_captured_last_turn() != Piece::None;

        // probe the transposition table
        let key = self.board.zobrist();
        let tt_entry: Option<TTEntry> = if excluded_move.is_null() {
            self.tt.probe(key)
        } else {
            None
        };
        let rule_50 = self.board.rule_50() as i32;
        let tt_value = tt_entry.map_or(NONE, |e| value_from_tt(e.score, ply as i32, rule_50));
        let tt_move = if root_node {
            self.root_moves[self.pv_idx].bit_move()
        } else {
            tt_entry
                .map(|e| e.best_move)
                .filter(|m| !m.is_null() && self.board.pseudo_legal_move(*m))
                .unwrap_or_else(BitMove::null)
        };
        let tt_capture = !tt_move.is_null() && self.board.is_noisy(tt_move);
        if excluded_move.is_null() {
            self.stack[ss].tt_pv = pv_node || tt_entry.map_or(false, |e| e.is_pv);
        }
        let tt_pv = self.stack[ss].tt_pv;

        // At non-PV nodes, check for a better TT value to return.
        if !pv_node && excluded_move.is_null() && tt_value != NONE {
            if let Some(e) = tt_entry {
                let bound = if tt_value >= beta {
                    NodeBound::LowerBound
                } else {
                    NodeBound::UpperBound
                };
                if e.depth > depth - (tt_value <= beta) as i32 && e.bound.includes(bound) {
                    if !tt_move.is_null() && tt_value >= beta {
                        // Bonus for a quiet ttMove that fails high
                        if !tt_capture {
                            let bonus = self.params.stat_bonus(depth);
                            self.update_quiet_stats(ss, tt_move, bonus);
                        }

                        // Extra penalty for early quiet moves of the previous ply
                        if self.stack[ss - 1].move_count <= 2 && !prev_move.is_null() && !prior_capture {
                            let piece = self.board.piece_at_sq(prev_sq);
                            let malus = -self.params.stat_bonus(depth + 1);
                            self.update_continuation_histories(ss - 1, piece, prev_sq, malus);
                        }
                    }
                    // Partial workaround for the graph history interaction problem
                    if rule_50 < 90 {
                        return tt_value;
                    }
                }
            }
        }

        // Get and set the position eval
        let mut unadjusted_eval = NONE;
        let static_eval;
        let mut eval;
        if in_check {
            // A checking position should never be evaluated. We go directly to the moves loop
            // now.
            static_eval = NONE;
            eval = NONE;
        } else if !excluded_move.is_null() {
            static_eval = self.stack[ss].static_eval;
            eval = static_eval;
        } else if let Some(e) = tt_entry {
            unadjusted_eval = if e.eval == NONE {
                self.evaluate()
            } else {
                e.eval
            };
            static_eval = self.adjust_eval(unadjusted_eval);
            eval = static_eval;

            // check for tt value being a better position evaluation
            let bound = if tt_value > eval {
                NodeBound::LowerBound
            } else {
                NodeBound::UpperBound
            };
            if tt_value != NONE && e.bound.includes(bound) {
                eval = tt_value;
            }
        } else {
            unadjusted_eval = self.evaluate();
            static_eval = self.adjust_eval(unadjusted_eval);
            eval = static_eval;
            // Place the evaluation into the tt, as it's otherwise empty
            self.tt.store(
                key,
                BitMove::null(),
                NONE,
                unadjusted_eval,
                DEPTH_UNSEARCHED,
                NodeBound::NoBound,
                tt_pv,
            );
        }
        self.stack[ss].static_eval = static_eval;

        let improving = if in_check {
            false
        } else if self.stack[ss - 2].static_eval != NONE {
            static_eval > self.stack[ss - 2].static_eval
        } else if self.stack[ss - 4].static_eval != NONE {
            static_eval > self.stack[ss - 4].static_eval
        } else {
            true
        };

        if !pv_node && !in_check {
            // Razoring. If the evaluation plus a large margin still isn't better than alpha,
            // verify with a quiescence search.
            if eval < alpha - self.params.razor_margin(depth) {
                let v = self.qsearch::<NonPV>(alpha - 1, alpha, ply);
                if v < alpha && !is_decisive(v) {
                    return v;
                }
            }

            // Futility Pruning. Disregard moves that have little chance of raising the callee's
            // alpha value. Rather, return the position evaluation as an estimate for the current
            // move's strength
            if depth < self.params.rfp_max_depth
                && excluded_move.is_null()
                && eval - self.params.rfp_margin(depth, improving) >= beta
                && eval >= beta
                && eval < TB_WIN_IN_MAX_PLY
                && (tt_move.is_null() || tt_capture)
            {
                return beta + (eval - beta) / 3;
            }

            // Null move search with verification.
            if excluded_move.is_null()
                && !prev_move.is_null()
                && eval >= beta
                && static_eval >= beta - 20 * depth + 200
                && self.board.non_pawn_material(us) > 0
                && ply >= self.nmp_min_ply
                && beta > TB_LOSS_IN_MAX_PLY
            {
                let r = (self.params.nmp_base
                    + depth / self.params.nmp_depth_div
                    + ((eval - beta) / self.params.nmp_eval_div).min(3))
                .min(depth);

                self.stack[ss].current_move = BitMove::null();
                self.stack[ss].cont = ContKey::NONE;
                self.make_null_move();
                let null_value = -self.search::<NonPV>(-beta, -beta + 1, depth - r, ply + 1, !cut_node);
                self.unmake_null_move();

                if null_value >= beta && null_value < TB_WIN_IN_MAX_PLY {
                    if self.nmp_min_ply != 0 || depth < self.params.nmp_verify_depth {
                        return null_value;
                    }

                    // Do verification search at high depths, with null move pruning disabled
                    // until ply exceeds nmpMinPly.
                    self.nmp_min_ply = ply + (3 * (depth - r) / 4) as usize;
                    let v = self.search::<NonPV>(beta - 1, beta, depth - r, ply, false);
                    self.nmp_min_ply = 0;

                    if v >= beta {
                        return null_value;
                    }
                }
            }
        }

        // Internal iterative reductions.
        if pv_node && tt_move.is_null() {
            depth -= 2;
        }
        if cut_node && depth >= 8 && tt_move.is_null() {
            depth -= 2;
        }
        if depth <= 0 {
            return self.qsearch::<N>(alpha, beta, ply);
        }

        // ProbCut. If we have a good enough capture and a reduced search returns a value
        // much above beta, we can (almost) safely prune the previous move.
        let probcut_beta = beta + self.params.probcut_margin - 60 * improving as i32;
        if !pv_node
            && !in_check
            && depth > 3
            && excluded_move.is_null()
            && !is_decisive(beta)
            && !tt_entry.map_or(false, |e| {
                e.depth >= depth - 3 && tt_value != NONE && tt_value < probcut_beta
            })
        {
            let ttm = if tt_capture { tt_move } else { BitMove::null() };
            let mut mp = MovePicker::probcut_search(&self.board, probcut_beta - static_eval, ttm);
            loop {
                let mv = mp.next(&self.board, &self.hist, false);
                if mv.is_null() {
                    break;
                }
                if !self.board.legal_move(mv) {
                    continue;
                }
                let piece = self.board.moved_piece(mv);
                self.stack[ss].current_move = mv;
                self.stack[ss].cont = ContKey::new(in_check, true, piece, mv.get_dest());

                self.make_move(mv);
                // Perform a preliminary qsearch to verify that the move holds
                let mut value = -self.qsearch::<NonPV>(-probcut_beta, -probcut_beta + 1, ply + 1);
                if value >= probcut_beta {
                    value = -self.search::<NonPV>(
                        -probcut_beta,
                        -probcut_beta + 1,
                        depth - 4,
                        ply + 1,
                        !cut_node,
                    );
                }
                self.unmake_move();

                if value >= probcut_beta {
                    self.tt.store(
                        key,
                        mv,
                        value_to_tt(value, ply as i32),
                        unadjusted_eval,
                        depth - 3,
                        NodeBound::LowerBound,
                        tt_pv,
                    );
                    return value - (probcut_beta - beta);
                }
            }
        }

        let cont = [
            self.stack[ss - 1].cont,
            self.stack[ss - 2].cont,
            self.stack[ss - 4].cont,
        ];
        let counter_move = if prev_move.is_null() {
            BitMove::null()
        } else {
            self.hist.counter_moves[(self.board.piece_at_sq(prev_sq), prev_sq)]
        };
        let killers = self.stack[ss].killers;
        let mut mp = MovePicker::main_search(&self.board, depth, tt_move, &killers, counter_move, cont);

        let mut best_value = NEG_INFINITE;
        let mut best_move = BitMove::null();
        let mut move_count: usize = 0;
        let mut skip_quiets = false;

        let mut captures_searched = [BitMove::null(); 32];
        let mut captures_count = 0;
        let mut quiets_searched = [BitMove::null(); 64];
        let mut quiets_count = 0;

        loop {
            let mv = mp.next(&self.board, &self.hist, skip_quiets);
            if mv.is_null() {
                break;
            }
            if mv == excluded_move {
                continue;
            }

            if root_node {
                // Only the moves of the current MultiPV slice are searched at the root.
                let in_slice = self.root_moves[self.pv_idx..self.pv_last]
                    .iter()
                    .any(|rm| rm.bit_move() == mv);
                if !in_slice {
                    continue;
                }
            } else if !self.board.legal_move(mv) {
                continue;
            }

            move_count += 1;
            self.stack[ss].move_count = move_count;

            if root_node && self.use_stdout() && self.limits.elapsed() > 3000 {
                println!(
                    "info depth {} currmove {} currmovenumber {}",
                    depth,
                    mv.stringify(self.board.is_chess960()),
                    move_count + self.pv_idx
                );
            }
            if pv_node {
                self.pv.clear(ply + 1);
            }

            let capture = self.board.is_noisy(mv);
            let moved_piece = self.board.moved_piece(mv);
            let to = mv.get_dest();
            let gives_check = self.board.gives_check(mv);
            let mut new_depth = depth - 1;
            let mut extension = 0;
            let r = self.lmr.reduction(depth, move_count);

            // Pruning at shallow depth
            if !root_node && self.board.non_pawn_material(us) > 0 && best_value > TB_LOSS_IN_MAX_PLY {
                if move_count >= self.params.lmp_count(depth, improving) {
                    skip_quiets = true;
                }

                let mut lmr_depth = new_depth - r / 1024;

                if capture || gives_check {
                    let captured = self.board.captured_piece(mv);
                    if !gives_check && !in_check && lmr_depth < 7 {
                        let futility_value = static_eval
                            + 200
                            + 200 * lmr_depth
                            + see_value_cp(captured)
                            + self.hist.capture[(moved_piece, to, captured.type_of())] as i32 / 7;
                        if futility_value <= alpha {
                            continue;
                        }
                    }

                    // SEE based pruning for captures and checks
                    let margin = self.params.see_capture_margin * depth * depth;
                    if !self.board.see_ge(mv, -margin) {
                        continue;
                    }
                } else {
                    let history = self.hist.continuation[cont[0]][(moved_piece, to)] as i32
                        + self.hist.continuation[cont[1]][(moved_piece, to)] as i32
                        + self.hist.main[(us, mv)] as i32;

                    // Continuation history based pruning
                    if lmr_depth < 6 && history < -3000 * depth {
                        continue;
                    }

                    lmr_depth = (lmr_depth + history / 5000).max(0);

                    // Futility pruning: parent node
                    if !in_check
                        && lmr_depth < 10
                        && static_eval
                            + self.params.futility_base
                            + self.params.futility_depth * lmr_depth
                            <= alpha
                    {
                        continue;
                    }

                    // Prune moves with negative SEE
                    if !self.board.see_ge(mv, -self.params.see_quiet_margin * lmr_depth) {
                        continue;
                    }
                }
            }

            // Extensions
            if !root_node && ply < 2 * self.root_depth as usize {
                // Singular extension search. If all moves but one fail low on a search of
                // (alpha-s, beta-s), and just one fails high on (alpha, beta), then that move
                // is singular and should be extended.
                let singular = depth >= self.params.singular_min_depth
                    && mv == tt_move
                    && excluded_move.is_null()
                    && tt_value.abs() < TB_WIN_IN_MAX_PLY
                    && tt_entry.map_or(false, |e| {
                        e.bound.includes(NodeBound::LowerBound) && e.depth >= depth - 3
                    });

                if singular {
                    let singular_beta = tt_value - 2 * depth;
                    let singular_depth = (depth - 1) / 2;

                    self.stack[ss].excluded_move = mv;
                    let value = self.search::<NonPV>(
                        singular_beta - 1,
                        singular_beta,
                        singular_depth,
                        ply,
                        cut_node,
                    );
                    self.stack[ss].excluded_move = BitMove::null();
                    self.stack[ss].move_count = move_count;

                    if value < singular_beta {
                        extension = 1;
                        if !pv_node
                            && value < singular_beta - self.params.singular_double_margin
                            && self.stack[ss].double_extensions <= 10
                        {
                            extension = 2;
                        }
                    } else if singular_beta >= beta {
                        // Multi-cut pruning: more than one move fails high
                        return singular_beta;
                    } else if tt_value >= beta || cut_node {
                        extension = -1;
                    }
                } else if gives_check && depth >= 6 && self.board.see_ge(mv, 0) {
                    extension = 1;
                }
            }

            new_depth += extension;
            self.stack[ss].double_extensions =
                self.stack[ss - 1].double_extensions + (extension == 2) as i32;

            // Speculative prefetch as early as possible
            self.tt.prefetch(self.board.key_after(mv));

            self.stack[ss].current_move = mv;
            self.stack[ss].cont = ContKey::new(in_check, capture, moved_piece, to);
            let nodes_before = self.nodes;
            self.make_move(mv);

            let mut value = NEG_INFINITE;

            // Late move reductions.
            if depth >= 2 && move_count > 1 + root_node as usize && (!tt_pv || !capture || cut_node) {
                let mut r = r;
                if tt_pv {
                    r -= 1024;
                }
                if cut_node {
                    r += 2048;
                }
                if tt_capture {
                    r += 1024;
                }
                if !improving {
                    r += 512;
                }
                if self.stack[ss + 1].cutoff_cnt > 3 {
                    r += 1024;
                }

                let stat_score = if capture {
                    0
                } else {
                    2 * self.hist.main[(us, mv)] as i32
                        + self.hist.continuation[cont[0]][(moved_piece, to)] as i32
                        + self.hist.continuation[cont[1]][(moved_piece, to)] as i32
                        - 4000
                };
                self.stack[ss].stat_score = stat_score;
                r -= stat_score * 1024 / self.params.lmr_history_div;

                let d = (new_depth - r / 1024).max(1).min(new_depth + 1);
                value = -self.search::<NonPV>(-(alpha + 1), -alpha, d, ply + 1, true);

                // Do a full depth search when reduced LMR search fails high
                if value > alpha && d < new_depth {
                    value = -self.search::<NonPV>(-(alpha + 1), -alpha, new_depth, ply + 1, !cut_node);

                    if !capture {
                        let bonus = if value <= alpha {
                            -self.params.stat_bonus(new_depth)
                        } else if value >= beta {
                            self.params.stat_bonus(new_depth)
                        } else {
                            0
                        };
                        self.update_continuation_histories(ss, moved_piece, to, bonus);
                    }
                }
            } else if !pv_node || move_count > 1 {
                // Full depth search when LMR is skipped.
                value = -self.search::<NonPV>(-(alpha + 1), -alpha, new_depth, ply + 1, !cut_node);
            }

            // For PV nodes only, do a full PV search on the first move or after a fail high
            if pv_node && (move_count == 1 || value > alpha) {
                value = -self.search::<PV>(-beta, -alpha, new_depth, ply + 1, false);
            }

            self.unmake_move();

            // Finished searching the move. If a stop occurred, the return value of the search
            // cannot be trusted, and we return immediately without updating best move, PV and
            // TT.
            if self.stop() {
                return ZERO;
            }

            if root_node {
                let main = self.main_thread();
                if let Some(idx) = self.root_moves.find(mv) {
                    let rm = &mut self.root_moves[idx];
                    rm.effort += self.nodes - nodes_before;

                    // PV move or new best move?
                    if move_count == 1 || value > alpha {
                        rm.insert_score(value);
                        rm.sel_depth = self.sel_depth;
                        rm.score_lowerbound = value >= beta;
                        rm.score_upperbound = value <= alpha;
                        if rm.score_lowerbound {
                            rm.uci_score = beta;
                        } else if rm.score_upperbound {
                            rm.uci_score = alpha;
                        }
                        rm.set_pv(self.pv.line(ply + 1));

                        // We record how often the best move has been changed in each
                        // iteration. This information is used for time management.
                        if move_count > 1 && main {
                            self.best_move_changes += 1.0;
                        }
                    } else {
                        // All other moves but the PV are set to the lowest value: this is
                        // not a problem when sorting because the sort is stable and the
                        // move position in the list is preserved - just the PV is pushed up.
                        rm.score = NEG_INFINITE;
                    }
                }
            }

            if value > best_value {
                best_value = value;

                if value > alpha {
                    best_move = mv;

                    if pv_node {
                        self.pv.update(ply, mv);
                    }

                    if value >= beta {
                        self.stack[ss].cutoff_cnt += 1;
                        break;
                    }
                    alpha = value;
                }
            }

            // If the move is worse than some previously searched move, remember it to update
            // its stats later.
            if mv != best_move {
                if capture && captures_count < captures_searched.len() {
                    captures_searched[captures_count] = mv;
                    captures_count += 1;
                } else if !capture && quiets_count < quiets_searched.len() {
                    quiets_searched[quiets_count] = mv;
                    quiets_count += 1;
                }
            }
        }

        // Check for mate and stalemate
        if move_count == 0 {
            best_value = if !excluded_move.is_null() {
                alpha
            } else if in_check {
                mated_in(ply as i32)
            } else {
                DRAW
            };
        } else if !best_move.is_null() {
            self.update_all_stats(
                ss,
                best_move,
                best_value,
                beta,
                &quiets_searched[..quiets_count],
                &captures_searched[..captures_count],
                depth,
            );
        } else if !prev_move.is_null() && !prior_capture {
            // Bonus for prior countermove that caused the fail low
            let piece = self.board.piece_at_sq(prev_sq);
            let bonus = self.params.stat_bonus(depth);
            self.update_continuation_histories(ss - 1, piece, prev_sq, bonus);
        }

        // If no good move is found and the previous position was ttPv, then the previous
        // opponent move is probably good and the new position is added to the search tree.
        if best_value <= alpha {
            self.stack[ss].tt_pv = self.stack[ss].tt_pv || (self.stack[ss - 1].tt_pv && depth > 3);
        }

        // Write gathered information in transposition table
        if excluded_move.is_null() && !(root_node && self.pv_idx > 0) {
            let bound = if best_value >= beta {
                NodeBound::LowerBound
            } else if pv_node && best_value > orig_alpha {
                NodeBound::Exact
            } else {
                NodeBound::UpperBound
            };
            self.tt.store(
                key,
                best_move,
                value_to_tt(best_value, ply as i32),
                unadjusted_eval,
                depth,
                bound,
                self.stack[ss].tt_pv,
            );
        }

        // Adjust correction history
        if !in_check
            && excluded_move.is_null()
            && (best_move.is_null() || !self.board.is_noisy(best_move))
            && !(best_value >= beta && best_value <= static_eval)
            && !(best_move.is_null() && best_value >= static_eval)
        {
            let bonus = ((best_value - static_eval) * depth / 8)
                .clamp(-CORRECTION_MAX_BONUS, CORRECTION_MAX_BONUS);
            self.hist.correction.update(&self.board, bonus);
        }

        best_value
    }

    /// Searches only noisy moves (and evasions) until the position is quiet.
    fn qsearch<N: PVNode>(&mut self, mut alpha: Value, beta: Value, ply: usize) -> Value {
        let pv_node = N::is_pv();
        let ss = ply + STACK_OFFSET;
        let in_check = self.board.in_check();
        let us = self.board.turn();

        if pv_node {
            self.pv.clear(ply);
            self.sel_depth = self.sel_depth.max(ply as i32 + 1);
        }

        if self.main_thread() {
            self.check_time();
        }

        if ply >= MAX_PLY - 1 || self.board.is_draw(ply as i32) {
            return if ply >= MAX_PLY - 1 && !in_check {
                self.evaluate()
            } else {
                DRAW
            };
        }

        let key = self.board.zobrist();
        let tt_entry = self.tt.probe(key);
        let rule_50 = self.board.rule_50() as i32;
        let tt_value = tt_entry.map_or(NONE, |e| value_from_tt(e.score, ply as i32, rule_50));
        let tt_move = tt_entry
            .map(|e| e.best_move)
            .filter(|m| !m.is_null() && self.board.pseudo_legal_move(*m))
            .unwrap_or_else(BitMove::null);
        let pv_hit = tt_entry.map_or(false, |e| e.is_pv);

        if !pv_node && tt_value != NONE {
            if let Some(e) = tt_entry {
                let bound = if tt_value >= beta {
                    NodeBound::LowerBound
                } else {
                    NodeBound::UpperBound
                };
                if e.depth >= DEPTH_QS && e.bound.includes(bound) {
                    return tt_value;
                }
            }
        }

        let mut unadjusted_eval = NONE;
        let static_eval;
        let mut best_value;
        let futility_base;
        if in_check {
            static_eval = NONE;
            best_value = NEG_INFINITE;
            futility_base = NEG_INFINITE;
        } else {
            if let Some(e) = tt_entry {
                unadjusted_eval = if e.eval == NONE {
                    self.evaluate()
                } else {
                    e.eval
                };
                static_eval = self.adjust_eval(unadjusted_eval);
                best_value = static_eval;

                let bound = if tt_value > best_value {
                    NodeBound::LowerBound
                } else {
                    NodeBound::UpperBound
                };
                if tt_value != NONE && e.bound.includes(bound) {
                    best_value = tt_value;
                }
            } else {
                unadjusted_eval = self.evaluate();
                static_eval = self.adjust_eval(unadjusted_eval);
                best_value = static_eval;
            }

            // Stand pat. Return immediately if static value is at least beta
            if best_value >= beta {
                if tt_entry.is_none() {
                    self.tt.store(
                        key,
                        BitMove::null(),
                        value_to_tt(best_value, ply as i32),
                        unadjusted_eval,
                        DEPTH_UNSEARCHED,
                        NodeBound::LowerBound,
                        false,
                    );
                }
                return best_value;
            }

            if best_value > alpha {
                alpha = best_value;
            }

            futility_base = static_eval + self.params.qs_futility_margin;
        }
        self.stack[ss].static_eval = static_eval;

        let prev_sq = self.stack[ss - 1].current_move.get_dest();
        let cont = [
            self.stack[ss - 1].cont,
            self.stack[ss - 2].cont,
            self.stack[ss - 4].cont,
        ];
        let mut mp = MovePicker::qsearch(&self.board, tt_move, cont);
        let mut best_move = BitMove::null();
        let mut move_count = 0;

        loop {
            let mv = mp.next(&self.board, &self.hist, false);
            if mv.is_null() {
                break;
            }
            if !self.board.legal_move(mv) {
                continue;
            }

            let gives_check = self.board.gives_check(mv);
            let capture = self.board.is_capture(mv);
            move_count += 1;

            // Pruning
            if best_value > TB_LOSS_IN_MAX_PLY && self.board.non_pawn_material(us) > 0 {
                // Futility pruning and moveCount pruning
                if !gives_check
                    && mv.get_dest() != prev_sq
                    && futility_base > TB_LOSS_IN_MAX_PLY
                    && !mv.is_promo()
                {
                    if move_count > 2 {
                        continue;
                    }

                    let futility_value = futility_base + see_value_cp(self.board.captured_piece(mv));

                    // If static eval + value of piece we are going to capture is much lower
                    // than alpha we can prune this move
                    if futility_value <= alpha {
                        best_value = best_value.max(futility_value);
                        continue;
                    }

                    // If static eval is much lower than alpha and move is not winning material
                    // we can prune this move
                    if futility_base <= alpha && !self.board.see_ge(mv, 1) {
                        best_value = best_value.max(futility_base);
                        continue;
                    }
                }

                // Do not search moves with bad enough SEE values
                if !self.board.see_ge(mv, -80) {
                    continue;
                }
            }

            self.stack[ss].current_move = mv;
            self.stack[ss].cont = ContKey::new(in_check, capture, self.board.moved_piece(mv), mv.get_dest());
            self.tt.prefetch(self.board.key_after(mv));
            self.make_move(mv);
            let value = -self.qsearch::<N>(-beta, -alpha, ply + 1);
            self.unmake_move();

            if value > best_value {
                best_value = value;

                if value > alpha {
                    best_move = mv;

                    if pv_node {
                        self.pv.update(ply, mv);
                    }

                    if value < beta {
                        alpha = value;
                    } else {
                        break; // Fail high
                    }
                }
            }
        }

        // All legal moves have been searched. A special case: if we're in check
        // and no legal moves were found, it is checkmate.
        if in_check && best_value == NEG_INFINITE {
            return mated_in(ply as i32);
        }

        let bound = if best_value >= beta {
            NodeBound::LowerBound
        } else {
            NodeBound::UpperBound
        };
        self.tt.store(
            key,
            best_move,
            value_to_tt(best_value, ply as i32),
            unadjusted_eval,
            DEPTH_QS,
            bound,
            pv_hit,
        );

        best_value
    }

    /// Updates stats at the end of search() when a bestMove is found.
    #[allow(clippy::too_many_arguments)]
    fn update_all_stats(
        &mut self,
        ss: usize,
        best_move: BitMove,
        best_value: Value,
        beta: Value,
        quiets: &[BitMove],
        captures: &[BitMove],
        depth: i32,
    ) {
        let us = self.board.turn();
        let bonus = self.params.stat_bonus(depth + (best_value > beta + 150) as i32);
        let malus = self.params.stat_bonus(depth);

        if !self.board.is_noisy(best_move) {
            self.update_quiet_stats(ss, best_move, bonus);

            // Decrease stats for all non-best quiet moves
            for &q in quiets {
                self.hist.main.update(us, q, -malus);
                let piece = self.board.moved_piece(q);
                self.update_continuation_histories(ss, piece, q.get_dest(), -malus);
            }
        } else {
            let moved = self.board.moved_piece(best_move);
            let captured = self.board.captured_piece(best_move).type_of();
            self.hist.capture.update(moved, best_move.get_dest(), captured, bonus);
        }

        // Extra penalty for a quiet early move that was not a TT move or main killer move
        // in previous ply when it gets refuted.
        let prev_move = self.stack[ss - 1].current_move;
        if !prev_move.is_null()
            && self.stack[ss - 1].move_count == 1 + self.stack[ss - 1].tt_pv as usize
            && self.board.piece_captured_last_turn() == Piece::None
        {
            let prev_sq = prev_move.get_dest();
            let piece = self.board.piece_at_sq(prev_sq);
            self.update_continuation_histories(ss - 1, piece, prev_sq, -malus);
        }

        // Decrease stats for all non-best capture moves
        for &c in captures {
            let moved = self.board.moved_piece(c);
            let captured = self.board.captured_piece(c).type_of();
            self.hist.capture.update(moved, c.get_dest(), captured, -malus);
        }
    }

    /// Updates killers, history, countermove and countermove plus follow-up move history
    /// when a new quiet best move is found.
    fn update_quiet_stats(&mut self, ss: usize, mv: BitMove, bonus: i32) {
        let killers = &mut self.stack[ss].killers;
        if killers[0] != mv {
            killers[1] = killers[0];
            killers[0] = mv;
        }

        let us = self.board.turn();
        self.hist.main.update(us, mv, bonus);
        let piece = self.board.moved_piece(mv);
        self.update_continuation_histories(ss, piece, mv.get_dest(), bonus);

        let prev_move = self.stack[ss - 1].current_move;
        if !prev_move.is_null() {
            let prev_sq = prev_move.get_dest();
            let prev_piece = self.board.piece_at_sq(prev_sq);
            self.hist.counter_moves[(prev_piece, prev_sq)] = mv;
        }
    }

    /// Updates histories of the move pairs formed by moves at ply -1, -2 and -4 with the
    /// current move.
    fn update_continuation_histories(&mut self, ss: usize, piece: Piece, to: SQ, bonus: i32) {
        let in_check = self.stack[ss].in_check;
        for i in [1, 2, 4] {
            // Only update the first 2 continuation histories if we are in check
            if in_check && i > 2 {
                break;
            }
            let key = self.stack[ss - i].cont;
            if key.piece != Piece::None {
                self.hist.continuation[key].update(piece, to, bonus);
            }
        }
    }

    #[inline]
    fn evaluate(&mut self) -> Value {
        self.acc.evaluate(&self.board, &self.net)
    }

    /// Applies the correction history to a raw evaluation.
    #[inline]
    fn adjust_eval(&self, v: Value) -> Value {
        let weights = self.params.correction_weights();
        let corrected = v + self.hist.correction.correction(&self.board, &weights);
        corrected.clamp(TB_LOSS_IN_MAX_PLY + 1, TB_WIN_IN_MAX_PLY - 1)
    }

    #[inline]
    fn make_move(&mut self, mv: BitMove) {
        self.nodes += 1;
        self.shared.set_nodes(self.id, self.nodes);
        self.board.apply_move(mv);
        self.acc.push(self.board.dirty_piece());
    }

    #[inline]
    fn unmake_move(&mut self) {
        self.board.undo_move();
        self.acc.pop();
    }

    #[inline]
    fn make_null_move(&mut self) {
        self.nodes += 1;
        self.shared.set_nodes(self.id, self.nodes);
        self.board.apply_null_move();
        self.tt.prefetch(self.board.zobrist());
        self.acc.push(self.board.dirty_piece());
    }

    #[inline]
    fn unmake_null_move(&mut self) {
        self.board.undo_null_move();
        self.acc.pop();
    }

    /// Checks the hard limits every few thousand nodes, signalling every thread to stop once
    /// one is reached.
    fn check_time(&mut self) {
        self.calls_cnt -= 1;
        if self.calls_cnt > 0 {
            return;
        }
        self.calls_cnt = TIME_CHECK_INTERVAL;

        // We should not stop pondering until told so by the GUI
        if self.shared.pondering() {
            return;
        }

        if self.limits.should_stop_hard(self.shared.total_nodes()) {
            self.shared.set_stop(true);
        }
    }

    /// Prints the `info` lines of every MultiPV slot.
    fn print_info(&self, depth: i32) {
        let multi_pv = self.multi_pv.max(1).min(self.root_moves.len());
        for i in 0..multi_pv {
            let rm = &self.root_moves[i];
            let updated = rm.score != NEG_INFINITE;
            if depth == 1 && !updated && i > 0 {
                continue;
            }
            let d = if updated { depth } else { (depth - 1).max(1) };
            self.print_line(d, i + 1, rm, updated && i == self.pv_idx);
        }
    }

    fn print_line(&self, depth: i32, multi_pv: usize, rm: &RootMove, show_bound: bool) {
        let mut v = if rm.score != NEG_INFINITE {
            rm.uci_score
        } else {
            rm.previous_score
        };
        if v == NEG_INFINITE || self.root_drawn {
            v = DRAW;
        }

        let line = InfoLine {
            depth,
            sel_depth: rm.sel_depth,
            multi_pv,
            score: v,
            lowerbound: show_bound && rm.score_lowerbound,
            upperbound: show_bound && !rm.score_lowerbound && rm.score_upperbound,
            nodes: self.shared.total_nodes(),
            elapsed_ms: self.limits.elapsed().max(0) as u64,
            hashfull: self.tt.hashfull(),
            pv: &rm.pv,
            chess960: self.board.is_chess960(),
        };
        println!("{}", line);
    }

    /// Static evaluation of the current board, for the `eval` command.
    pub fn static_eval(&mut self) -> Value {
        self.acc.reset(&self.board, &self.net);
        let raw = self.evaluate();
        if self.board.turn() == Player::White {
            raw
        } else {
            -raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uci_scores() {
        assert_eq!(score_to_uci(35), "cp 35");
        assert_eq!(score_to_uci(mate_in(1)), "mate 1");
        assert_eq!(score_to_uci(mate_in(3)), "mate 2");
        assert_eq!(score_to_uci(mated_in(2)), "mate -1");
        assert_eq!(score_to_uci(mated_in(0)), "mate 0");
    }

    #[test]
    fn pv_table_lines() {
        let mut pv = PvTable::new();
        let a = BitMove::make(SQ::E2, SQ::E4);
        let b = BitMove::make(SQ::E7, SQ::E5);
        let c = BitMove::make(SQ::G1, SQ::F3);
        pv.clear(2);
        pv.update(2, c);
        pv.update(1, b);
        pv.update(0, a);
        assert_eq!(pv.line(0), &[a, b, c]);
        pv.clear(1);
        pv.update(0, b);
        assert_eq!(pv.line(0), &[b]);
    }

    #[test]
    fn info_line_format() {
        let pv = [BitMove::make(SQ::E2, SQ::E4), BitMove::make(SQ::E7, SQ::E5)];
        let mut line = InfoLine {
            depth: 10,
            sel_depth: 14,
            multi_pv: 1,
            score: 35,
            lowerbound: false,
            upperbound: false,
            nodes: 20_000,
            elapsed_ms: 999,
            hashfull: 12,
            pv: &pv,
            chess960: false,
        };
        assert_eq!(
            line.to_string(),
            "info depth 10 seldepth 14 multipv 1 score cp 35 nodes 20000 nps 20000 hashfull 12 time 999 pv e2e4 e7e5"
        );

        line.lowerbound = true;
        line.score = mate_in(3);
        line.multi_pv = 2;
        assert_eq!(
            line.to_string(),
            "info depth 10 seldepth 14 multipv 2 score mate 2 lowerbound nodes 20000 nps 20000 hashfull 12 time 999 pv e2e4 e7e5"
        );
    }
}
