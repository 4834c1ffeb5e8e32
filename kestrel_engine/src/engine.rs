//! The engine context: owns the position, the options and the thread pool, and executes UCI
//! commands against them.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::Instant;

use kestrel::board::fen::BENCH_FENS;
use kestrel::board::perft;
use kestrel::Board;

use crate::consts::*;
use crate::nnue::network::INTERNAL_NAME;
use crate::nnue::Network;
use crate::search::SearchResult;
use crate::threadpool::ThreadPool;
use crate::time::PreLimits;
use crate::tt::TTAllocError;
use crate::uci::options::{default_threads, OptionWork, OptionsMap};
use crate::uci::{parse, UciError};

// --------- STATIC VARIABLES

pub static ID_NAME: &str = "Kestrel";
pub static ID_AUTHORS: &str = "the Kestrel developers";
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

/// Depth of each search of the `bench` command.
pub const DEFAULT_BENCH_DEPTH: u16 = 10;

pub struct KestrelEngine {
    options: OptionsMap,
    pool: ThreadPool,
    board: Board,
    use_stdout: bool,
    chess960: bool,
    multi_pv: usize,
    move_overhead: i64,
    /// False after a network failed to load, until a valid one is set.
    net_ok: bool,
}

impl KestrelEngine {
    /// Creates the engine with the built-in network and default options.
    pub fn init(use_stdout: bool) -> Result<Self, TTAllocError> {
        let net = Arc::new(Network::internal());
        Ok(KestrelEngine {
            options: OptionsMap::new(),
            pool: ThreadPool::new(default_threads(), DEFAULT_TT_SIZE, net, use_stdout)?,
            board: Board::start_pos(),
            use_stdout,
            chess960: false,
            multi_pv: 1,
            move_overhead: DEFAULT_MOVE_OVERHEAD,
            net_ok: true,
        })
    }

    /// Reads commands until `quit` or the end of the input.
    pub fn uci_loop<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        for line in input.lines() {
            if !self.execute(&line?) {
                break;
            }
        }
        self.pool.stop();
        self.pool.wait_for_finish();
        Ok(())
    }

    /// Executes a single command. Returns false once the engine should quit.
    pub fn execute(&mut self, line: &str) -> bool {
        let args: Vec<&str> = line.split_whitespace().collect();
        let command: &str = args.first().copied().unwrap_or("");
        let rest = if args.is_empty() { &args[..] } else { &args[1..] };
        log::trace!("command: {}", line);

        // These wait for the pool, which an unbounded search would never hand back.
        if matches!(command, "go" | "ucinewgame" | "eval" | "bench") && self.pool.is_searching() {
            log::warn!("{} received during a search, stopping it first", command);
            self.say("info string stopping the running search");
            self.pool.stop();
            self.pool.wait_for_finish();
        }

        let outcome = match command {
            "" => Ok(()),
            "uci" => {
                self.uci_startup();
                Ok(())
            }
            "isready" => {
                self.say("readyok");
                Ok(())
            }
            "setoption" => self.set_option(rest),
            "ucinewgame" => {
                self.pool.clear_all();
                Ok(())
            }
            "position" => parse::position_parse_board(rest, self.chess960).map(|b| self.board = b),
            "go" => {
                self.go(rest);
                Ok(())
            }
            "stop" => {
                self.pool.stop();
                Ok(())
            }
            "ponderhit" => {
                self.pool.ponderhit();
                Ok(())
            }
            "quit" => {
                self.pool.stop();
                self.pool.wait_for_finish();
                return false;
            }
            "d" => {
                self.say(&self.board.pretty_string());
                Ok(())
            }
            "eval" => {
                let v = self.pool.static_eval(&self.board);
                self.say(&format!("info string static eval {} cp (white side)", to_centipawns(v)));
                Ok(())
            }
            "bench" => match rest.first() {
                Some(d) => d
                    .parse::<u16>()
                    .map_err(|_| UciError::BadArgument("bench".to_string()))
                    .map(|d| self.print_bench(d)),
                None => {
                    self.print_bench(DEFAULT_BENCH_DEPTH);
                    Ok(())
                }
            },
            "perft" => rest
                .first()
                .and_then(|d| d.parse::<u16>().ok())
                .ok_or_else(|| UciError::BadArgument("perft".to_string()))
                .map(|d| self.print_perft(d)),
            other => Err(UciError::UnknownCommand(other.to_string())),
        };

        if let Err(e) = outcome {
            self.report(&e);
        }
        true
    }

    fn say(&self, msg: &str) {
        if self.use_stdout {
            println!("{}", msg);
        }
    }

    /// Renders a recoverable error to the GUI.
    fn report(&self, e: &UciError) {
        log::warn!("{}", e);
        self.say(&format!("info string {}", e));
    }

    fn uci_startup(&self) {
        if !self.use_stdout {
            return;
        }
        println!("id name {} {}", ID_NAME, VERSION);
        println!("id author {}", ID_AUTHORS);
        self.options.display_all();
        println!("uciok");
    }

    fn go(&mut self, args: &[&str]) {
        if !self.net_ok {
            self.say("info string no usable network loaded, set EvalFile first");
            self.say("bestmove 0000");
            return;
        }
        let limits = parse::parse_time(args);
        self.pool
            .start_thinking(&self.board, &limits, self.multi_pv, self.move_overhead);
    }

    fn set_option(&mut self, args: &[&str]) -> Result<(), UciError> {
        let (name, value) = parse::setoption_name_value(args)?;
        self.options.apply_option(&name, &value)?;
        self.apply_all_options();
        Ok(())
    }

    fn apply_all_options(&mut self) {
        while let Some(work) = self.options.work() {
            if self.pool.is_searching() && !work.usable_while_searching() {
                self.say("info string unable to apply option while searching");
                log::warn!("dropped option while searching: {:?}", work);
                continue;
            }
            match work {
                OptionWork::ClearTT => self.pool.clear_tt(),
                OptionWork::ResizeTT(mb) => {
                    if let Err(e) = self.pool.resize_tt(mb) {
                        log::warn!("{}, keeping the current table", e);
                        self.say(&format!("info string {}, keeping the current table", e));
                    }
                }
                OptionWork::Threads(num) => self.pool.set_thread_count(num),
                OptionWork::MoveOverhead(ms) => self.move_overhead = ms,
                OptionWork::MultiPV(n) => self.multi_pv = n,
                OptionWork::Ponder(_) => {}
                OptionWork::Chess960(c) => self.chess960 = c,
                OptionWork::EvalFile(path) => self.load_network(&path),
                OptionWork::SyzygyPath(path) => {
                    log::info!("tablebases are not supported, ignoring SyzygyPath {}", path)
                }
                OptionWork::Tune(name, value) => {
                    let mut params = *self.pool.params();
                    if params.set(name, value) {
                        self.pool.set_params(params);
                    }
                }
            }
        }
    }

    fn load_network(&mut self, path: &str) {
        let net = if path == INTERNAL_NAME {
            Ok(Network::internal())
        } else {
            Network::load(path)
        };
        match net {
            Ok(net) => {
                log::info!("loaded network {}", path);
                self.say(&format!("info string loaded network {}", path));
                self.pool.set_network(Arc::new(net));
                self.net_ok = true;
            }
            Err(e) => {
                log::warn!("failed to load network {}: {}", path, e);
                self.say(&format!("info string failed to load network {}: {}", path, e));
                self.net_ok = false;
            }
        }
    }

    /// Searches every bench position to `depth` from a cleared state. Returns the total node
    /// count and the time taken in milliseconds.
    pub fn bench(&mut self, depth: u16) -> (u64, u64) {
        let shared = Arc::clone(self.pool.shared());
        shared.set_use_stdout(false);
        self.pool.clear_all();

        let start = Instant::now();
        let mut nodes = 0;
        for fen in BENCH_FENS.iter() {
            let board = match Board::from_fen(fen, false) {
                Ok(b) => b,
                Err(e) => {
                    log::error!("bad bench position {}: {}", fen, e);
                    continue;
                }
            };
            if let Some(result) = self.pool.search(&board, &PreLimits::depth(depth)) {
                nodes += result.nodes;
            }
        }
        let elapsed = start.elapsed().as_millis() as u64;

        shared.set_use_stdout(self.use_stdout);
        (nodes, elapsed)
    }

    fn print_bench(&mut self, depth: u16) {
        let (nodes, elapsed) = self.bench(depth);
        let nps = nodes * 1000 / (elapsed + 1);
        println!("{} nodes {} nps", nodes, nps);
    }

    fn print_perft(&self, depth: u16) {
        let start = Instant::now();
        let split = perft::divide(&self.board, depth);
        let mut total = 0;
        for (mv, n) in split.iter() {
            println!("{}: {}", mv.stringify(self.chess960), n);
            total += n;
        }
        let elapsed = start.elapsed().as_millis() as u64;
        println!("\nNodes searched: {} in {} ms", total, elapsed);
    }

    /// Blocks until the running search, if any, has finished.
    pub fn await_search(&self) {
        self.pool.wait_for_finish();
    }

    pub fn is_searching(&self) -> bool {
        self.pool.is_searching()
    }

    /// The result of the last finished search.
    pub fn last_result(&self) -> Option<SearchResult> {
        self.pool.last_result()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hashfull(&self) -> u16 {
        self.pool.tt().hashfull()
    }
}
