use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env, Target};

use kestrel_engine::engine::{KestrelEngine, DEFAULT_BENCH_DEPTH};

#[derive(Parser, Debug)]
#[command(author, version, about = "Kestrel, a UCI chess engine", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Searches a fixed set of positions single threaded and reports nodes and speed
    Bench {
        #[arg(value_name = "DEPTH", default_value_t = DEFAULT_BENCH_DEPTH)]
        depth: u16,
    },
    /// Counts the leaf nodes of the move tree, split by root move
    Perft {
        #[arg(value_name = "DEPTH")]
        depth: u16,
        /// FEN string or "startpos"
        #[arg(value_name = "FEN", default_value = "startpos")]
        fen: String,
    },
}

fn main() -> Result<()> {
    // stdout belongs to the UCI protocol.
    Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .init();
    let args = Args::parse();

    let mut engine = KestrelEngine::init(true)?;
    match args.command {
        None => engine.uci_loop(io::stdin().lock())?,
        Some(Command::Bench { depth }) => {
            engine.execute("setoption name Threads value 1");
            engine.execute(&format!("bench {}", depth));
        }
        Some(Command::Perft { depth, fen }) => {
            let position = if fen == "startpos" {
                "position startpos".to_string()
            } else {
                kestrel::Board::from_fen(&fen, false)?;
                format!("position fen {}", fen)
            };
            engine.execute(&position);
            engine.execute(&format!("perft {}", depth));
        }
    }
    Ok(())
}
