extern crate kestrel;
extern crate kestrel_engine;

use std::io::Cursor;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use kestrel::Board;
use kestrel_engine::engine::KestrelEngine;

fn engine() -> KestrelEngine {
    let mut e = KestrelEngine::init(false).unwrap();
    assert!(e.execute("setoption name Threads value 2"));
    assert!(e.execute("setoption name Hash value 8"));
    e
}

fn best_move_after(e: &mut KestrelEngine, go: &str) -> String {
    e.execute(go);
    e.await_search();
    e.last_result().unwrap().best_move.to_string()
}

#[test]
fn game_of_short_searches() {
    let mut e = engine();
    e.execute("ucinewgame");
    let mut moves: Vec<String> = Vec::new();
    for _ in 0..6 {
        let position = format!("position startpos moves {}", moves.join(" "));
        e.execute(position.trim());
        assert_eq!(e.board().moves_played() as usize, moves.len());
        let mv = best_move_after(&mut e, "go wtime 2000 btime 2000 winc 20 binc 20");
        assert!(e.board().clone().apply_uci_move(&mv), "{} is illegal", mv);
        moves.push(mv);
    }
}

#[test]
fn stop_ends_an_infinite_search() {
    let mut e = engine();
    e.execute("position fen r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    e.execute("go infinite");
    thread::sleep(Duration::from_millis(100));
    assert!(e.is_searching());
    e.execute("isready");
    e.execute("stop");
    e.await_search();
    assert!(!e.is_searching());
    let result = e.last_result().unwrap();
    assert!(e.board().generate_moves().contains(result.best_move));
}

#[test]
fn new_commands_end_an_infinite_search() {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut e = engine();
        e.execute("position startpos");
        e.execute("go infinite");
        thread::sleep(Duration::from_millis(50));
        e.execute("go depth 1");
        e.await_search();
        let first = e.last_result().map(|r| r.best_move);
        e.execute("go infinite");
        thread::sleep(Duration::from_millis(50));
        e.execute("ucinewgame");
        let searching = e.is_searching();
        tx.send((e.board().clone(), first, searching)).unwrap();
    });

    let (board, first, searching) = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(board.generate_moves().contains(first.unwrap()));
    assert!(!searching);
}

#[test]
fn ponderhit_releases_a_finished_ponder_search() {
    let mut e = engine();
    e.execute("position startpos moves e2e4");
    e.execute("go ponder depth 3");
    thread::sleep(Duration::from_millis(100));
    // The depth is reached but a ponder search waits for the GUI.
    assert!(e.is_searching());
    e.execute("ponderhit");
    e.await_search();
    assert!(e.last_result().is_some());
}

#[test]
fn searchmoves_and_multipv() {
    let mut e = engine();
    e.execute("setoption name MultiPV value 3");
    e.execute("position startpos");
    let mv = best_move_after(&mut e, "go depth 5 searchmoves h2h3 h2h4");
    assert!(mv == "h2h3" || mv == "h2h4", "got {}", mv);
}

#[test]
fn options_are_refused_while_searching() {
    let mut e = engine();
    e.execute("position startpos");
    e.execute("go infinite");
    thread::sleep(Duration::from_millis(20));
    e.execute("setoption name Hash value 2");
    e.execute("stop");
    e.await_search();
    // The table keeps its size, so the search's entries are still there.
    assert!(e.hashfull() > 0);
}

#[test]
fn malformed_commands_are_ignored() {
    let mut e = engine();
    e.execute("position startpos moves e2e4 e7e5");
    let before = e.board().fen();
    for line in [
        "position",
        "position fen not/a/fen w - - 0 1",
        "position startpos moves e2e4 e2e4",
        "setoption Hash",
        "setoption name NoSuchOption value 3",
        "setoption name Threads value many",
        "perft",
        "bench deep",
        "xyzzy",
        "",
    ] {
        assert!(e.execute(line), "{} quit the engine", line);
        assert_eq!(e.board().fen(), before);
    }
}

#[test]
fn uci_loop_reads_until_quit() {
    let mut e = engine();
    let input = "position startpos moves d2d4\ngo depth 3\nisready\nquit\nposition startpos\n";
    e.uci_loop(Cursor::new(input)).unwrap();
    // Nothing after quit is executed.
    assert_eq!(e.board().moves_played(), 1);
    assert!(!e.is_searching());
}

#[test]
fn chess960_castling_notation() {
    let mut e = engine();
    e.execute("setoption name UCI_Chess960 value true");
    e.execute("position fen bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9");
    e.execute("go depth 4");
    e.await_search();
    let mv = e.last_result().unwrap().best_move.stringify(true);
    let mut board = Board::from_fen(
        "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9",
        true,
    )
    .unwrap();
    assert!(board.apply_uci_move(&mv), "{} is not a move in chess960 notation", mv);
}
