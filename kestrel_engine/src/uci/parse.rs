//! Functions for parsing UCI input, including both time data & the position of the board to be searched.

use kestrel::Board;

use crate::time::{PreLimits, UCITimer};

use super::UciError;

fn is_keyword(arg: &str) -> bool {
    matches!(
        arg,
        "searchmoves"
            | "ponder"
            | "wtime"
            | "btime"
            | "winc"
            | "binc"
            | "movestogo"
            | "depth"
            | "nodes"
            | "softnodes"
            | "mate"
            | "movetime"
            | "infinite"
    )
}

fn value_of<T: std::str::FromStr>(args: &[&str], idx: usize) -> Option<T> {
    args.get(idx + 1).and_then(|s| s.parse::<T>().ok())
}

// when "go" is passed into stdin, followed by several time control parameters
// "searchmoves" "move"+
// "ponder"
// "wtime" "[msec]"
// "btime" "[msec]"
// "winc" "[msec]"
// "binc" "[msec]"
// "movestogo" "[u32]"
// "depth" "[u16]"
// "nodes" "[u64]"
// "softnodes" "[u64]", no new iteration once reached
// "mate" "[moves]"
// movetime "msec"
// "infinite"
pub fn parse_time(args: &[&str]) -> PreLimits {
    let mut token_idx: usize = 0;
    let mut limit = PreLimits::blank();
    let mut timer = UCITimer::blank();
    while let Some(token) = args.get(token_idx) {
        match *token {
            "infinite" => limit.infinite = true,
            "ponder" => limit.ponder = true,
            "wtime" => {
                if let Some(t) = value_of::<i64>(args, token_idx) {
                    timer.time_msec[0] = t;
                }
                token_idx += 1;
            }
            "btime" => {
                if let Some(t) = value_of::<i64>(args, token_idx) {
                    timer.time_msec[1] = t;
                }
                token_idx += 1;
            }
            "winc" => {
                if let Some(t) = value_of::<i64>(args, token_idx) {
                    timer.inc_msec[0] = t;
                }
                token_idx += 1;
            }
            "binc" => {
                if let Some(t) = value_of::<i64>(args, token_idx) {
                    timer.inc_msec[1] = t;
                }
                token_idx += 1;
            }
            "movestogo" => {
                if let Some(m) = value_of::<u32>(args, token_idx) {
                    timer.moves_to_go = m;
                }
                token_idx += 1;
            }
            "depth" => {
                limit.depth = value_of::<u16>(args, token_idx).or(limit.depth);
                token_idx += 1;
            }
            "nodes" => {
                limit.nodes = value_of::<u64>(args, token_idx).or(limit.nodes);
                token_idx += 1;
            }
            "softnodes" => {
                limit.soft_nodes = value_of::<u64>(args, token_idx).or(limit.soft_nodes);
                token_idx += 1;
            }
            "mate" => {
                limit.mate = value_of::<u16>(args, token_idx).or(limit.mate);
                token_idx += 1;
            }
            "movetime" => {
                limit.move_time = value_of::<u64>(args, token_idx).or(limit.move_time);
                token_idx += 1;
            }
            "searchmoves" => {
                while let Some(mov) = args.get(token_idx + 1) {
                    if is_keyword(mov) {
                        break;
                    }
                    limit.search_moves.push((*mov).to_string());
                    token_idx += 1;
                }
            }
            other => log::debug!("ignoring go argument '{}'", other),
        }
        token_idx += 1;
    }
    if !timer.is_blank() {
        limit.time = Some(timer);
    }
    limit
}

/// Parses the arguments of a `position` command. Fails on the first illegal move, leaving the
/// caller's position untouched.
pub fn position_parse_board(args: &[&str], chess960: bool) -> Result<Board, UciError> {
    let moves_idx = args.iter().position(|a| *a == "moves");
    let setup = &args[..moves_idx.unwrap_or(args.len())];

    let mut board = match setup.first() {
        Some(&"startpos") => Board::start_pos(),
        Some(&"fen") if setup.len() > 1 => Board::from_fen(&setup[1..].join(" "), chess960)?,
        _ => return Err(UciError::MalformedPosition),
    };

    if let Some(idx) = moves_idx {
        for mov in args[idx + 1..].iter() {
            if !board.apply_uci_move(mov) {
                return Err(UciError::IllegalMove((*mov).to_string()));
            }
        }
    }
    Ok(board)
}

/// Splits the arguments of `setoption` into the option's name and value.
pub fn setoption_name_value(args: &[&str]) -> Result<(String, String), UciError> {
    if args.first() != Some(&"name") {
        return Err(UciError::MalformedSetOption);
    }
    let value_idx = args.iter().position(|a| *a == "value");
    let name = args[1..value_idx.unwrap_or(args.len())].join(" ");
    if name.is_empty() {
        return Err(UciError::MalformedSetOption);
    }
    let value = value_idx
        .map(|i| args[i + 1..].join(" "))
        .unwrap_or_default();
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel::Player;
    use pretty_assertions::assert_eq;

    fn split(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn board_parse() {
        let args = split("position startpos moves e2e4 e7e5");
        let board = position_parse_board(&args[1..], false).unwrap();
        assert_eq!(board.moves_played(), 2);
        assert_eq!(board.turn(), Player::White);

        let args = split("position startpos");
        let board = position_parse_board(&args[1..], false).unwrap();
        assert_eq!(board.moves_played(), 0);

        let args = split("position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 0 1 moves e2e4");
        let board = position_parse_board(&args[1..], false).unwrap();
        assert_eq!(board.turn(), Player::Black);
    }

    #[test]
    fn board_parse_errors() {
        let args = split("position startpos moves e2e4 e2e4");
        assert_eq!(
            position_parse_board(&args[1..], false).err(),
            Some(UciError::IllegalMove("e2e4".to_string()))
        );
        let args = split("position fen 8/8/8 w - - 0 1");
        assert!(matches!(
            position_parse_board(&args[1..], false),
            Err(UciError::BadFen(_))
        ));
        let args = split("position somewhere");
        assert_eq!(
            position_parse_board(&args[1..], false).err(),
            Some(UciError::MalformedPosition)
        );
    }

    #[test]
    fn castling_moves() {
        let args = split("position startpos moves e2e4 d7d5 e4d5 d8d5 g1f3 d5e4 f1e2 c7c6 e1g1");
        let board = position_parse_board(&args[1..], false).unwrap();
        assert_eq!(board.moves_played(), 9);
    }

    #[test]
    fn time_parse() {
        let args = split("go infinite searchmoves e2e4 d2d4");
        let limits = parse_time(&args[1..]);
        assert!(limits.infinite);
        assert_eq!(limits.search_moves, vec!["e2e4".to_string(), "d2d4".to_string()]);

        let args = split("go wtime 1000 btime 2000 winc 10 binc 20 movestogo 5");
        let limits = parse_time(&args[1..]);
        assert_eq!(
            limits.time,
            Some(UCITimer {
                time_msec: [1000, 2000],
                inc_msec: [10, 20],
                moves_to_go: 5,
            })
        );

        let args = split("go depth 7 nodes 5000 movetime 300 mate 2 ponder");
        let limits = parse_time(&args[1..]);
        assert_eq!(limits.depth, Some(7));
        assert_eq!(limits.nodes, Some(5000));
        assert_eq!(limits.move_time, Some(300));
        assert_eq!(limits.mate, Some(2));
        assert!(limits.ponder);
        assert_eq!(limits.time, None);

        let args = split("go softnodes 20000 searchmoves e2e4 softnodes 30000");
        let limits = parse_time(&args[1..]);
        assert_eq!(limits.soft_nodes, Some(30000));
        assert_eq!(limits.search_moves, vec!["e2e4".to_string()]);
        assert_eq!(limits.nodes, None);
    }

    #[test]
    fn setoption_split() {
        let args = split("setoption name Clear Hash");
        assert_eq!(
            setoption_name_value(&args[1..]).unwrap(),
            ("Clear Hash".to_string(), String::new())
        );
        let args = split("setoption name EvalFile value my net.bin");
        assert_eq!(
            setoption_name_value(&args[1..]).unwrap(),
            ("EvalFile".to_string(), "my net.bin".to_string())
        );
        let args = split("setoption Hash 5");
        assert_eq!(setoption_name_value(&args[1..]), Err(UciError::MalformedSetOption));
    }
}
