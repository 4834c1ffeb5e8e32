use kestrel::board::fen::BENCH_FENS;
use kestrel::core::{CastleType, PieceType, Player};
use kestrel::{Board, FenBuildError, SQ};
use pretty_assertions::assert_eq;

#[test]
fn basic_fen() {
    let board = Board::from_fen("k6r/1p2b3/8/8/8/8/P4KPP/1B5R w - - 0 3", false).unwrap();
    assert_eq!(board.count_piece(Player::White, PieceType::P), 3);
    assert_eq!(board.count_piece(Player::White, PieceType::N), 0);
    assert_eq!(board.count_piece(Player::White, PieceType::B), 1);
    assert_eq!(board.count_piece(Player::White, PieceType::R), 1);
    assert_eq!(board.count_piece(Player::White, PieceType::K), 1);
    assert_eq!(board.count_piece(Player::Black, PieceType::P), 1);
    assert_eq!(board.count_piece(Player::Black, PieceType::B), 1);
    assert_eq!(board.count_piece(Player::Black, PieceType::R), 1);
    assert_eq!(board.count_piece(Player::Black, PieceType::K), 1);
    assert_eq!(board.moves_played(), 4);

    let board = Board::from_fen("8/2Q1pk2/nbpppppp/8/8/2K4N/PPPPPPPP/BBB2BBB w - - 0 10", false).unwrap();
    assert_eq!(board.count_piece(Player::White, PieceType::P), 8);
    assert_eq!(board.count_piece(Player::White, PieceType::B), 6);
    assert_eq!(board.count_piece(Player::Black, PieceType::P), 7);
    assert_eq!(board.count_all_pieces(), 27);
}

#[test]
fn bench_fens_round_trip() {
    for fen in BENCH_FENS.iter() {
        let board = Board::from_fen(fen, false).unwrap();
        assert_eq!(*fen, board.fen());
    }
}

#[test]
fn counters_are_optional() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - -", false).unwrap();
    assert_eq!(board.fen(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
    assert_eq!(board.rule_50(), 0);
}

#[test]
fn chess960_castling_rooks() {
    // Kings on b1 / b8, castling rooks on a and h files.
    let fen = "rk5r/8/8/8/8/8/8/RK5R w HAha - 0 1";
    let board = Board::from_fen(fen, true).unwrap();
    assert!(board.is_chess960());
    assert_eq!(board.fen(), fen);
    assert_eq!(board.castling_rook_square(CastleType::KingSide), SQ::H1);
    assert_eq!(board.castling_rook_square(CastleType::QueenSide), SQ::A1);

    let moves: Vec<String> = board
        .generate_moves()
        .iter()
        .filter(|m| m.is_castle())
        .map(|m| m.stringify(true))
        .collect();
    assert_eq!(moves.len(), 2);
    assert!(moves.contains(&"b1h1".to_string()));
    assert!(moves.contains(&"b1a1".to_string()));
}

#[test]
fn rejects_broken_fens() {
    assert_eq!(
        Board::from_fen("4k3/8/8/8/8/8/8/4K3", false).unwrap_err(),
        FenBuildError::NotEnoughSections { sections: 1 }
    );
    assert_eq!(
        Board::from_fen("4k3/8/8/8/8/8/4K3 w - - 0 1", false).unwrap_err(),
        FenBuildError::IncorrectRankAmounts { ranks: 7 }
    );
    assert!(matches!(
        Board::from_fen("4k3/8/8/8/8/8/8/4K3X w - - 0 1", false),
        Err(FenBuildError::UnrecognizedPiece { piece: 'X' })
    ));
    assert!(matches!(
        Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - z9 0 1", false),
        Err(FenBuildError::EPSquareUnreadable { .. })
    ));
    assert!(matches!(
        Board::from_fen("4k3/pppppppp/p7/8/8/8/8/4K3 w - - 0 1", false),
        Err(FenBuildError::TooManyPawns { .. })
    ));
    assert!(matches!(
        Board::from_fen("4kk2/8/8/8/8/8/8/4K3 w - - 0 1", false),
        Err(FenBuildError::KingCount { .. })
    ));
}
