use board::board::Board;
use board::move_generation::MoveGenerator;
use board::san::{decode_san, encode_san};

#[test]
fn test_board_construction() {
    let board = Board::default_board();
    assert_eq!(board.all_pieces(), 0xFFFF_0000_0000_FFFF);
}

#[test]
fn construct_board_from_fen_string() {
    let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    assert_eq!(board.all_pieces(), 0xFFFF_0000_0000_FFFF);
}

#[test]
fn fen_round_trips_through_default_board() {
    let board = Board::default_board();
    let fen = board.to_fen();
    let reparsed = Board::from_fen(&fen).unwrap();
    assert_eq!(board.all_pieces(), reparsed.all_pieces());
    assert_eq!(board.cumulative_checksum(), reparsed.cumulative_checksum());
}

#[test]
fn san_decode_then_encode_round_trips_for_opening_move() {
    let board = Board::default_board();
    let move_gen = MoveGenerator::new();
    let mv = decode_san(&board, &move_gen, "e4", false).unwrap();
    assert_eq!(encode_san(&mv, &board, &move_gen), "e4");
}

#[test]
fn san_rejects_illegal_move() {
    let board = Board::default_board();
    let move_gen = MoveGenerator::new();
    assert!(decode_san(&board, &move_gen, "e5", false).is_err());
}
