//! Game-level move application (spec §4.1): walks a parsed [`Game`]'s main
//! line through the board, SAN-decoding and legalising each ply, filling in
//! the per-move and per-game bookkeeping the match engine and duplicate
//! index depend on.
//!
//! Variations (RAVs) are replayed only far enough to resolve their own
//! moves for re-emission; they do not contribute to `position_counts`,
//! `final_hash` or `cumulative_checksum`, which track the main line only.

use board::board::Board;
use board::move_generation::MoveGenerator;
use board::san::{self, CheckStatus};

use crate::error::MoveError;
use crate::game::{Game, GameMove, Variation};

/// Receives the board after each main-line ply while it is still live, so
/// the match engine can test positional/FEN-pattern predicates mid-game
/// (spec §4.5: "positional and FEN-pattern matches can fire mid-game").
pub trait PositionObserver {
    fn observe(&mut self, board: &Board, ply: u32);
}

impl PositionObserver for () {
    fn observe(&mut self, _board: &Board, _ply: u32) {}
}

/// Replay `game`'s main line from `start`, filling in each [`GameMove`]'s
/// resolved move, check status and post-move hash, and the game's
/// `position_counts`/`final_hash`/`cumulative_checksum`/`moves_ok`/
/// `error_ply`.
///
/// Returns the final board reached (the starting position if the game has
/// no moves, or the position just before the first illegal move).
pub fn apply_move_list(
    start: &Board,
    move_gen: &MoveGenerator,
    game: &mut Game,
    allow_null_in_main_line: bool,
    mut observer: impl PositionObserver,
) -> Board {
    let mut board = start.clone();
    game.moves_checked = true;
    game.moves_ok = true;
    game.error_ply = None;

    for (ply_index, game_move) in game.moves.iter_mut().enumerate() {
        let ply = ply_index as u32 + 1;
        match san::decode_and_apply(&board, move_gen, &game_move.san, allow_null_in_main_line) {
            Ok(applied) => {
                board = applied.board;
                game_move.mv = Some(applied.mv);
                game_move.check_status = applied.check_status;
                game_move.zobrist_after = board.zobrist_hash();
                *game.position_counts.entry(board.zobrist_hash()).or_insert(0) += 1;
                observer.observe(&board, ply);
            }
            Err(source) => {
                game.moves_ok = false;
                game.error_ply = Some(ply);
                game.diagnostics
                    .push(MoveError::san(ply, source).to_string());
                break;
            }
        }
    }

    resolve_variations(&mut game.moves, start, move_gen);

    game.final_hash = board.zobrist_hash();
    game.cumulative_checksum = board.cumulative_checksum();
    board
}

/// Resolve each RAV's own moves against the position the variation departs
/// from (the board as of the *preceding* move, not the move it replaces),
/// purely so the renderer has a legalised move and check status to print.
/// Failure inside a variation does not affect `moves_ok` for the main line.
fn resolve_variations(moves: &mut [GameMove], start: &Board, move_gen: &MoveGenerator) {
    let mut board = start.clone();
    for game_move in moves.iter_mut() {
        let before = board.clone();
        match san::decode_and_apply(&board, move_gen, &game_move.san, true) {
            Ok(applied) => {
                if game_move.mv.is_none() {
                    game_move.mv = Some(applied.mv);
                    game_move.check_status = applied.check_status;
                    game_move.zobrist_after = applied.board.zobrist_hash();
                }
                board = applied.board;
            }
            Err(_) => break,
        }
        for variation in &mut game_move.variations {
            resolve_variation(variation, &before, move_gen);
        }
    }
}

fn resolve_variation(variation: &mut Variation, before: &Board, move_gen: &MoveGenerator) {
    resolve_variations(&mut variation.moves, before, move_gen);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Parser, ParserConfig};

    fn parse(src: &str) -> Game {
        let mut parser = Parser::new(src.as_bytes(), ParserConfig::default()).unwrap();
        parser.parse_game().unwrap().unwrap()
    }

    #[test]
    fn applies_main_line_and_fills_hashes() {
        let mut game = parse("[Result \"1-0\"]\n\n1. e4 e5 2. Nf3 Nc6 1-0\n");
        let move_gen = MoveGenerator::new();
        let board = apply_move_list(&Board::default_board(), &move_gen, &mut game, false, ());
        assert!(game.moves_ok);
        assert_eq!(game.final_hash, board.zobrist_hash());
        assert!(game.moves.iter().all(|m| m.mv.is_some()));
    }

    #[test]
    fn illegal_move_marks_error_ply_and_stops() {
        let move_gen = MoveGenerator::new();
        let mut broken = parse("[Result \"*\"]\n\n1. e4 e5 2. Qh9 *\n");
        apply_move_list(&Board::default_board(), &move_gen, &mut broken, false, ());
        assert!(!broken.moves_ok);
        assert_eq!(broken.error_ply, Some(3));
    }

    #[test]
    fn position_counts_track_repeats() {
        let mut game = parse(
            "[Result \"1/2-1/2\"]\n\n1. Nf3 Nf6 2. Ng1 Ng8 3. Nf3 Nf6 4. Ng1 Ng8 1/2-1/2\n",
        );
        let move_gen = MoveGenerator::new();
        let board = apply_move_list(&Board::default_board(), &move_gen, &mut game, false, ());
        assert_eq!(game.repetition_count(board.zobrist_hash()), 2);
    }
}
