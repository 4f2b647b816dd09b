/*
 * san.rs
 * Part of the byte-knight project
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * Copyright (c) 2024 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 */

//! Standard Algebraic Notation decoding and encoding.
//!
//! [`decode_san`] resolves a SAN token (as produced by a PGN lexer, stripped
//! of leading move numbers) against a [`Board`] by generating the board's
//! legal moves and narrowing them down using the piece letter, disambiguation
//! and destination square embedded in the token. This mirrors how the spec's
//! applier is required to legalise a move: geometric/piece candidates are
//! already limited to legal moves by the move generator, so disambiguation
//! only has to pick among those.

use std::fmt::Display;

use thiserror::Error;

use crate::board::Board;
use crate::file::File;
use crate::move_generation::MoveGenerator;
use crate::move_list::MoveList;
use crate::moves::Move;
use crate::pieces::{PIECE_SHORT_NAMES, Piece, SQUARE_NAME};
use crate::rank::Rank;
use crate::side::Side;
use crate::square::Square;

/// Errors produced while resolving a SAN token against a position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    /// The token did not parse as any recognised move shape.
    #[error("unrecognised move text: {0}")]
    UnrecognisedToken(String),
    /// No legal move matches the token; either illegal or malformed.
    #[error("no legal move matches '{0}'")]
    AmbiguousOrIllegal(String),
    /// More than one legal move matches the token; the SAN is genuinely
    /// ambiguous, which the spec treats as a data error, never silently
    /// resolved.
    #[error("'{0}' is ambiguous; {1} legal moves match")]
    Ambiguous(String, usize),
    /// A promotion suffix named a piece that cannot be promoted to.
    #[error("invalid promotion piece '{0}'")]
    InvalidPromotionPiece(char),
    /// Null move syntax was seen where the caller doesn't allow it.
    #[error("null moves are not allowed here")]
    NullMoveNotAllowed,
}

/// Check/mate status produced by applying a decoded move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    None,
    Check,
    Checkmate,
}

/// The outcome of successfully decoding and applying a SAN token.
#[derive(Debug, Clone)]
pub struct AppliedSan {
    pub mv: Move,
    pub board: Board,
    pub check_status: CheckStatus,
}

/// `--` and `Z0` are the two SAN spellings this lexer/parser pair recognises
/// for a null move (the spec's "null move" move class).
fn is_null_move_token(token: &str) -> bool {
    token == "--" || token == "Z0"
}

/// Strip trailing check/mate glyphs, returning the bare token and whatever
/// glyph was found (so callers can cross-check against the actually computed
/// status, rather than trust the producer).
fn strip_check_glyph(token: &str) -> (&str, Option<CheckStatus>) {
    if let Some(stripped) = token.strip_suffix('#') {
        (stripped, Some(CheckStatus::Checkmate))
    } else if let Some(stripped) = token.strip_suffix('+') {
        (stripped, Some(CheckStatus::Check))
    } else {
        (token, None)
    }
}

fn piece_from_letter(c: char) -> Option<Piece> {
    match c {
        'K' => Some(Piece::King),
        'Q' => Some(Piece::Queen),
        'R' => Some(Piece::Rook),
        'B' => Some(Piece::Bishop),
        'N' => Some(Piece::Knight),
        _ => None,
    }
}

fn promotion_piece_from_letter(c: char) -> Result<Piece, SanError> {
    match c.to_ascii_uppercase() {
        'Q' => Ok(Piece::Queen),
        'R' => Ok(Piece::Rook),
        'B' => Ok(Piece::Bishop),
        'N' => Ok(Piece::Knight),
        other => Err(SanError::InvalidPromotionPiece(other)),
    }
}

/// Parsed shape of a non-castling, non-null SAN token.
struct ParsedSan {
    piece: Piece,
    disambiguation_file: Option<File>,
    disambiguation_rank: Option<Rank>,
    dest: Square,
    promotion: Option<Piece>,
}

fn parse_square(bytes: &[u8]) -> Option<Square> {
    if bytes.len() != 2 {
        return None;
    }
    let file = File::try_from(bytes[0] as char).ok()?;
    let rank = Rank::try_from(bytes[1].checked_sub(b'1')?).ok()?;
    Some(Square::new(file, rank))
}

fn parse_move_shape(token: &str) -> Result<ParsedSan, SanError> {
    // Split off an explicit promotion suffix: `=Q`, or the occasional bare
    // `Q` some producers emit instead (e.g. `e8Q`).
    let (body, promotion) = if let Some(eq_pos) = token.find('=') {
        let piece_char = token[eq_pos + 1..].chars().next().ok_or_else(|| {
            SanError::UnrecognisedToken(token.to_string())
        })?;
        (&token[..eq_pos], Some(promotion_piece_from_letter(piece_char)?))
    } else {
        (token, None)
    };

    let mut chars: Vec<char> = body.chars().collect();
    // drop a literal 'x'/':' capture marker; candidates are resolved purely
    // by destination square and disambiguation, so the marker is informational.
    chars.retain(|c| *c != 'x' && *c != ':');

    let (piece, rest): (Piece, Vec<char>) = if let Some(p) = piece_from_letter(chars[0]) {
        (p, chars[1..].to_vec())
    } else {
        (Piece::Pawn, chars)
    };

    if rest.len() < 2 {
        return Err(SanError::UnrecognisedToken(token.to_string()));
    }

    let dest_bytes: Vec<u8> = rest[rest.len() - 2..].iter().map(|c| *c as u8).collect();
    let dest = parse_square(&dest_bytes).ok_or_else(|| SanError::UnrecognisedToken(token.to_string()))?;

    let disambig = &rest[..rest.len() - 2];
    let mut disambiguation_file = None;
    let mut disambiguation_rank = None;
    for c in disambig {
        if let Ok(f) = File::try_from(*c) {
            disambiguation_file = Some(f);
        } else if c.is_ascii_digit() {
            if let Some(r) = c.to_digit(10).and_then(|d| Rank::try_from((d as u8).wrapping_sub(1)).ok()) {
                disambiguation_rank = Some(r);
            }
        }
    }

    // A pawn capture's leading letter (`exd5`) is a source file, not a piece
    // letter, and was absorbed above as disambiguation only when a second
    // file-like character preceded the destination; `e4` (no disambiguation)
    // correctly leaves both `None`.

    Ok(ParsedSan {
        piece,
        disambiguation_file,
        disambiguation_rank,
        dest,
        promotion,
    })
}

fn is_kingside_castle(token: &str) -> bool {
    matches!(token, "O-O" | "0-0" | "o-o")
}

fn is_queenside_castle(token: &str) -> bool {
    matches!(token, "O-O-O" | "0-0-0" | "o-o-o")
}

/// Resolve a SAN token against `board`'s legal moves.
///
/// `allow_null` controls whether `--`/`Z0` is accepted; the spec restricts
/// null moves to variations unless the caller explicitly opts in for the
/// main line.
pub fn decode_san(board: &Board, move_gen: &MoveGenerator, raw_token: &str, allow_null: bool) -> Result<Move, SanError> {
    let (token, _glyph) = strip_check_glyph(raw_token.trim());

    if is_null_move_token(token) {
        if !allow_null {
            return Err(SanError::NullMoveNotAllowed);
        }
        return Ok(Move::default());
    }

    let mut legal = MoveList::new();
    move_gen.generate_legal_moves(board, &mut legal);

    if is_kingside_castle(token) || is_queenside_castle(token) {
        let kingside = is_kingside_castle(token);
        let candidates: Vec<Move> = legal
            .iter()
            .filter(|mv| mv.is_castle())
            .filter(|mv| {
                let to_file = File::of(mv.to());
                if kingside {
                    to_file == File::G
                } else {
                    to_file == File::C
                }
            })
            .copied()
            .collect();
        return select_unique(token, candidates);
    }

    let parsed = parse_move_shape(token)?;
    let dest_index = parsed.dest.to_square_index();

    let candidates: Vec<Move> = legal
        .iter()
        .filter(|mv| mv.piece() == parsed.piece)
        .filter(|mv| mv.to() == dest_index)
        .filter(|mv| {
            parsed
                .disambiguation_file
                .map_or(true, |f| File::of(mv.from()) == f)
        })
        .filter(|mv| {
            parsed.disambiguation_rank.map_or(true, |r| {
                Rank::try_from(mv.from() / 8).map(|mr| mr == r).unwrap_or(false)
            })
        })
        .filter(|mv| match parsed.promotion {
            Some(p) => mv.promotion_piece() == Some(p),
            None => !mv.is_promotion(),
        })
        .copied()
        .collect();

    select_unique(token, candidates)
}

fn select_unique(token: &str, candidates: Vec<Move>) -> Result<Move, SanError> {
    match candidates.len() {
        0 => Err(SanError::AmbiguousOrIllegal(token.to_string())),
        1 => Ok(candidates[0]),
        n => Err(SanError::Ambiguous(token.to_string(), n)),
    }
}

/// Decode and apply `raw_token` against `board`, returning the successor
/// board and the resulting check/mate status (computed, not trusted from the
/// SAN's own glyph).
pub fn decode_and_apply(
    board: &Board,
    move_gen: &MoveGenerator,
    raw_token: &str,
    allow_null: bool,
) -> Result<AppliedSan, SanError> {
    let mv = decode_san(board, move_gen, raw_token, allow_null)?;
    let mut next = board.clone();

    if mv.is_null_move() {
        next.null_move();
        return Ok(AppliedSan {
            mv,
            board: next,
            check_status: CheckStatus::None,
        });
    }

    next.make_move(&mv, move_gen)
        .map_err(|_| SanError::AmbiguousOrIllegal(raw_token.to_string()))?;

    let in_check = next.is_in_check(move_gen);
    let check_status = if in_check {
        if next.is_checkmate(move_gen) {
            CheckStatus::Checkmate
        } else {
            CheckStatus::Check
        }
    } else {
        CheckStatus::None
    };

    Ok(AppliedSan {
        mv,
        board: next,
        check_status,
    })
}

/// Encode `mv` as SAN relative to `board` (the position the move is played
/// from), adding disambiguation only when other legal moves share the same
/// piece and destination, and appending `+`/`#` based on the successor
/// position.
pub fn encode_san(mv: &Move, board: &Board, move_gen: &MoveGenerator) -> String {
    if mv.is_null_move() {
        return "--".to_string();
    }

    if mv.is_castle() {
        let to_file = File::of(mv.to());
        let base = if to_file == File::G { "O-O" } else { "O-O-O" };
        return format!("{}{}", base, suffix_for(mv, board, move_gen));
    }

    let mut legal = MoveList::new();
    move_gen.generate_legal_moves(board, &mut legal);

    let mut text = String::new();

    if mv.piece() != Piece::Pawn {
        text.push(PIECE_SHORT_NAMES[mv.piece() as usize]);

        let same_piece_same_dest: Vec<&Move> = legal
            .iter()
            .filter(|other| {
                **other != *mv && other.piece() == mv.piece() && other.to() == mv.to()
            })
            .collect();

        if !same_piece_same_dest.is_empty() {
            let file_unique = !same_piece_same_dest
                .iter()
                .any(|other| File::of(other.from()) == File::of(mv.from()));
            if file_unique {
                text.push(File::of(mv.from()).to_char());
            } else {
                let rank_unique = !same_piece_same_dest
                    .iter()
                    .any(|other| other.from() / 8 == mv.from() / 8);
                if rank_unique {
                    text.push((b'1' + mv.from() / 8) as char);
                } else {
                    text.push(File::of(mv.from()).to_char());
                    text.push((b'1' + mv.from() / 8) as char);
                }
            }
        }
        if mv.is_capture() {
            text.push('x');
        }
        text.push_str(SQUARE_NAME[mv.to() as usize]);
    } else {
        if mv.is_capture() {
            text.push(File::of(mv.from()).to_char());
            text.push('x');
        }
        text.push_str(SQUARE_NAME[mv.to() as usize]);
        if let Some(promo) = mv.promotion_piece() {
            text.push('=');
            text.push(PIECE_SHORT_NAMES[promo as usize]);
        }
    }

    text.push_str(&suffix_for(mv, board, move_gen));
    text
}

fn suffix_for(mv: &Move, board: &Board, move_gen: &MoveGenerator) -> String {
    let mut next = board.clone();
    let applied = if mv.is_null_move() {
        next.null_move();
        false
    } else {
        next.make_move(mv, move_gen).is_ok()
    };
    if !applied {
        return String::new();
    }
    if next.is_in_check(move_gen) {
        if next.is_checkmate(move_gen) {
            "#".to_string()
        } else {
            "+".to_string()
        }
    } else {
        String::new()
    }
}

impl Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::None => write!(f, "none"),
            CheckStatus::Check => write!(f, "check"),
            CheckStatus::Checkmate => write!(f, "checkmate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::move_generation::MoveGenerator;

    #[test]
    fn decodes_simple_pawn_push() {
        let board = Board::default_board();
        let move_gen = MoveGenerator::new();
        let mv = decode_san(&board, &move_gen, "e4", false).unwrap();
        assert_eq!(mv.piece(), Piece::Pawn);
        assert_eq!(mv.to(), Square::new(File::E, Rank::R4).to_square_index());
    }

    #[test]
    fn decodes_castling_and_disambiguates_knight_capture() {
        let board = Board::from_fen(
            "r1b1k2r/pppp1ppp/2n2n2/4p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 5",
        )
        .unwrap();
        let move_gen = MoveGenerator::new();
        let applied = decode_and_apply(&board, &move_gen, "O-O", false).unwrap();
        assert!(applied.mv.is_castle());
        assert_eq!(applied.check_status, CheckStatus::None);

        let applied2 = decode_and_apply(&applied.board, &move_gen, "Nxe4", false).unwrap();
        assert_eq!(applied2.mv.piece(), Piece::Knight);
        assert!(applied2.mv.is_capture());
    }

    #[test]
    fn ambiguous_san_is_rejected() {
        // Rooks on b2 and e2 can both reach d2; "Rd2" alone is ambiguous.
        let board = Board::from_fen("4k3/8/8/8/8/8/1R2R3/4K3 w - - 0 1").unwrap();
        let move_gen = MoveGenerator::new();
        assert!(matches!(
            decode_san(&board, &move_gen, "Rd2", false),
            Err(SanError::Ambiguous(_, 2))
        ));
        assert!(decode_san(&board, &move_gen, "Rbd2", false).is_ok());
        assert!(decode_san(&board, &move_gen, "Red2", false).is_ok());
    }

    #[test]
    fn unrecognised_token_errors() {
        let board = Board::default_board();
        let move_gen = MoveGenerator::new();
        assert!(decode_san(&board, &move_gen, "???", false).is_err());
    }

    #[test]
    fn null_move_requires_opt_in() {
        let board = Board::default_board();
        let move_gen = MoveGenerator::new();
        assert!(matches!(
            decode_san(&board, &move_gen, "--", false),
            Err(SanError::NullMoveNotAllowed)
        ));
        assert!(decode_san(&board, &move_gen, "--", true).is_ok());
    }

    #[test]
    fn encode_round_trips_through_decode() {
        let board = Board::default_board();
        let move_gen = MoveGenerator::new();
        let mv = decode_san(&board, &move_gen, "Nf3", false).unwrap();
        let text = encode_san(&mv, &board, &move_gen);
        assert_eq!(text, "Nf3");
    }
}
