//! The parsed PGN data model (spec §3): [`Game`], [`GameMove`], [`Variation`].
//!
//! A PGN "move" is richer than the engine-level [`board::moves::Move`] it
//! resolves to: it carries the raw SAN text, annotations, comments and
//! sub-variations. [`GameMove`] wraps the engine move and layers that PGN
//! metadata on top, following the spec's Move record in §3.

use std::collections::HashMap;

use board::san::CheckStatus;

use crate::tag::TagTable;

/// One annotated alternative line attached to the move it supersedes.
///
/// Spec §3: "Variations are attached to the move that *preceded* the
/// variation's first move."
#[derive(Debug, Clone, Default)]
pub struct Variation {
    pub prefix_comment: Option<String>,
    pub moves: Vec<GameMove>,
    pub suffix_comment: Option<String>,
    pub terminating_result: Option<String>,
}

/// A single ply as it appears in the PGN move text, plus the position it
/// resolves to.
#[derive(Debug, Clone)]
pub struct GameMove {
    /// The resolved engine move; `None` only while building/repairing a
    /// broken game whose move could not legalise.
    pub mv: Option<board::moves::Move>,
    pub san: String,
    pub check_status: CheckStatus,
    pub nags: Vec<u16>,
    pub comments: Vec<String>,
    pub variations: Vec<Variation>,
    /// Non-`None` only for the last move of a line or variation.
    pub terminating_result: Option<String>,
    pub zobrist_after: u64,
    /// Optional EPD/FEN-suffix annotations some renderers attach per move.
    pub epd: Option<String>,
}

impl GameMove {
    pub fn new(san: String) -> Self {
        Self {
            mv: None,
            san,
            check_status: CheckStatus::None,
            nags: Vec::new(),
            comments: Vec::new(),
            variations: Vec::new(),
            terminating_result: None,
            zobrist_after: 0,
            epd: None,
        }
    }

    pub fn is_null_move(&self) -> bool {
        self.san == "--" || self.san == "Z0"
    }
}

/// A fully parsed game: tags, move tree, and the bookkeeping the applier and
/// match engine fill in as they replay it.
#[derive(Debug, Clone)]
pub struct Game {
    pub tags: TagTable,
    pub prefix_comments: Vec<String>,
    pub moves: Vec<GameMove>,
    pub terminating_result: Option<String>,
    pub start_line: u32,
    pub end_line: u32,

    /// Zobrist hash occurrence counts along the main line, keyed by hash;
    /// used for threefold/fivefold repetition detection.
    pub position_counts: HashMap<u64, u32>,
    pub final_hash: u64,
    pub cumulative_checksum: u32,
    /// FEN of the position reached after the last successfully applied move,
    /// filled in by the applier/driver once replay completes; used by the
    /// EPD/FEN output sinks so they don't need to replay the game a second
    /// time.
    pub final_fen: String,

    pub moves_checked: bool,
    pub moves_ok: bool,
    pub error_ply: Option<u32>,
    /// Set when a diagnostic was recovered from (unterminated string, stray
    /// token, missing result, ...) rather than raised as a hard error.
    pub diagnostics: Vec<String>,
}

impl Game {
    pub fn new() -> Self {
        Self {
            tags: TagTable::new(),
            prefix_comments: Vec::new(),
            moves: Vec::new(),
            terminating_result: None,
            start_line: 0,
            end_line: 0,
            position_counts: HashMap::new(),
            final_hash: 0,
            cumulative_checksum: 0,
            final_fen: String::new(),
            moves_checked: false,
            moves_ok: true,
            error_ply: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    pub fn move_number_count(&self) -> usize {
        self.ply_count().div_ceil(2)
    }

    pub fn has_any_comment(&self) -> bool {
        !self.prefix_comments.is_empty()
            || self
                .moves
                .iter()
                .any(|m| !m.comments.is_empty() || m.variations.iter().any(has_variation_comment))
    }

    /// Number of half-moves at which `hash` last reached `count` occurrences,
    /// or `None` if it never did.
    pub fn repetition_count(&self, hash: u64) -> u32 {
        self.position_counts.get(&hash).copied().unwrap_or(0)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn has_variation_comment(v: &Variation) -> bool {
    v.prefix_comment.is_some()
        || v.suffix_comment.is_some()
        || v.moves.iter().any(|m| !m.comments.is_empty())
}
