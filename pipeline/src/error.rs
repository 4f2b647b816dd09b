//! Error taxonomy for the pipeline crate (spec §7).
//!
//! Lex/parse/move errors are diagnostics the driver logs and recovers from;
//! they are still typed `Result` errors at the component boundary so callers
//! choose how to react (keep-broken-games vs discard), rather than the
//! component silently deciding.

use thiserror::Error;

use board::san::SanError;

/// Errors raised while tokenising raw PGN bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("line {line}: unterminated string")]
    UnterminatedString { line: u32 },
    #[error("line {line}: unterminated comment")]
    UnterminatedComment { line: u32 },
    #[error("line {line}: stray token '{found}'")]
    StrayToken { line: u32, found: String },
}

/// Errors raised while building a [`crate::game::Game`] from the token
/// stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected tag value")]
    MissingTagValue { line: u32 },
    #[error("line {line}: missing ')' closing variation")]
    MissingVariationClose { line: u32 },
    #[error("line {line}: missing terminating result")]
    MissingResult { line: u32 },
    #[error("line {line}: stray '{found}'")]
    Stray { line: u32, found: String },
    #[error("line {line}: null move not allowed at this depth")]
    NullMoveNotAllowed { line: u32 },
    #[error("line {line}: Result tag '{tag}' inconsistent with terminating result '{terminator}'")]
    InconsistentResult {
        line: u32,
        tag: String,
        terminator: String,
    },
}

/// Errors raised while legalising a SAN token against the running position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("ply {ply}: {source}")]
    San { ply: u32, source: SanError },
    #[error("ply {ply}: castling rights violated")]
    IllegalCastle { ply: u32 },
}

impl MoveError {
    pub fn san(ply: u32, source: SanError) -> Self {
        MoveError::San { ply, source }
    }
}

/// Errors raised while evaluating match predicates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("invalid regular expression in tag rule: {0}")]
    InvalidTagRegex(String),
    #[error("malformed FEN pattern: {0}")]
    MalformedFenPattern(String),
    #[error("malformed material criteria: {0}")]
    MalformedMaterialCriteria(String),
}

/// Errors raised by the duplicate index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DuplicateIndexError {
    #[error("virtual (spill-to-disk) index I/O failure: {0}")]
    Io(String),
}
