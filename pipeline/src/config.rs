//! Immutable-after-construction run configuration (spec §9 DESIGN NOTES:
//! "consolidate into two records: an immutable-after-setup `Config` and a
//! per-run `Engine`"). Built once by the CLI layer, then shared by
//! reference into every pipeline component; nothing in `pipeline` mutates
//! it after [`Config::new`] returns.

use std::path::PathBuf;

use crate::duplicate_index::DuplicateIndexConfig;
use crate::game_number_range::GameNumberRange;
use crate::lexer::LexerConfig;
use crate::match_engine::MatchCriteria;
use crate::parser::ParserConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    KeepAll,
    SuppressDuplicates,
    SuppressOriginals,
}

/// PGN/EPD/FEN/long-algebraic/JSON/TSV output selection (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pgn,
    Epd,
    Fen,
    /// Long algebraic, e.g. `e2e4`.
    Lalg,
    /// Hyphenated long algebraic, e.g. `e2-e4`.
    Halg,
    /// "Extended" long algebraic with piece letters, e.g. `Pe2e4`.
    Elalg,
    /// Extended long algebraic plus check/mate glyphs.
    Xlalg,
    /// Extended long algebraic, O-O castling spelling.
    Xolalg,
    Uci,
    ChessMaster,
    Json,
    Tsv,
}

impl OutputFormat {
    /// JSON disables comment/variation/result preservation; TSV removes
    /// line-wrapping (spec §6).
    pub fn preserves_comments_and_variations(&self) -> bool {
        !matches!(self, OutputFormat::Json)
    }

    pub fn wraps_lines(&self) -> bool {
        !matches!(self, OutputFormat::Tsv | OutputFormat::Json)
    }
}

/// Driver-level limits (spec §4.7/§5).
#[derive(Debug, Clone, Default)]
pub struct DriverLimits {
    pub first_game_number: u32,
    pub game_limit: Option<u32>,
    pub maximum_matches: Option<u32>,
    pub matching_game_numbers: GameNumberRange,
    pub skip_game_numbers: GameNumberRange,
    pub games_per_file: Option<u32>,
    pub split_by_eco: bool,
}

/// The full run configuration: one value built from CLI arguments, shared
/// immutably by every component for the life of the run.
#[derive(Debug, Clone)]
pub struct Config {
    pub lexer: LexerConfig,
    pub parser: ParserConfig,
    pub criteria: MatchCriteria,
    pub duplicate_index: DuplicateIndexConfig,
    pub duplicate_policy: DuplicatePolicy,
    pub fuzzy_match_depth: Option<u32>,
    pub limits: DriverLimits,
    pub output_format: OutputFormat,
    pub max_line_length: u32,
    pub quiet: bool,
    pub input_files: Vec<PathBuf>,
    pub eco_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lexer: LexerConfig::default(),
            parser: ParserConfig::default(),
            criteria: MatchCriteria::default(),
            duplicate_index: DuplicateIndexConfig::default(),
            duplicate_policy: DuplicatePolicy::default(),
            fuzzy_match_depth: None,
            limits: DriverLimits::default(),
            output_format: OutputFormat::default(),
            max_line_length: 75,
            quiet: false,
            input_files: Vec::new(),
            eco_file: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_format_wraps_and_preserves() {
        let format = OutputFormat::default();
        assert!(format.wraps_lines());
        assert!(format.preserves_comments_and_variations());
    }

    #[test]
    fn json_disables_preservation_tsv_disables_wrapping() {
        assert!(!OutputFormat::Json.preserves_comments_and_variations());
        assert!(!OutputFormat::Tsv.wraps_lines());
    }

    #[test]
    fn default_config_has_seventy_five_column_wrap() {
        let config = Config::new();
        assert_eq!(config.max_line_length, 75);
    }
}
