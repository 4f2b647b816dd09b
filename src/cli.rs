//! Command-line surface: a representative subset of spec §6's historical
//! short-option grammar, expressed as a `clap` derive `Parser` in the
//! teacher's style (see `byte-knight`'s own CLI). Full flag-for-flag
//! parity with every historical short option is an explicit non-goal of
//! this expansion (see DESIGN.md Open Questions) — the options below cover
//! the behaviours the component design (§4) actually implements.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "pgnsift",
    version,
    about = "Batch PGN validator, selector and re-emitter",
    long_about = "Ingests one or more PGN files, validates and replays each game, \
                  selects games matching the given criteria, and re-emits the \
                  selected games in a chosen textual format."
)]
pub struct Cli {
    /// Input PGN files.
    pub files: Vec<PathBuf>,

    /// File containing a list of input filenames, one per line (spec §6 `-f`).
    #[arg(short = 'f', long = "file-list")]
    pub file_list: Option<PathBuf>,

    /// Main output file; stdout if omitted (spec §6 `-o`/`-a`).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Non-matching-games output file (spec §4.7).
    #[arg(short = 'n', long = "non-matching")]
    pub non_matching: Option<PathBuf>,

    /// Duplicate-games output file (spec §4.7).
    #[arg(short = 'd', long = "duplicates-file")]
    pub duplicates: Option<PathBuf>,

    /// ECO classification file, parsed in ECO mode (spec §6 `-e`); disables
    /// normal output. Falls back to the `ECO_FILE` environment variable
    /// when given with no argument.
    #[arg(short = 'e', long = "eco", num_args = 0..=1, default_missing_value = "")]
    pub eco: Option<String>,

    /// Output format (spec §6's long-form output options).
    #[arg(short = 'W', long = "format", value_enum, default_value_t = OutputFormatArg::Pgn)]
    pub format: OutputFormatArg,

    /// Maximum output line length for wrapped move text (spec §6, default 75).
    #[arg(short = 'w', long = "wrap", default_value_t = 75)]
    pub wrap: u32,

    /// Suppress progress/summary logging (spec §7 `-s`).
    #[arg(short = 's', long = "quiet")]
    pub quiet: bool,

    /// First game number to start processing at (spec §6 `-#N`).
    #[arg(long = "first", default_value_t = 1)]
    pub first_game_number: u32,

    /// Stop after this many games have been processed.
    #[arg(short = 'N', long = "limit")]
    pub game_limit: Option<u32>,

    /// Stop after this many games have matched.
    #[arg(short = 'M', long = "max-matches")]
    pub max_matches: Option<u32>,

    /// Comma-separated game-number ranges to process, e.g. `1-5,10,20-25`
    /// (spec §3 `GameNumberRange`, `--selectonly`).
    #[arg(long = "select-only")]
    pub select_only: Option<String>,

    /// Comma-separated game-number ranges to skip (`--skipmatching`).
    #[arg(long = "skip-matching")]
    pub skip_matching: Option<String>,

    /// Drop every occurrence of a duplicate game after the first
    /// (spec §4.6 `suppress_duplicates`).
    #[arg(short = 'U', long = "suppress-duplicates")]
    pub suppress_duplicates: bool,

    /// Keep only occurrences of a duplicate game from the second onward
    /// (spec §4.6 `suppress_originals`).
    #[arg(short = 'D', long = "suppress-originals")]
    pub suppress_originals: bool,

    /// Enable fuzzy duplicate matching at the given ply depth.
    #[arg(long = "fuzzy-depth")]
    pub fuzzy_depth: Option<u32>,

    /// Required/forbidden tag rule in `Name=Value`, `Name<Value`, ... form;
    /// repeatable (spec §4.5 tag predicate, positive/disjunctive list).
    #[arg(short = 'T', long = "tag-rule")]
    pub tag_rules: Vec<String>,

    /// FEN-pattern to match against, e.g. `8/8/8/8/8/8/8/8:KQ-KR` (spec §4.5).
    #[arg(short = 'F', long = "fen-pattern")]
    pub fen_pattern: Option<String>,

    /// Minimum/maximum ply-count bound as `lower-upper`.
    #[arg(short = 'b', long = "move-bounds")]
    pub move_bounds: Option<String>,

    /// Require at least one comment anywhere in the game.
    #[arg(short = 'C', long = "comment-only")]
    pub comment_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Pgn,
    Epd,
    Fen,
    Lalg,
    Halg,
    Elalg,
    Xlalg,
    Xolalg,
    Uci,
    Chessmaster,
    Json,
    Tsv,
}

impl From<OutputFormatArg> for pipeline::config::OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        use pipeline::config::OutputFormat as F;
        match value {
            OutputFormatArg::Pgn => F::Pgn,
            OutputFormatArg::Epd => F::Epd,
            OutputFormatArg::Fen => F::Fen,
            OutputFormatArg::Lalg => F::Lalg,
            OutputFormatArg::Halg => F::Halg,
            OutputFormatArg::Elalg => F::Elalg,
            OutputFormatArg::Xlalg => F::Xlalg,
            OutputFormatArg::Xolalg => F::Xolalg,
            OutputFormatArg::Uci => F::Uci,
            OutputFormatArg::Chessmaster => F::ChessMaster,
            OutputFormatArg::Json => F::Json,
            OutputFormatArg::Tsv => F::Tsv,
        }
    }
}
