//! Pipeline driver (spec §4.7/§4.8): owns the parser, match engine,
//! duplicate index and output sinks; obeys the counters and game-number
//! limits in §4.7 and §5's ordering guarantees.

use board::board::Board;
use board::definitions::CastlingAvailability;
use board::move_generation::MoveGenerator;
use board::pieces::Piece;
use board::square::Square;

use crate::applier::{self, PositionObserver};
use crate::config::{Config, DuplicatePolicy as ConfigDuplicatePolicy};
use crate::duplicate_index::{DuplicateIndex, DuplicatePolicy, GameIdentity};
use crate::error::ParseError;
use crate::game::Game;
use crate::material::MaterialMatcher;
use crate::parser::Parser;
use crate::tag::KnownTag;

/// Where a processed game goes: the matching sink, the duplicates sink, or
/// the non-matching sink (spec §4.7: "output sinks (main, duplicates,
/// non-matching)").
pub trait GameSink {
    fn accept_matched(&mut self, game: &Game, source_file: &str, game_number: u32);
    fn accept_duplicate(&mut self, game: &Game, source_file: &str, game_number: u32, prior_file: &str, prior_number: u32);
    fn accept_non_matching(&mut self, game: &Game, source_file: &str, game_number: u32);
}

/// No-op sink, useful for dry runs and tests.
impl GameSink for () {
    fn accept_matched(&mut self, _game: &Game, _source_file: &str, _game_number: u32) {}
    fn accept_duplicate(
        &mut self,
        _game: &Game,
        _source_file: &str,
        _game_number: u32,
        _prior_file: &str,
        _prior_number: u32,
    ) {
    }
    fn accept_non_matching(&mut self, _game: &Game, _source_file: &str, _game_number: u32) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DriverCounters {
    pub num_processed: u32,
    pub num_matched: u32,
    pub num_duplicates: u32,
    pub num_parse_errors: u32,
}

struct HashCollector {
    hashes: Vec<u64>,
}

impl PositionObserver for &mut HashCollector {
    fn observe(&mut self, board: &Board, _ply: u32) {
        self.hashes.push(board.zobrist_hash());
    }
}

/// Drives one source file's games through parse → replay → match →
/// dedup → sink, honouring `Config`'s limits. Returns the final counters.
pub struct Driver<'a> {
    config: &'a Config,
    move_gen: MoveGenerator,
    duplicate_index: DuplicateIndex,
    counters: DriverCounters,
    game_number: u32,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            duplicate_index: DuplicateIndex::new(config.duplicate_index.clone()),
            move_gen: MoveGenerator::new(),
            config,
            counters: DriverCounters::default(),
            game_number: 0,
        }
    }

    pub fn counters(&self) -> DriverCounters {
        self.counters
    }

    /// Processes every game in `bytes` (one source file's contents),
    /// routing each to `sink` and logging diagnostics via `tracing`.
    pub fn run_source(
        &mut self,
        bytes: &[u8],
        source_file: &str,
        sink: &mut impl GameSink,
    ) -> Result<(), ParseError> {
        let mut parser = Parser::new(bytes, self.config.parser.clone())?;

        loop {
            if let Some(limit) = self.config.limits.game_limit {
                if self.counters.num_processed >= limit {
                    break;
                }
            }
            if let Some(max_matches) = self.config.limits.maximum_matches {
                if self.counters.num_matched >= max_matches {
                    break;
                }
            }

            let maybe_game = match parser.parse_game() {
                Ok(g) => g,
                Err(err) => {
                    self.counters.num_parse_errors += 1;
                    tracing::warn!(source = source_file, error = %err, "game failed to parse");
                    continue;
                }
            };
            let Some(mut game) = maybe_game else {
                break;
            };

            self.game_number += 1;
            let game_number = self.game_number;

            if game_number < self.config.limits.first_game_number {
                continue;
            }
            if self.config.limits.skip_game_numbers.contains(game_number) {
                continue;
            }
            if !self.config.limits.matching_game_numbers.is_empty()
                && !self.config.limits.matching_game_numbers.contains(game_number)
            {
                continue;
            }

            self.counters.num_processed += 1;
            tracing::debug!(source = source_file, game_number, "parsed game");

            for diagnostic in &game.diagnostics {
                tracing::warn!(source = source_file, game_number, %diagnostic, "parse diagnostic");
            }

            self.process_game(&mut game, source_file, game_number, sink);

            if self.counters.num_processed % 1000 == 0 {
                tracing::info!(
                    processed = self.counters.num_processed,
                    matched = self.counters.num_matched,
                    "progress"
                );
            }
        }

        Ok(())
    }

    fn process_game(&mut self, game: &mut Game, source_file: &str, game_number: u32, sink: &mut impl GameSink) {
        let start = starting_board(game);

        if game.tags.get(KnownTag::Variant).is_none() && is_chess960_start(&start) {
            game.tags.set("Variant", "chess 960".to_string());
        }

        let mut collector = HashCollector { hashes: Vec::new() };
        let mut material_matcher = MaterialMatcher::new(&self.config.criteria.material_criteria);
        let final_board = {
            let move_gen = &self.move_gen;
            let mut observer = CombinedObserver {
                hashes: &mut collector,
                material: &mut material_matcher,
            };
            applier::apply_move_list(&start, move_gen, game, self.config.parser.allow_null_moves, &mut observer)
        };

        game.final_fen = final_board.to_fen();

        if !game.moves_ok {
            if let Some(diagnostic) = game.diagnostics.last() {
                tracing::warn!(source = source_file, game_number, %diagnostic, "move application failed");
            }
        }

        if !self.config.criteria.evaluate_pre_replay(game) {
            sink.accept_non_matching(game, source_file, game_number);
            return;
        }

        let outcome = self.config.criteria.evaluate_post_replay(
            game,
            &final_board,
            &self.move_gen,
            &collector.hashes,
            material_matcher.any_match(),
        );

        if !outcome.matched {
            sink.accept_non_matching(game, source_file, game_number);
            return;
        }

        let identity = GameIdentity {
            final_hash: game.final_hash,
            cumulative_hash: game.cumulative_checksum,
            ply_count: game.ply_count() as u32,
        };
        let fuzzy_hash = self.config.fuzzy_match_depth.and_then(|depth| {
            collector.hashes.get((depth as usize).saturating_sub(1)).copied()
        });
        let prior = match self.duplicate_index.insert(identity, fuzzy_hash, source_file, game_number) {
            Ok(prior) => prior,
            Err(err) => {
                tracing::warn!(source = source_file, game_number, error = %err, "duplicate index failure; treating as unique");
                None
            }
        };

        if prior.is_some() {
            self.counters.num_duplicates += 1;
        }

        // Policy is evaluated causally: by the time we know whether this
        // game is an "original" (no prior) or a repeat (prior present), no
        // retroactive action on an already-emitted game is ever needed —
        // `SuppressOriginals` simply never emits the first occurrence.
        let keep = match self.config.duplicate_policy {
            ConfigDuplicatePolicy::KeepAll => true,
            ConfigDuplicatePolicy::SuppressDuplicates => prior.is_none(),
            ConfigDuplicatePolicy::SuppressOriginals => prior.is_some(),
        };

        if keep {
            self.counters.num_matched += 1;
            sink.accept_matched(game, source_file, game_number);
        } else if let Some(prior) = prior {
            sink.accept_duplicate(game, source_file, game_number, &prior.source_file, prior.game_number);
        } else {
            sink.accept_non_matching(game, source_file, game_number);
        }
    }
}

/// Wires a [`HashCollector`] and a [`MaterialMatcher`] into one
/// [`PositionObserver`] so the applier only needs one observer hook per
/// ply, even though the positional-variation and material predicates each
/// need their own running state.
struct CombinedObserver<'a, 'b, 'c> {
    hashes: &'a mut HashCollector,
    material: &'b mut MaterialMatcher<'c>,
}

impl PositionObserver for &mut CombinedObserver<'_, '_, '_> {
    fn observe(&mut self, board: &Board, ply: u32) {
        self.hashes.observe(board, ply);
        self.material.observe(board);
    }
}

fn starting_board(game: &Game) -> Board {
    match game.tags.get(KnownTag::Fen) {
        Some(fen) => Board::from_fen(fen).unwrap_or_else(|_| Board::default_board()),
        None => Board::default_board(),
    }
}

/// A Chess960/Fischer Random start (spec §8): full castling rights plus a
/// back rank other than the standard `RNBQKBNR` arrangement.
fn is_chess960_start(board: &Board) -> bool {
    const STANDARD_BACK_RANK: [Piece; 8] = [
        Piece::Rook,
        Piece::Knight,
        Piece::Bishop,
        Piece::Queen,
        Piece::King,
        Piece::Bishop,
        Piece::Knight,
        Piece::Rook,
    ];

    if board.castling_rights() != CastlingAvailability::ALL {
        return false;
    }

    (0..8u8).any(|file| {
        let actual = Square::from_file_rank((b'a' + file) as char, 1)
            .ok()
            .and_then(|square| board.piece_on_square(square.to_square_index()))
            .map(|(piece, _)| piece);
        actual != Some(STANDARD_BACK_RANK[file as usize])
    })
}

// DuplicatePolicy re-exported so downstream callers of this module don't
// need to import `duplicate_index` directly for the common case.
pub use DuplicatePolicy as IndexDuplicatePolicy;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        matched: Vec<u32>,
        non_matching: Vec<u32>,
        duplicates: Vec<u32>,
        last_variant: Option<String>,
    }

    impl GameSink for RecordingSink {
        fn accept_matched(&mut self, game: &Game, _source_file: &str, game_number: u32) {
            self.matched.push(game_number);
            self.last_variant = game.tags.get(KnownTag::Variant).map(str::to_string);
        }
        fn accept_duplicate(
            &mut self,
            _game: &Game,
            _source_file: &str,
            game_number: u32,
            _prior_file: &str,
            _prior_number: u32,
        ) {
            self.duplicates.push(game_number);
        }
        fn accept_non_matching(&mut self, game: &Game, _source_file: &str, game_number: u32) {
            self.non_matching.push(game_number);
            self.last_variant = game.tags.get(KnownTag::Variant).map(str::to_string);
        }
    }

    #[test]
    fn processes_each_game_and_counts_them() {
        let pgn = b"[Event \"A\"]\n\n1. e4 e5 1-0\n\n[Event \"B\"]\n\n1. d4 d5 1-0\n";
        let config = Config::new();
        let mut driver = Driver::new(&config);
        let mut sink = RecordingSink::default();
        driver.run_source(pgn, "test.pgn", &mut sink).unwrap();
        assert_eq!(driver.counters().num_processed, 2);
        assert_eq!(sink.matched.len() + sink.non_matching.len(), 2);
    }

    #[test]
    fn chess960_start_gets_variant_tag_inserted() {
        let pgn = b"[Event \"A\"]\n[FEN \"bbqnnrkr/pppppppp/8/8/8/8/PPPPPPPP/BBQNNRKR w KQkq - 0 1\"]\n[SetUp \"1\"]\n\n*\n";
        let config = Config::new();
        let mut driver = Driver::new(&config);
        let mut sink = RecordingSink::default();
        driver.run_source(pgn, "test.pgn", &mut sink).unwrap();
        assert_eq!(driver.counters().num_processed, 1);
        assert_eq!(sink.last_variant.as_deref(), Some("chess 960"));
    }

    #[test]
    fn is_chess960_start_flags_shuffled_back_rank_with_full_castling() {
        let board = Board::from_fen("bbqnnrkr/pppppppp/8/8/8/8/PPPPPPPP/BBQNNRKR w KQkq - 0 1").unwrap();
        assert!(is_chess960_start(&board));
    }

    #[test]
    fn is_chess960_start_ignores_standard_start() {
        let board = Board::default_board();
        assert!(!is_chess960_start(&board));
    }

    #[test]
    fn is_chess960_start_requires_full_castling_rights() {
        let board = Board::from_fen("bbqnnrkr/pppppppp/8/8/8/8/PPPPPPPP/BBQNNRKR w - - 0 1").unwrap();
        assert!(!is_chess960_start(&board));
    }

    #[test]
    fn respects_game_limit() {
        let pgn = b"[Event \"A\"]\n\n1. e4 e5 1-0\n\n[Event \"B\"]\n\n1. d4 d5 1-0\n";
        let mut config = Config::new();
        config.limits.game_limit = Some(1);
        let mut driver = Driver::new(&config);
        let mut sink = RecordingSink::default();
        driver.run_source(pgn, "test.pgn", &mut sink).unwrap();
        assert_eq!(driver.counters().num_processed, 1);
    }
}
