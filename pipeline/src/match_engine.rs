//! Combined predicate evaluator (spec §4.5 "Match engine"): a game passes
//! iff every active predicate returns true. Evaluation order puts cheap
//! tag checks first so a single non-matching rule short-circuits before
//! move replay is paid for.

use std::collections::HashSet;

use board::board::Board;
use board::move_generation::MoveGenerator;
use board::move_list::MoveList;

use crate::fen_pattern::FenPatternTree;
use crate::game::Game;
use crate::material::MaterialCriterion;
use crate::tag::KnownTag;
use crate::textual_variation::TextualVariation;

/// One `tag operator value` rule (spec: "tag index, operator, value").
#[derive(Debug, Clone)]
pub struct TagRule {
    pub tag: TagName,
    pub op: TagOp,
    pub value: String,
}

/// A tag rule names either a known tag or an arbitrary extra tag by name,
/// or the synthetic `EloDiff` pseudo-tag computed on demand.
#[derive(Debug, Clone)]
pub enum TagName {
    Known(KnownTag),
    Named(String),
    EloDiff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
    RegexMatch,
}

fn tag_value(game: &Game, name: &TagName) -> Option<String> {
    match name {
        TagName::Known(tag) => game.tags.get(*tag).map(str::to_string),
        TagName::Named(n) => game.tags.get_by_name(n).map(str::to_string),
        TagName::EloDiff => {
            let white: i64 = game.tags.get(KnownTag::WhiteElo)?.parse().ok()?;
            let black: i64 = game.tags.get(KnownTag::BlackElo)?.parse().ok()?;
            Some((white - black).to_string())
        }
    }
}

/// Compares `actual` against `rule.value` with `rule.op`, numerically when
/// both sides parse as integers, lexically otherwise; `=~` always treats
/// `rule.value` as a regex (see [`crate::fen_pattern`] style micro-matching
/// is not reused here — tag regexes are a literal/wildcard substring test,
/// the only regex flavour the spec's tag predicate needs).
fn rule_holds(actual: &str, op: TagOp, value: &str, match_anywhere: bool) -> bool {
    if op == TagOp::RegexMatch {
        return simple_regex_is_match(value, actual);
    }
    if let (Ok(a), Ok(b)) = (actual.parse::<f64>(), value.parse::<f64>()) {
        return match op {
            TagOp::Eq => a == b,
            TagOp::Lt => a < b,
            TagOp::Gt => a > b,
            TagOp::Le => a <= b,
            TagOp::Ge => a >= b,
            TagOp::Ne => a != b,
            TagOp::RegexMatch => unreachable!("handled above"),
        };
    }
    let equal = if match_anywhere {
        actual.contains(value)
    } else {
        actual == value
    };
    match op {
        TagOp::Eq => equal,
        TagOp::Ne => !equal,
        // Relational comparisons against non-numeric text fall back to
        // lexical ordering, mirroring how the source compares tag strings
        // it cannot parse as integers.
        TagOp::Lt => actual < value,
        TagOp::Gt => actual > value,
        TagOp::Le => actual <= value,
        TagOp::Ge => actual >= value,
        TagOp::RegexMatch => unreachable!("handled above"),
    }
}

/// A minimal `*`/`?` glob, the only "regex" shape PGN tag rules actually
/// need (full-text tag values, not move grammar).
fn simple_regex_is_match(pattern: &str, text: &str) -> bool {
    fn go(p: &[char], t: &[char]) -> bool {
        match p.first() {
            None => t.is_empty(),
            Some('*') => go(&p[1..], t) || (!t.is_empty() && go(p, &t[1..])),
            Some('?') => !t.is_empty() && go(&p[1..], &t[1..]),
            Some(c) => t.first() == Some(c) && go(&p[1..], &t[1..]),
        }
    }
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    go(&p, &t)
}

/// Tag predicate: a positive (disjunctive) rule list and a negative
/// (conjunctive-not) rule list, plus the independent substring flag.
#[derive(Debug, Clone, Default)]
pub struct TagPredicate {
    pub positive: Vec<TagRule>,
    pub negative: Vec<TagRule>,
    pub match_anywhere: bool,
}

impl TagPredicate {
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    fn evaluate(&self, game: &Game) -> bool {
        let positive_ok = self.positive.is_empty()
            || self.positive.iter().any(|rule| self.rule_matches(game, rule));
        let negative_ok = self
            .negative
            .iter()
            .all(|rule| !self.rule_matches(game, rule));
        positive_ok && negative_ok
    }

    fn rule_matches(&self, game: &Game, rule: &TagRule) -> bool {
        match tag_value(game, &rule.tag) {
            Some(actual) => rule_holds(&actual, rule.op, &rule.value, self.match_anywhere),
            None => false,
        }
    }
}

/// Require/forbid `SetUp`, with FEN consistency.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetupPredicate {
    pub require_setup: bool,
    pub forbid_setup: bool,
}

impl SetupPredicate {
    fn evaluate(&self, game: &Game) -> bool {
        let has_setup = game.tags.get(KnownTag::SetUp).is_some();
        let has_fen = game.tags.get(KnownTag::Fen).is_some();
        if self.require_setup && !(has_setup && has_fen) {
            return false;
        }
        if self.forbid_setup && has_setup {
            return false;
        }
        true
    }
}

/// Ply/move count bound, inclusive.
#[derive(Debug, Clone, Copy)]
pub struct MoveBoundPredicate {
    pub lower: u32,
    pub upper: u32,
    pub by_move_number: bool,
}

impl MoveBoundPredicate {
    fn evaluate(&self, game: &Game) -> bool {
        let count = if self.by_move_number {
            game.move_number_count() as u32
        } else {
            game.ply_count() as u32
        };
        count >= self.lower && count <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationMode {
    Straight,
    Permutation,
}

#[derive(Debug, Clone)]
pub struct TextualVariationPredicate {
    pub variation: TextualVariation,
    pub mode: VariationMode,
}

impl TextualVariationPredicate {
    fn evaluate(&self, main_line_sans: &[String]) -> bool {
        match self.mode {
            VariationMode::Straight => self.variation.straight_match(main_line_sans),
            VariationMode::Permutation => self.variation.permutation_match(main_line_sans),
        }
    }
}

/// Positional-variation predicate: Zobrist hashes (explicit or derived
/// from `--fenpattern` matches) recorded as a target set, matched if any
/// ply within `depth_of_positional_search` reaches one of them.
#[derive(Debug, Clone, Default)]
pub struct PositionalVariationPredicate {
    pub target_hashes: HashSet<u64>,
    pub depth_of_positional_search: u32,
}

impl PositionalVariationPredicate {
    pub fn is_empty(&self) -> bool {
        self.target_hashes.is_empty()
    }

    fn evaluate(&self, hashes_by_ply: &[u64]) -> bool {
        let limit = if self.depth_of_positional_search == 0 {
            hashes_by_ply.len()
        } else {
            (self.depth_of_positional_search as usize).min(hashes_by_ply.len())
        };
        hashes_by_ply[..limit].iter().any(|h| self.target_hashes.contains(h))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FinalBoardPredicates {
    pub require_checkmate: bool,
    pub require_stalemate: bool,
    pub require_insufficient_material: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RepetitionPredicate {
    pub count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct NMoveRulePredicate {
    /// Half-moves since the last pawn move or capture, per the standard
    /// N-move rule (50 by default).
    pub half_moves: u32,
}

/// All active predicates for one run. Anything left at its default/empty
/// state does not constrain the match.
#[derive(Debug, Clone, Default)]
pub struct MatchCriteria {
    pub tag: TagPredicate,
    pub setup: SetupPredicate,
    pub move_bound: Option<MoveBoundPredicate>,
    pub textual_variation: Option<TextualVariationPredicate>,
    pub positional_variation: PositionalVariationPredicate,
    pub fen_patterns: FenPatternTree,
    pub material_criteria: Vec<MaterialCriterion>,
    pub final_board: FinalBoardPredicates,
    pub repetition: Option<RepetitionPredicate>,
    pub n_move_rule: Option<NMoveRulePredicate>,
    pub require_any_comment: bool,
    pub eco_codes: Vec<String>,
}

/// The result of evaluating [`MatchCriteria`] against one game.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub matched: bool,
    pub fen_pattern_label: Option<String>,
    pub material_match: Option<(usize, board::side::Side)>,
}

impl MatchCriteria {
    /// Evaluates the cheap, replay-independent predicates first. Returns
    /// `false` immediately if any of them already rules the game out,
    /// letting the driver skip the board replay entirely.
    pub fn evaluate_pre_replay(&self, game: &Game) -> bool {
        if !self.tag.evaluate(game) {
            return false;
        }
        if !self.setup.evaluate(game) {
            return false;
        }
        if let Some(bound) = &self.move_bound {
            if !bound.evaluate(game) {
                return false;
            }
        }
        if self.require_any_comment && !game.has_any_comment() {
            return false;
        }
        if !self.eco_codes.is_empty() {
            let eco = game.tags.get(KnownTag::Eco);
            if !eco.map(|e| self.eco_codes.iter().any(|c| c == e)).unwrap_or(false) {
                return false;
            }
        }
        true
    }

    /// Evaluates the replay-dependent predicates given the final board and
    /// per-ply bookkeeping the applier/driver filled in. `material_match`
    /// is computed by the driver from a [`MaterialMatcher`] fed one board
    /// per ply during replay (see [`crate::driver`]) since stability needs
    /// the whole trajectory, not just the final position.
    pub fn evaluate_post_replay(
        &self,
        game: &Game,
        final_board: &Board,
        move_gen: &MoveGenerator,
        hashes_by_ply: &[u64],
        material_match: Option<(usize, board::side::Side)>,
    ) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();

        if let Some(textual) = &self.textual_variation {
            let sans: Vec<String> = game.moves.iter().map(|m| m.san.clone()).collect();
            if !textual.evaluate(&sans) {
                return outcome;
            }
        }

        if !self.positional_variation.is_empty() && !self.positional_variation.evaluate(hashes_by_ply) {
            return outcome;
        }

        if !self.fen_patterns.is_empty() {
            match self.fen_patterns.first_match(final_board) {
                Some(label) => outcome.fen_pattern_label = Some(label),
                None => return outcome,
            }
        }

        if !self.material_criteria.is_empty() {
            match material_match {
                Some(found) => outcome.material_match = Some(found),
                None => return outcome,
            }
        }

        if self.final_board.require_checkmate && !final_board.is_checkmate(move_gen) {
            return outcome;
        }
        if self.final_board.require_stalemate {
            let mut moves = MoveList::new();
            move_gen.generate_legal_moves(final_board, &mut moves);
            let stalemate = moves.is_empty() && !final_board.is_in_check(move_gen);
            if !stalemate {
                return outcome;
            }
        }
        if self.final_board.require_insufficient_material && !final_board.insufficient_material() {
            return outcome;
        }

        if let Some(rep) = &self.repetition {
            let satisfied = game
                .position_counts
                .values()
                .any(|&count| count >= rep.count);
            if !satisfied {
                return outcome;
            }
        }

        if let Some(rule) = &self.n_move_rule {
            if final_board.half_move_clock() < rule.half_moves {
                return outcome;
            }
        }

        outcome.matched = true;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_with_tag(name: &str, value: &str) -> Game {
        let mut game = Game::new();
        game.tags.set(name, value.to_string());
        game
    }

    #[test]
    fn positive_rule_list_is_disjunctive() {
        let mut predicate = TagPredicate::default();
        predicate.positive.push(TagRule {
            tag: TagName::Known(KnownTag::White),
            op: TagOp::Eq,
            value: "Carlsen".to_string(),
        });
        predicate.positive.push(TagRule {
            tag: TagName::Known(KnownTag::White),
            op: TagOp::Eq,
            value: "Nakamura".to_string(),
        });
        assert!(predicate.evaluate(&game_with_tag("White", "Nakamura")));
        assert!(!predicate.evaluate(&game_with_tag("White", "Caruana")));
    }

    #[test]
    fn negative_rule_list_is_conjunctive_not() {
        let mut predicate = TagPredicate::default();
        predicate.negative.push(TagRule {
            tag: TagName::Known(KnownTag::Result),
            op: TagOp::Eq,
            value: "1/2-1/2".to_string(),
        });
        assert!(predicate.evaluate(&game_with_tag("Result", "1-0")));
        assert!(!predicate.evaluate(&game_with_tag("Result", "1/2-1/2")));
    }

    #[test]
    fn elo_diff_is_computed_on_demand() {
        let mut game = Game::new();
        game.tags.set("WhiteElo", "2800".to_string());
        game.tags.set("BlackElo", "2700".to_string());
        let mut predicate = TagPredicate::default();
        predicate.positive.push(TagRule {
            tag: TagName::EloDiff,
            op: TagOp::Ge,
            value: "50".to_string(),
        });
        assert!(predicate.evaluate(&game));
    }

    #[test]
    fn move_bound_checks_inclusive_range() {
        let mut game = Game::new();
        for san in ["e4", "e5", "Nf3"] {
            game.moves.push(crate::game::GameMove::new(san.to_string()));
        }
        let bound = MoveBoundPredicate {
            lower: 2,
            upper: 3,
            by_move_number: false,
        };
        assert!(bound.evaluate(&game));
        let too_narrow = MoveBoundPredicate {
            lower: 4,
            upper: 10,
            by_move_number: false,
        };
        assert!(!too_narrow.evaluate(&game));
    }
}
