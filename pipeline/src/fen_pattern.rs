//! FEN-pattern matching (spec §4.5 "FEN-pattern matching" and §3
//! `FenPatternTree`): a micro-regex over each rank's 8 squares, patterns
//! shared in a trie keyed by rank text, compiled to a small Pike-style VM
//! (spec §9 REDESIGN FLAGS: "reimplement as a compiled NFA ... to avoid
//! pathological backtracking on `*`").

use std::collections::HashMap;

use board::board::Board;
use board::pieces::Piece;
use board::side::Side;

use crate::error::MatchError;
use crate::material::PieceKind;

/// One square's acceptance test, compiled from a single pattern symbol.
#[derive(Debug, Clone)]
enum Matcher {
    Empty,
    NonEmpty,
    Any,
    WhitePiece,
    BlackPiece,
    NonPawn,
    Literal(char),
    Class { chars: Vec<char>, negate: bool },
}

fn matcher_accepts(m: &Matcher, square: char) -> bool {
    match m {
        Matcher::Empty => square == '_',
        Matcher::NonEmpty => square != '_',
        Matcher::Any => true,
        Matcher::WhitePiece => square != '_' && square.is_ascii_uppercase(),
        Matcher::BlackPiece => square != '_' && square.is_ascii_lowercase(),
        Matcher::NonPawn => square != '_' && square.to_ascii_lowercase() != 'p',
        Matcher::Literal(c) => square == *c,
        Matcher::Class { chars, negate } => chars.contains(&square) != *negate,
    }
}

/// Compiled rank pattern: a tiny Split/Jmp/Char/Match program, simulated
/// with memoized recursion so the `*` operator (zero-or-more squares)
/// cannot blow up even on contrived inputs.
#[derive(Debug, Clone)]
enum Inst {
    Char(Matcher),
    Split(usize, usize),
    Jmp(usize),
    Match,
}

#[derive(Debug, Clone)]
pub struct RankPattern {
    prog: Vec<Inst>,
    source: String,
}

impl RankPattern {
    pub fn compile(pattern: &str) -> Result<Self, MatchError> {
        let mut prog = Vec::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '_' => prog.push(Inst::Char(Matcher::Empty)),
                '!' => prog.push(Inst::Char(Matcher::NonEmpty)),
                '?' => prog.push(Inst::Char(Matcher::Any)),
                'A' => prog.push(Inst::Char(Matcher::WhitePiece)),
                'a' => prog.push(Inst::Char(Matcher::BlackPiece)),
                'm' => prog.push(Inst::Char(Matcher::NonPawn)),
                '1'..='8' => {
                    let n = c.to_digit(10).unwrap();
                    for _ in 0..n {
                        prog.push(Inst::Char(Matcher::Empty));
                    }
                }
                '*' => {
                    let split_pc = prog.len();
                    prog.push(Inst::Split(0, 0)); // patched below
                    let char_pc = prog.len();
                    prog.push(Inst::Char(Matcher::Any));
                    prog.push(Inst::Jmp(split_pc));
                    let after_pc = prog.len();
                    prog[split_pc] = Inst::Split(char_pc, after_pc);
                }
                '[' => {
                    let mut negate = false;
                    let mut set = Vec::new();
                    if chars.peek() == Some(&'^') {
                        negate = true;
                        chars.next();
                    }
                    for class_char in chars.by_ref() {
                        if class_char == ']' {
                            break;
                        }
                        set.push(class_char);
                    }
                    prog.push(Inst::Char(Matcher::Class { chars: set, negate }));
                }
                letter if letter.is_ascii_alphabetic() => {
                    prog.push(Inst::Char(Matcher::Literal(letter)))
                }
                other => {
                    return Err(MatchError::MalformedFenPattern(format!(
                        "unrecognised symbol '{other}' in '{pattern}'"
                    )));
                }
            }
        }
        prog.push(Inst::Match);
        Ok(Self {
            prog,
            source: pattern.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn matches(&self, squares: &[char; 8]) -> bool {
        run(&self.prog, 0, squares, 0)
    }

    /// The literal 8-character occupancy string this pattern requires, if
    /// it contains no wildcard/class/star operator — the same alphabet
    /// [`rank_to_squares`] renders a board rank into, so it can key a board
    /// lookup directly. `None` once any non-literal instruction appears.
    fn literal_key(&self) -> Option<String> {
        let mut out = String::with_capacity(8);
        for inst in &self.prog {
            match inst {
                Inst::Char(Matcher::Literal(c)) => out.push(*c),
                Inst::Char(Matcher::Empty) => out.push('_'),
                Inst::Match => return Some(out),
                _ => return None,
            }
        }
        None
    }
}

fn run(prog: &[Inst], pc: usize, squares: &[char; 8], sp: usize) -> bool {
    match &prog[pc] {
        Inst::Match => sp == squares.len(),
        Inst::Jmp(target) => run(prog, *target, squares, sp),
        Inst::Split(a, b) => run(prog, *a, squares, sp) || run(prog, *b, squares, sp),
        Inst::Char(m) => {
            sp < squares.len() && matcher_accepts(m, squares[sp]) && run(prog, pc + 1, squares, sp + 1)
        }
    }
}

/// Renders a board rank (0 = rank 8, ..., 7 = rank 1, matching FEN order)
/// as 8 characters: an uppercase piece letter for White, lowercase for
/// Black, `_` for an empty square.
pub fn rank_to_squares(board: &Board, fen_rank_index: u8) -> [char; 8] {
    let rank = 7 - fen_rank_index;
    let mut out = ['_'; 8];
    for (file, slot) in out.iter_mut().enumerate() {
        let square_index = rank * 8 + file as u8;
        if let Some((piece, side)) = board.piece_on_square(square_index) {
            let c = piece.as_char();
            *slot = if side == Side::White { c.to_ascii_uppercase() } else { c };
        }
    }
    out
}

/// One leaf of the pattern trie: a full 8-rank pattern plus optional label
/// and material gate.
#[derive(Debug, Clone)]
pub struct FenPatternEntry {
    pub ranks: [RankPattern; 8],
    pub label: Option<String>,
    pub material: Option<RankMaterialGate>,
}

impl FenPatternEntry {
    /// Parses an entry from `<rank8>/<rank7>/.../<rank1>[:label][:WHITE-BLACK]`
    /// as in the spec example `8/8/8/8/8/8/8/8:KQ-KR`.
    pub fn parse(spec: &str) -> Result<Self, MatchError> {
        let mut parts = spec.splitn(2, ':');
        let board_part = parts.next().unwrap_or_default();
        let rest = parts.next();

        let rank_specs: Vec<&str> = board_part.split('/').collect();
        if rank_specs.len() != 8 {
            return Err(MatchError::MalformedFenPattern(format!(
                "expected 8 ranks, found {}",
                rank_specs.len()
            )));
        }
        let mut ranks = Vec::with_capacity(8);
        for r in rank_specs {
            ranks.push(RankPattern::compile(r)?);
        }
        let ranks: [RankPattern; 8] = ranks
            .try_into()
            .map_err(|_| MatchError::MalformedFenPattern(spec.to_string()))?;

        let (label, material) = match rest {
            None => (None, None),
            Some(text) if text.contains('-') && text.chars().all(is_material_char) => {
                (None, Some(parse_material_constraint(text)?))
            }
            Some(text) => (Some(text.to_string()), None),
        };

        Ok(Self {
            ranks,
            label,
            material,
        })
    }

    fn matches_board(&self, board: &Board) -> bool {
        for (i, rank) in self.ranks.iter().enumerate() {
            let squares = rank_to_squares(board, i as u8);
            if !rank.matches(&squares) {
                return false;
            }
        }
        match &self.material {
            Some(gate) => gate.matches(board),
            None => true,
        }
    }
}

fn is_material_char(c: char) -> bool {
    matches!(c, 'K' | 'Q' | 'R' | 'B' | 'N' | 'P' | 'k' | 'q' | 'r' | 'b' | 'n' | 'p' | '-')
}

/// A FEN-pattern leaf's inline material gate (spec: "a leaf carries an
/// optional material constraint"), e.g. `KQ-KR` meaning "White has exactly
/// king + queen, Black has exactly king + rook, nothing else on the
/// board". Distinct from the general relational [`MaterialCriterion`]:
/// this is an exact-set check per side, not a stability-tracked relation.
#[derive(Debug, Clone)]
pub struct RankMaterialGate {
    white: Vec<PieceKind>,
    black: Vec<PieceKind>,
}

impl RankMaterialGate {
    fn matches(&self, board: &Board) -> bool {
        side_matches_exact_set(board, Side::White, &self.white)
            && side_matches_exact_set(board, Side::Black, &self.black)
    }
}

fn side_matches_exact_set(board: &Board, side: Side, required: &[PieceKind]) -> bool {
    for kind in [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
    ] {
        let piece = match kind {
            PieceKind::Queen => Piece::Queen,
            PieceKind::Rook => Piece::Rook,
            PieceKind::Bishop => Piece::Bishop,
            PieceKind::Knight => Piece::Knight,
            PieceKind::Pawn => Piece::Pawn,
            _ => unreachable!("King/Minor excluded from the scan set"),
        };
        let count = board.piece_bitboard(piece, side).number_of_occupied_squares();
        let required_here = required.iter().any(|k| kind_eq(*k, kind));
        if required_here {
            if count == 0 {
                return false;
            }
        } else if count != 0 {
            return false;
        }
    }
    true
}

fn kind_eq(a: PieceKind, b: PieceKind) -> bool {
    matches!(
        (a, b),
        (PieceKind::Queen, PieceKind::Queen)
            | (PieceKind::Rook, PieceKind::Rook)
            | (PieceKind::Bishop, PieceKind::Bishop)
            | (PieceKind::Knight, PieceKind::Knight)
            | (PieceKind::Pawn, PieceKind::Pawn)
    )
}

/// Parses `"KQ-KR"`-style shorthand: the letters before `-` are the piece
/// types White must have exactly (plus its king); the letters after, Black.
fn parse_material_constraint(text: &str) -> Result<RankMaterialGate, MatchError> {
    let (white, black) = text
        .split_once('-')
        .ok_or_else(|| MatchError::MalformedMaterialCriteria(text.to_string()))?;
    Ok(RankMaterialGate {
        white: parse_side_kinds(white)?,
        black: parse_side_kinds(black)?,
    })
}

fn parse_side_kinds(letters: &str) -> Result<Vec<PieceKind>, MatchError> {
    letters
        .chars()
        .filter(|c| !c.eq_ignore_ascii_case(&'k'))
        .map(|c| {
            piece_kind_from_letter(c)
                .ok_or_else(|| MatchError::MalformedMaterialCriteria(letters.to_string()))
        })
        .collect()
}

fn piece_kind_from_letter(c: char) -> Option<PieceKind> {
    match c.to_ascii_uppercase() {
        'K' => Some(PieceKind::King),
        'Q' => Some(PieceKind::Queen),
        'R' => Some(PieceKind::Rook),
        'B' => Some(PieceKind::Bishop),
        'N' => Some(PieceKind::Knight),
        'P' => Some(PieceKind::Pawn),
        _ => None,
    }
}

/// Shares rank-pattern prefixes across entries (spec: "stored in a trie
/// over ranks to amortise shared prefixes"). Indexed by the first rank's
/// literal occupancy string — the same representation [`rank_to_squares`]
/// produces for a board — so insert- and lookup-time keys actually unify;
/// entries whose first rank uses `*`/`?`/a class have no such literal key
/// and live in `wildcard_entries` instead, checked by a full scan.
#[derive(Debug, Clone, Default)]
pub struct FenPatternTree {
    entries: Vec<FenPatternEntry>,
    by_first_rank: HashMap<String, Vec<usize>>,
    wildcard_entries: Vec<usize>,
}

impl FenPatternTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: &str) -> Result<(), MatchError> {
        let entry = FenPatternEntry::parse(spec)?;
        let index = self.entries.len();
        match entry.ranks[0].literal_key() {
            Some(key) => {
                self.by_first_rank.entry(key).or_default().push(index);
            }
            None => self.wildcard_entries.push(index),
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Returns the label of the first leaf whose pattern matches `board`
    /// (possibly an empty string, per the spec: "the first successful leaf
    /// returns the leaf's label (possibly the empty string)"), or `None`.
    pub fn first_match(&self, board: &Board) -> Option<String> {
        let first_rank_key: String = rank_to_squares(board, 0).iter().collect();
        if let Some(candidates) = self.by_first_rank.get(&first_rank_key) {
            for &i in candidates {
                if self.entries[i].matches_board(board) {
                    return Some(self.entries[i].label.clone().unwrap_or_default());
                }
            }
        }
        for &i in &self.wildcard_entries {
            if self.entries[i].matches_board(board) {
                return Some(self.entries[i].label.clone().unwrap_or_default());
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::board::Board;

    #[test]
    fn empty_board_pattern_matches_empty_ranks() {
        let pattern = RankPattern::compile("8").unwrap();
        let squares = ['_'; 8];
        assert!(pattern.matches(&squares));
    }

    #[test]
    fn star_matches_variable_run() {
        let pattern = RankPattern::compile("R*K").unwrap();
        let mut squares = ['_'; 8];
        squares[0] = 'R';
        squares[7] = 'K';
        assert!(pattern.matches(&squares));
    }

    #[test]
    fn literal_and_class_patterns() {
        let pattern = RankPattern::compile("[KQ]6_").unwrap();
        let mut squares = ['_'; 8];
        squares[0] = 'K';
        assert!(pattern.matches(&squares));
        squares[0] = 'R';
        assert!(!pattern.matches(&squares));
    }

    #[test]
    fn fen_pattern_tree_matches_empty_board() {
        let mut tree = FenPatternTree::new();
        tree.insert("8/8/8/8/8/8/8/8").unwrap();
        let board = Board::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(tree.first_match(&board), Some(String::new()));
    }

    #[test]
    fn fen_pattern_tree_matches_wildcard_first_rank() {
        // First rank uses a star and a character class, so it has no
        // literal key and must be found via the wildcard fallback scan.
        let mut tree = FenPatternTree::new();
        tree.insert("R*K/8/8/8/8/8/8/8:label").unwrap();
        tree.insert("[KQ]7/8/8/8/8/8/8/8").unwrap();

        let board = Board::from_fen("R6K/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(tree.first_match(&board), Some("label".to_string()));

        let board = Board::from_fen("K7/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(tree.first_match(&board), Some(String::new()));
    }

    #[test]
    fn literal_key_is_none_for_wildcard_rank() {
        assert!(RankPattern::compile("8").unwrap().literal_key().is_some());
        assert!(RankPattern::compile("R*K").unwrap().literal_key().is_none());
        assert!(RankPattern::compile("[KQ]6_").unwrap().literal_key().is_none());
    }
}
