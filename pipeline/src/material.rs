//! Material-balance matching (spec §3 `MaterialCriteria`, §4.5 "Material
//! matching"): relational piece-count constraints that must hold stably
//! for `move_depth` consecutive half-moves before a game is accepted.

use board::board::Board;
use board::pieces::Piece;
use board::side::Side;

/// A piece kind a criterion can constrain; `Minor` is the spec's pseudo-
/// piece matching bishop-or-knight, tracked separately from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
    Minor,
}

/// How a piece count must relate to the required count (`n`) or to the
/// same count for the opposing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    Exactly(u8),
    AtLeast(u8),
    AtMost(u8),
    SameAsOpponent,
    NotEqualOpponent,
    LessThanOpponent,
    MoreThanOpponent,
    LessOrEqualOpponent,
    MoreOrEqualOpponent,
}

#[derive(Debug, Clone, Copy)]
pub struct PieceConstraint {
    pub kind: PieceKind,
    pub occurs: Occurs,
}

/// One material criterion. Criteria are evaluated independently and the
/// driver matches a game against any of them (spec: "form a singly-linked
/// list; the driver matches against any").
#[derive(Debug, Clone)]
pub struct MaterialCriterion {
    pub constraints: Vec<PieceConstraint>,
    /// Test both White-as-subject and Black-as-subject interpretations,
    /// not just White.
    pub both_colours: bool,
    /// Half-plies the relation must hold, consecutively, before matching.
    pub move_depth: u32,
    /// Stamp the matched side into a synthetic `MaterialMatch` tag.
    pub add_match_tag: bool,
}

impl MaterialCriterion {
    pub fn new(constraints: Vec<PieceConstraint>) -> Self {
        Self {
            constraints,
            both_colours: false,
            move_depth: 1,
            add_match_tag: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    king: u8,
    queen: u8,
    rook: u8,
    bishop: u8,
    knight: u8,
    pawn: u8,
    minor: u8,
}

fn counts_for(board: &Board, side: Side) -> Counts {
    let count = |p: Piece| board.piece_bitboard(p, side).number_of_occupied_squares() as u8;
    let bishop = count(Piece::Bishop);
    let knight = count(Piece::Knight);
    Counts {
        king: count(Piece::King),
        queen: count(Piece::Queen),
        rook: count(Piece::Rook),
        bishop,
        knight,
        pawn: count(Piece::Pawn),
        minor: bishop + knight,
    }
}

fn count_of(counts: &Counts, kind: PieceKind) -> u8 {
    match kind {
        PieceKind::King => counts.king,
        PieceKind::Queen => counts.queen,
        PieceKind::Rook => counts.rook,
        PieceKind::Bishop => counts.bishop,
        PieceKind::Knight => counts.knight,
        PieceKind::Pawn => counts.pawn,
        PieceKind::Minor => counts.minor,
    }
}

fn satisfies(occurs: Occurs, mine: u8, theirs: u8) -> bool {
    match occurs {
        Occurs::Exactly(n) => mine == n,
        Occurs::AtLeast(n) => mine >= n,
        Occurs::AtMost(n) => mine <= n,
        Occurs::SameAsOpponent => mine == theirs,
        Occurs::NotEqualOpponent => mine != theirs,
        Occurs::LessThanOpponent => mine < theirs,
        Occurs::MoreThanOpponent => mine > theirs,
        Occurs::LessOrEqualOpponent => mine <= theirs,
        Occurs::MoreOrEqualOpponent => mine >= theirs,
    }
}

fn criterion_holds_for_side(criterion: &MaterialCriterion, board: &Board, subject: Side) -> bool {
    let mine = counts_for(board, subject);
    let theirs = counts_for(board, Side::opposite(subject));
    criterion
        .constraints
        .iter()
        .all(|c| satisfies(c.occurs, count_of(&mine, c.kind), count_of(&theirs, c.kind)))
}

/// Tracks per-criterion, per-side-interpretation stability counters across
/// a game replay.
pub struct MaterialMatcher<'a> {
    criteria: &'a [MaterialCriterion],
    depth: Vec<[u32; 2]>,
    matched: Vec<Option<Side>>,
}

impl<'a> MaterialMatcher<'a> {
    pub fn new(criteria: &'a [MaterialCriterion]) -> Self {
        Self {
            depth: vec![[0, 0]; criteria.len()],
            matched: vec![None; criteria.len()],
            criteria,
        }
    }

    /// Feed one more position. Once a criterion first reaches its
    /// `move_depth` for some side interpretation, that result is latched
    /// and returned on every subsequent call too.
    pub fn observe(&mut self, board: &Board) {
        for (i, criterion) in self.criteria.iter().enumerate() {
            if self.matched[i].is_some() {
                continue;
            }
            let sides: &[Side] = if criterion.both_colours {
                &[Side::White, Side::Black]
            } else {
                &[Side::White]
            };
            for &side in sides {
                let slot = side as usize;
                if criterion_holds_for_side(criterion, board, side) {
                    self.depth[i][slot] += 1;
                    if self.depth[i][slot] >= criterion.move_depth.max(1) {
                        self.matched[i] = Some(side);
                    }
                } else {
                    self.depth[i][slot] = 0;
                }
            }
        }
    }

    /// Any criterion matched so far, as `(criterion index, matched side)`.
    pub fn any_match(&self) -> Option<(usize, Side)> {
        self.matched
            .iter()
            .enumerate()
            .find_map(|(i, m)| m.map(|side| (i, side)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::board::Board;
    use board::move_generation::MoveGenerator;
    use board::san::decode_and_apply;

    #[test]
    fn stability_requires_consecutive_plies() {
        // White queen traded off at some ply; require "white has 0 queens"
        // to hold for 2 consecutive plies before matching.
        let criterion = MaterialCriterion {
            constraints: vec![PieceConstraint {
                kind: PieceKind::Queen,
                occurs: Occurs::Exactly(0),
            }],
            both_colours: false,
            move_depth: 2,
            add_match_tag: false,
        };
        let criteria = vec![criterion];
        let mut matcher = MaterialMatcher::new(&criteria);

        let move_gen = MoveGenerator::new();
        let mut board = Board::default_board();
        matcher.observe(&board); // still has queen -> no match

        for mv in ["e4", "e5", "Qh5", "Nc6", "Qxh7"] {
            let applied = decode_and_apply(&board, &move_gen, mv, false).unwrap();
            board = applied.board;
            matcher.observe(&board);
        }
        assert!(matcher.any_match().is_none());

        for mv in ["Nf6", "Qxf6", "exf6"] {
            let applied = decode_and_apply(&board, &move_gen, mv, false).unwrap();
            board = applied.board;
            matcher.observe(&board);
        }
        // After Qxf6 (white has 0 queens) then exf6, depth reaches 2.
        assert_eq!(matcher.any_match().map(|(_, s)| s), Some(Side::White));
    }
}
