//! Textual move-sequence matching (spec §3 `TextualVariation`, §4.5
//! "Textual-variation matching"): straight (strict order) and permutation
//! (default `-v`) matching against a game's SAN move list, with wildcard
//! and disallowed-move sentinels.

use board::side::Side;

/// One half-move slot in a textual variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantToken {
    /// `*` — matches any move at this ply.
    Wildcard,
    /// `!SAN` — fails the match if this exact SAN is played at the
    /// relevant ply (straight mode) or by the relevant side within the
    /// scanned window (permutation mode); otherwise tolerant.
    Disallowed(String),
    /// A plain SAN, or `SAN1|SAN2|...` — any of the listed SANs matches.
    Literal(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMove {
    pub token: VariantToken,
}

impl VariantMove {
    pub fn parse(text: &str) -> Self {
        let token = if text == "*" {
            VariantToken::Wildcard
        } else if let Some(rest) = text.strip_prefix('!') {
            VariantToken::Disallowed(rest.to_string())
        } else {
            VariantToken::Literal(text.split('|').map(str::to_string).collect())
        };
        Self { token }
    }
}

/// An ordered half-move sequence describing a game's opening (or any
/// stretch), used by both straight and permutation matching.
#[derive(Debug, Clone, Default)]
pub struct TextualVariation {
    pub moves: Vec<VariantMove>,
}

impl TextualVariation {
    /// Parses a whitespace-tokenised variation, e.g. `["e4", "c5", "!Nf3"]`.
    pub fn parse(tokens: &[&str]) -> Self {
        Self {
            moves: tokens.iter().map(|t| VariantMove::parse(t)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    fn side_at(ply_index: usize) -> Side {
        if ply_index % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    /// Count of wildcard/disallowed slots for one side; cached by the
    /// spec to skip permutation bookkeeping when a variation has neither.
    pub fn has_wildcards_or_disallowed(&self) -> bool {
        self.moves
            .iter()
            .any(|m| !matches!(m.token, VariantToken::Literal(_)))
    }

    /// Strict in-order comparison against the game's SAN list.
    pub fn straight_match(&self, game_sans: &[String]) -> bool {
        if game_sans.len() < self.moves.len() {
            return false;
        }
        for (actual, vm) in game_sans.iter().zip(self.moves.iter()) {
            match &vm.token {
                VariantToken::Wildcard => {}
                VariantToken::Disallowed(san) => {
                    if actual == san {
                        return false;
                    }
                }
                VariantToken::Literal(alts) => {
                    if !alts.iter().any(|a| a == actual) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Two-stage permutation matcher (spec §4.5, the default `-v` mode).
    pub fn permutation_match(&self, game_sans: &[String]) -> bool {
        let n = self.moves.len();
        if game_sans.len() < n {
            return false;
        }
        let window = &game_sans[..n];

        // Stage one: a disallowed slot's SAN must not appear anywhere at
        // its side within the scanned window, regardless of position.
        for (i, vm) in self.moves.iter().enumerate() {
            if let VariantToken::Disallowed(san) = &vm.token {
                let side = Self::side_at(i);
                let played = window
                    .iter()
                    .enumerate()
                    .any(|(j, actual)| Self::side_at(j) == side && actual == san);
                if played {
                    return false;
                }
            }
        }

        // Stage two: per side, assign literal slots to distinct plies
        // (earliest unused match first), then check enough plies remain
        // for the side's wildcard/disallowed slots.
        for side in [Side::White, Side::Black] {
            let plies: Vec<&String> = window
                .iter()
                .enumerate()
                .filter(|(j, _)| Self::side_at(*j) == side)
                .map(|(_, s)| s)
                .collect();
            let mut used = vec![false; plies.len()];
            let mut wildcard_count = 0usize;

            for (i, vm) in self.moves.iter().enumerate() {
                if Self::side_at(i) != side {
                    continue;
                }
                match &vm.token {
                    VariantToken::Literal(alts) => {
                        let slot = used
                            .iter()
                            .enumerate()
                            .find(|(idx, used_flag)| !**used_flag && alts.iter().any(|a| a == plies[*idx]))
                            .map(|(idx, _)| idx);
                        match slot {
                            Some(idx) => used[idx] = true,
                            None => return false,
                        }
                    }
                    VariantToken::Wildcard | VariantToken::Disallowed(_) => wildcard_count += 1,
                }
            }

            let remaining = used.iter().filter(|u| !**u).count();
            if remaining < wildcard_count {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sans(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn straight_match_respects_wildcards() {
        let v = TextualVariation::parse(&["e4", "*", "Nf3"]);
        assert!(v.straight_match(&sans(&["e4", "c5", "Nf3", "Nc6"])));
        assert!(!v.straight_match(&sans(&["e4", "c5", "Nc3"])));
    }

    #[test]
    fn straight_match_disallowed_fails_on_exact_san() {
        let v = TextualVariation::parse(&["e4", "c5", "!Nf3"]);
        assert!(v.straight_match(&sans(&["e4", "c5", "c3"])));
        assert!(!v.straight_match(&sans(&["e4", "c5", "Nf3"])));
    }

    #[test]
    fn permutation_match_scenario_from_spec() {
        let v = TextualVariation::parse(&["e4", "c5", "!Nf3"]);
        assert!(v.permutation_match(&sans(&["e4", "c5", "c3", "d5"])));
        assert!(!v.permutation_match(&sans(&["e4", "c5", "Nf3", "d6"])));
    }

    #[test]
    fn agrees_with_straight_match_absent_wildcards() {
        let v = TextualVariation::parse(&["e4", "e5", "Nf3"]);
        let sans = sans(&["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(v.straight_match(&sans), v.permutation_match(&sans));
    }

    #[test]
    fn pipe_alternatives_match_either_san() {
        let v = TextualVariation::parse(&["e4|d4"]);
        assert!(v.straight_match(&sans(&["d4"])));
        assert!(v.straight_match(&sans(&["e4"])));
        assert!(!v.straight_match(&sans(&["c4"])));
    }
}
