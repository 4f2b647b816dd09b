//! The [`Game`](crate::game::Game) tag table: §3's "dense integer-indexed
//! mapping from known tag name to string value, extensible by the lexer when
//! unknown tag names are seen".

use std::fmt;

/// The Seven Tag Roster, in export order, plus the handful of widely used
/// tags the match engine has direct predicates for. Anything else is an
/// "extra" tag, kept in first-seen order.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KnownTag {
    Event = 0,
    Site,
    Date,
    Round,
    White,
    Black,
    Result,
    WhiteElo,
    BlackElo,
    Eco,
    Fen,
    SetUp,
    PlyCount,
    Variant,
    TimeControl,
    Termination,
    WhiteRatingDiff,
    BlackRatingDiff,
}

impl KnownTag {
    pub const COUNT: usize = 18;
    pub const SEVEN_TAG_ROSTER: [KnownTag; 7] = [
        KnownTag::Event,
        KnownTag::Site,
        KnownTag::Date,
        KnownTag::Round,
        KnownTag::White,
        KnownTag::Black,
        KnownTag::Result,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KnownTag::Event => "Event",
            KnownTag::Site => "Site",
            KnownTag::Date => "Date",
            KnownTag::Round => "Round",
            KnownTag::White => "White",
            KnownTag::Black => "Black",
            KnownTag::Result => "Result",
            KnownTag::WhiteElo => "WhiteElo",
            KnownTag::BlackElo => "BlackElo",
            KnownTag::Eco => "ECO",
            KnownTag::Fen => "FEN",
            KnownTag::SetUp => "SetUp",
            KnownTag::PlyCount => "PlyCount",
            KnownTag::Variant => "Variant",
            KnownTag::TimeControl => "TimeControl",
            KnownTag::Termination => "Termination",
            KnownTag::WhiteRatingDiff => "WhiteRatingDiff",
            KnownTag::BlackRatingDiff => "BlackRatingDiff",
        }
    }

    pub fn from_name(name: &str) -> Option<KnownTag> {
        match name {
            "Event" => Some(KnownTag::Event),
            "Site" => Some(KnownTag::Site),
            "Date" => Some(KnownTag::Date),
            "Round" => Some(KnownTag::Round),
            "White" => Some(KnownTag::White),
            "Black" => Some(KnownTag::Black),
            "Result" => Some(KnownTag::Result),
            "WhiteElo" => Some(KnownTag::WhiteElo),
            "BlackElo" => Some(KnownTag::BlackElo),
            "ECO" => Some(KnownTag::Eco),
            "FEN" => Some(KnownTag::Fen),
            "SetUp" => Some(KnownTag::SetUp),
            "PlyCount" => Some(KnownTag::PlyCount),
            "Variant" => Some(KnownTag::Variant),
            "TimeControl" => Some(KnownTag::TimeControl),
            "Termination" => Some(KnownTag::Termination),
            "WhiteRatingDiff" => Some(KnownTag::WhiteRatingDiff),
            "BlackRatingDiff" => Some(KnownTag::BlackRatingDiff),
            _ => None,
        }
    }
}

/// Tag storage for one game: known tags in a dense array for O(1) predicate
/// access, unknown tags in an order-preserving side list.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    known: [Option<String>; KnownTag::COUNT],
    extra: Vec<(String, String)>,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: String) {
        match KnownTag::from_name(name) {
            Some(tag) => self.known[tag as usize] = Some(value),
            None => {
                if let Some(existing) = self.extra.iter_mut().find(|(n, _)| n == name) {
                    existing.1 = value;
                } else {
                    self.extra.push((name.to_string(), value));
                }
            }
        }
    }

    pub fn get(&self, tag: KnownTag) -> Option<&str> {
        self.known[tag as usize].as_deref()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        match KnownTag::from_name(name) {
            Some(tag) => self.get(tag),
            None => self
                .extra
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// Iterate the Seven Tag Roster in export order, substituting `"?"` for
    /// any that are missing, per the PGN export standard.
    pub fn seven_tag_roster(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        KnownTag::SEVEN_TAG_ROSTER.iter().map(move |tag| {
            (
                tag.name(),
                self.get(*tag).map(str::to_string).unwrap_or_else(|| "?".to_string()),
            )
        })
    }

    /// Remaining known tags (outside the roster) with a value set, followed
    /// by extra/unknown tags in first-seen order.
    pub fn remaining_tags(&self) -> Vec<(String, String)> {
        const NON_ROSTER: [KnownTag; KnownTag::COUNT - 7] = [
            KnownTag::WhiteElo,
            KnownTag::BlackElo,
            KnownTag::Eco,
            KnownTag::Fen,
            KnownTag::SetUp,
            KnownTag::PlyCount,
            KnownTag::Variant,
            KnownTag::TimeControl,
            KnownTag::Termination,
            KnownTag::WhiteRatingDiff,
            KnownTag::BlackRatingDiff,
        ];
        let mut out = Vec::new();
        for tag in NON_ROSTER {
            if let Some(v) = &self.known[tag as usize] {
                out.push((tag.name().to_string(), v.clone()));
            }
        }
        out.extend(self.extra.iter().cloned());
        out
    }

    pub fn len(&self) -> usize {
        self.known.iter().filter(|v| v.is_some()).count() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for TagTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.seven_tag_roster() {
            writeln!(f, "[{name} \"{value}\"]")?;
        }
        for (name, value) in self.remaining_tags() {
            writeln!(f, "[{name} \"{value}\"]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_round_trip() {
        let mut tags = TagTable::new();
        tags.set("White", "Carlsen".to_string());
        tags.set("Unknown", "value".to_string());
        assert_eq!(tags.get(KnownTag::White), Some("Carlsen"));
        assert_eq!(tags.get_by_name("Unknown"), Some("value"));
    }

    #[test]
    fn roster_defaults_to_question_mark() {
        let tags = TagTable::new();
        let roster: Vec<_> = tags.seven_tag_roster().collect();
        assert_eq!(roster[0], ("Event", "?".to_string()));
    }
}
