use pipeline::config::Config;
use pipeline::driver::{Driver, GameSink};
use pipeline::game::Game;
use pipeline::match_engine::{TagName, TagOp, TagRule};
use pipeline::tag::KnownTag;

const TWO_GAMES: &[u8] = br#"[Event "Rated Blitz"]
[Site "Internet"]
[Date "2024.01.01"]
[Round "1"]
[White "Alpha"]
[Black "Beta"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0

[Event "Casual Game"]
[Site "Internet"]
[Date "2024.01.02"]
[Round "2"]
[White "Gamma"]
[Black "Delta"]
[Result "0-1"]

1. d4 d5 2. c4 e6 0-1
"#;

#[derive(Default)]
struct RecordingSink {
    matched: Vec<String>,
    non_matching: Vec<String>,
    duplicates: u32,
}

impl GameSink for RecordingSink {
    fn accept_matched(&mut self, game: &Game, _source_file: &str, _game_number: u32) {
        self.matched.push(game.tags.get(KnownTag::White).unwrap_or("").to_string());
    }

    fn accept_duplicate(
        &mut self,
        _game: &Game,
        _source_file: &str,
        _game_number: u32,
        _prior_file: &str,
        _prior_number: u32,
    ) {
        self.duplicates += 1;
    }

    fn accept_non_matching(&mut self, game: &Game, _source_file: &str, _game_number: u32) {
        self.non_matching.push(game.tags.get(KnownTag::White).unwrap_or("").to_string());
    }
}

#[test]
fn driver_splits_matched_and_non_matching_games_by_tag_rule() {
    let mut config = Config::new();
    config.criteria.tag.positive.push(TagRule {
        tag: TagName::Known(KnownTag::Event),
        op: TagOp::Eq,
        value: "Rated Blitz".to_string(),
    });

    let mut driver = Driver::new(&config);
    let mut sink = RecordingSink::default();
    driver.run_source(TWO_GAMES, "memory", &mut sink).unwrap();

    assert_eq!(sink.matched, vec!["Alpha".to_string()]);
    assert_eq!(sink.non_matching, vec!["Gamma".to_string()]);
    assert_eq!(sink.duplicates, 0);

    let counters = driver.counters();
    assert_eq!(counters.num_processed, 2);
    assert_eq!(counters.num_matched, 1);
    assert_eq!(counters.num_parse_errors, 0);
}

#[test]
fn driver_flags_repeated_game_as_duplicate() {
    let repeated = br#"[Event "E"]
[Site "S"]
[Date "????.??.??"]
[Round "1"]
[White "A"]
[Black "B"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0

[Event "E"]
[Site "S"]
[Date "????.??.??"]
[Round "2"]
[White "C"]
[Black "D"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0
"#;

    let mut config = Config::new();
    config.duplicate_policy = pipeline::config::DuplicatePolicy::SuppressDuplicates;
    let mut driver = Driver::new(&config);
    let mut sink = RecordingSink::default();
    driver.run_source(repeated, "memory", &mut sink).unwrap();

    assert_eq!(driver.counters().num_duplicates, 1);
    assert_eq!(sink.duplicates, 1);
    assert_eq!(sink.matched.len(), 1);
}

#[test]
fn driver_keeps_all_duplicates_under_default_policy() {
    let repeated = br#"[Event "E"]
[Site "S"]
[Date "????.??.??"]
[Round "1"]
[White "A"]
[Black "B"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0

[Event "E"]
[Site "S"]
[Date "????.??.??"]
[Round "2"]
[White "C"]
[Black "D"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0
"#;

    let config = Config::new();
    let mut driver = Driver::new(&config);
    let mut sink = RecordingSink::default();
    driver.run_source(repeated, "memory", &mut sink).unwrap();

    assert_eq!(driver.counters().num_duplicates, 1);
    assert_eq!(sink.duplicates, 0);
    assert_eq!(sink.matched.len(), 2);
}
