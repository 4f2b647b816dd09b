//! Text renderers for each output format named in spec §6. Each renderer
//! takes a fully replayed [`pipeline::game::Game`] and produces the bytes a
//! sink writes out; line-wrapping and comment/variation suppression are
//! driven by [`pipeline::config::OutputFormat`].

use pipeline::config::OutputFormat;
use pipeline::game::{Game, GameMove, Variation};

/// Renders one game as PGN: tag pairs, then move text wrapped at
/// `max_line_length` columns, recursing into sub-variations.
pub fn render_pgn(game: &Game, max_line_length: u32) -> String {
    let mut out = String::new();
    out.push_str(&game.tags.to_string());
    out.push('\n');

    for comment in &game.prefix_comments {
        out.push('{');
        out.push_str(comment);
        out.push('}');
        out.push(' ');
    }

    let starts_with_black = game
        .tags
        .get(pipeline::tag::KnownTag::Fen)
        .map(fen_side_to_move_is_black)
        .unwrap_or(false);

    let mut wrapper = LineWrapper::new(max_line_length);
    write_moves(&game.moves, true, starts_with_black, &mut wrapper);
    let result = game.terminating_result.as_deref().unwrap_or("*");
    wrapper.push(result);

    out.push_str(&wrapper.finish());
    out.push('\n');
    out
}

/// `true` if the FEN's side-to-move field is `b`, for games/variations that
/// start from a custom `SetUp`/960 position with Black to move (spec §8).
fn fen_side_to_move_is_black(fen: &str) -> bool {
    fen.split_whitespace().nth(1) == Some("b")
}

/// Renders a flat move list, opening with `N...` instead of `N.` when the
/// list starts with Black to move (a custom-FEN game, or a variation whose
/// first move replaces a Black move).
fn write_moves(moves: &[GameMove], is_main_line: bool, starts_with_black: bool, wrapper: &mut LineWrapper) {
    for (ply, mv) in moves.iter().enumerate() {
        let black_to_move = if ply % 2 == 0 { starts_with_black } else { !starts_with_black };
        let move_number = ply / 2 + 1;
        if !black_to_move {
            wrapper.push(&format!("{move_number}."));
        } else if ply == 0 {
            wrapper.push(&format!("{move_number}..."));
        }
        wrapper.push(&mv.san);
        for nag in &mv.nags {
            wrapper.push(&format!("${nag}"));
        }
        for comment in &mv.comments {
            wrapper.push(&format!("{{{comment}}}"));
        }
        for variation in &mv.variations {
            wrapper.push("(");
            write_variation(variation, black_to_move, wrapper);
            wrapper.push(")");
        }
        if let Some(result) = &mv.terminating_result {
            if !is_main_line {
                wrapper.push(result);
            }
        }
    }
}

fn write_variation(variation: &Variation, starts_with_black: bool, wrapper: &mut LineWrapper) {
    if let Some(comment) = &variation.prefix_comment {
        wrapper.push(&format!("{{{comment}}}"));
    }
    write_moves(&variation.moves, false, starts_with_black, wrapper);
    if let Some(comment) = &variation.suffix_comment {
        wrapper.push(&format!("{{{comment}}}"));
    }
}

/// Greedy line-wrapper: appends space-separated tokens, breaking to a new
/// line once the current one would exceed the configured width. A width of
/// `0` disables wrapping entirely (spec §6 TSV/JSON formats).
struct LineWrapper {
    width: u32,
    lines: Vec<String>,
    current: String,
}

impl LineWrapper {
    fn new(width: u32) -> Self {
        Self {
            width,
            lines: Vec::new(),
            current: String::new(),
        }
    }

    fn push(&mut self, token: &str) {
        if self.width > 0 && !self.current.is_empty() {
            let projected = self.current.len() + 1 + token.len();
            if projected > self.width as usize {
                self.lines.push(std::mem::take(&mut self.current));
            }
        }
        if !self.current.is_empty() {
            self.current.push(' ');
        }
        self.current.push_str(token);
    }

    fn finish(mut self) -> String {
        if !self.current.is_empty() {
            self.lines.push(self.current);
        }
        self.lines.join("\n")
    }
}

/// FEN sink: the reached final position, nothing else.
pub fn render_fen(game: &Game) -> String {
    format!("{}\n", game.final_fen)
}

/// EPD sink (SPEC_FULL §4 supplemented feature): FEN plus `id`/`acd`-style
/// opcodes carrying the matched tag values, since EPD has no header of its
/// own.
pub fn render_epd(game: &Game) -> String {
    let mut out = game.final_fen.clone();
    let event = game.tags.get(pipeline::tag::KnownTag::Event).unwrap_or("?");
    let white = game.tags.get(pipeline::tag::KnownTag::White).unwrap_or("?");
    let black = game.tags.get(pipeline::tag::KnownTag::Black).unwrap_or("?");
    out.push_str(&format!(" id \"{event}: {white} vs {black}\";"));
    out.push_str(&format!(" acd {};", game.ply_count()));
    out.push('\n');
    out
}

/// Long-algebraic move-text sinks (LALG/HALG/ELALG/XLALG/XOLALG/UCI/
/// ChessMaster): one space-separated move-text line per game, each move
/// rendered per the selected flavour, no comments/variations/NAGs.
pub fn render_long_algebraic(game: &Game, format: OutputFormat) -> String {
    let tokens: Vec<String> = game
        .moves
        .iter()
        .filter_map(|mv| mv.mv.as_ref().map(|engine_move| long_algebraic_token(mv, engine_move, format)))
        .collect();
    format!("{}\n", tokens.join(" "))
}

fn long_algebraic_token(game_move: &GameMove, engine_move: &board::moves::Move, format: OutputFormat) -> String {
    use board::pieces::{PIECE_SHORT_NAMES, SQUARE_NAME};

    if engine_move.is_castle() && matches!(format, OutputFormat::Xolalg) {
        let is_kingside = engine_move.to() > engine_move.from();
        return if is_kingside { "O-O".to_string() } else { "O-O-O".to_string() };
    }

    let from = SQUARE_NAME[engine_move.from() as usize];
    let to = SQUARE_NAME[engine_move.to() as usize];
    let promotion = engine_move
        .promotion_piece()
        .map(|p| PIECE_SHORT_NAMES[p as usize].to_ascii_lowercase().to_string())
        .unwrap_or_default();

    let base = match format {
        OutputFormat::Halg => format!("{from}-{to}{promotion}"),
        _ => format!("{from}{to}{promotion}"),
    };

    let piece_letter = PIECE_SHORT_NAMES[engine_move.piece() as usize];
    let prefixed = match format {
        OutputFormat::Elalg | OutputFormat::Xlalg => format!("{piece_letter}{base}"),
        _ => base,
    };

    match format {
        OutputFormat::Xlalg => match game_move.check_status {
            board::san::CheckStatus::Checkmate => format!("{prefixed}#"),
            board::san::CheckStatus::Check => format!("{prefixed}+"),
            board::san::CheckStatus::None => prefixed,
        },
        _ => prefixed,
    }
}

/// JSON sink: disables comment/variation/result preservation (spec §6), so
/// only tags and the bare move list are emitted.
pub fn render_json(game: &Game) -> String {
    let tags: serde_json::Map<String, serde_json::Value> = game
        .tags
        .seven_tag_roster()
        .map(|(k, v)| (k.to_string(), v))
        .chain(game.tags.remaining_tags())
        .map(|(k, v)| (k, serde_json::Value::String(v)))
        .collect();
    let moves: Vec<&str> = game.moves.iter().map(|m| m.san.as_str()).collect();
    let value = serde_json::json!({
        "tags": tags,
        "moves": moves,
        "final_fen": game.final_fen,
    });
    format!("{}\n", value)
}

/// TSV sink: one tab-separated row per game, no line-wrapping (spec §6).
pub fn render_tsv(game: &Game) -> String {
    let white = game.tags.get(pipeline::tag::KnownTag::White).unwrap_or("?");
    let black = game.tags.get(pipeline::tag::KnownTag::Black).unwrap_or("?");
    let result = game.tags.get(pipeline::tag::KnownTag::Result).unwrap_or("*");
    let moves: Vec<&str> = game.moves.iter().map(|m| m.san.as_str()).collect();
    format!("{white}\t{black}\t{result}\t{}\n", moves.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_wrapper_breaks_at_width() {
        let mut wrapper = LineWrapper::new(10);
        wrapper.push("1.");
        wrapper.push("e4");
        wrapper.push("e5");
        let text = wrapper.finish();
        assert!(text.lines().all(|line| line.len() <= 10 || !line.contains(' ')));
    }

    #[test]
    fn render_pgn_includes_seven_tag_roster() {
        let game = Game::new();
        let text = render_pgn(&game, 75);
        assert!(text.contains("[Event \"?\"]"));
    }

    #[test]
    fn render_tsv_has_no_wrapping() {
        let mut game = Game::new();
        game.moves.push(GameMove::new("e4".to_string()));
        let text = render_tsv(&game);
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn render_pgn_opens_with_ellipsis_when_black_moves_first() {
        let mut game = Game::new();
        game.tags.set(
            "FEN",
            "rnbqkbnr/ppp1pppp/8/3p4/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1".to_string(),
        );
        game.moves.push(GameMove::new("Nf6".to_string()));
        let text = render_pgn(&game, 75);
        assert!(text.contains("1...Nf6"), "expected ellipsis opening, got: {text}");
    }

    #[test]
    fn render_pgn_keeps_plain_move_number_when_white_moves_first() {
        let mut game = Game::new();
        game.moves.push(GameMove::new("e4".to_string()));
        let text = render_pgn(&game, 75);
        assert!(text.contains("1.e4"), "expected plain move number, got: {text}");
        assert!(!text.contains("1...e4"));
    }
}
