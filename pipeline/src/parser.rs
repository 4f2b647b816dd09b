//! Recursive-descent parser over the lexer's token stream (spec §4.4).
//!
//! One-token lookahead, matching the grammar in the spec verbatim:
//!
//! ```text
//! Game       := {COMMENT} TagList [NAG*] MoveList [COMMENT] [TerminatingResult]
//! TagList    := {Tag}
//! MoveList   := {MoveAndVariants}
//! MoveAndVariants
//!            := [MoveNumber] MoveUnit {Variation} [COMMENT]
//! MoveUnit   := MOVE [CHECK_GLYPH] [NAG* [COMMENT]]
//! Variation  := '(' [COMMENT] MoveList [TerminatingResult] [COMMENT] ')' [COMMENT]
//! ```

use crate::error::ParseError;
use crate::game::{Game, GameMove, Variation};
use crate::lexer::{Lexer, LexerConfig, Token, TokenKind};

#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub lexer: LexerConfig,
    /// A game with recoverable diagnostics (missing result, stray `]`,
    /// missing `)`) is retained in a marked-broken state rather than
    /// discarded.
    pub keep_broken_games: bool,
    pub allow_null_moves: bool,
    /// Move a variation's prefix comment onto its first move, working
    /// around a known bug in an upstream producer.
    pub lichess_comment_fix: bool,
    pub reject_inconsistent_results: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lexer: LexerConfig::default(),
            keep_broken_games: true,
            allow_null_moves: false,
            lichess_comment_fix: false,
            reject_inconsistent_results: false,
        }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Token,
    config: ParserConfig,
    /// Diagnostics from lex errors recovered while fetching the lookahead
    /// that hasn't yet been attributed to a `Game` (either gathered before
    /// the first game starts, or while scanning ahead into the next game
    /// after the current one was abandoned as malformed).
    pending_diagnostics: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(bytes: &'a [u8], config: ParserConfig) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(bytes, config.lexer);
        let mut pending_diagnostics = Vec::new();
        let lookahead = lex_next(&mut lexer, &mut pending_diagnostics);
        Ok(Self {
            lexer,
            lookahead,
            config,
            pending_diagnostics,
        })
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = lex_next(&mut self.lexer, &mut self.pending_diagnostics);
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn at_eof(&self) -> bool {
        self.lookahead.kind == TokenKind::Eof
    }

    /// Parse one game, or `None` at end of input.
    pub fn parse_game(&mut self) -> Result<Option<Game>, ParseError> {
        if self.at_eof() {
            return Ok(None);
        }

        let mut game = Game::new();
        game.start_line = self.lookahead.line;
        game.diagnostics.append(&mut self.pending_diagnostics);

        // {COMMENT} before the tag list.
        while let TokenKind::Comment(text) = self.lookahead.kind.clone() {
            game.prefix_comments.push(text);
            self.advance()?;
        }

        // TagList := {Tag}
        while let TokenKind::Tag { name, value } = self.lookahead.kind.clone() {
            game.tags.set(&name, value);
            self.advance()?;
        }

        // [NAG*] tolerated between tags and move text, discarded: no
        // attachment point is specified for them.
        while matches!(self.lookahead.kind, TokenKind::Nag(_)) {
            self.advance()?;
        }

        game.moves = self.parse_move_list(0, &mut game.diagnostics)?;

        // Trailing comment before the terminating result attaches to the
        // last move.
        while let TokenKind::Comment(text) = self.lookahead.kind.clone() {
            if let Some(last) = game.moves.last_mut() {
                last.comments.push(text);
            } else {
                game.prefix_comments.push(text);
            }
            self.advance()?;
        }

        if let TokenKind::TerminatingResult(result) = self.lookahead.kind.clone() {
            game.terminating_result = Some(result);
            self.advance()?;
        } else if !self.at_eof() {
            game.diagnostics
                .push(format!("line {}: missing terminating result", self.lookahead.line));
            if !self.config.keep_broken_games {
                game.moves_ok = false;
            }
        }

        if let Some(last) = game.moves.last_mut() {
            if last.terminating_result.is_none() {
                last.terminating_result = game.terminating_result.clone();
            }
        }

        self.reconcile_result(&mut game)?;
        game.end_line = self.lexer.line();
        game.diagnostics.append(&mut self.pending_diagnostics);

        // If the game is malformed beyond recovery, fast-forward to the
        // next tag so the driver can keep processing subsequent games.
        // Diagnostics from this scan belong to whatever game follows, not
        // this one, so they stay in `pending_diagnostics` until then.
        if !self.at_eof() && !matches!(self.lookahead.kind, TokenKind::Tag { .. }) {
            self.lexer.skip_to_next_game();
            self.lookahead = lex_next(&mut self.lexer, &mut self.pending_diagnostics);
        }

        Ok(Some(game))
    }

    /// Fills a missing/`?` `Result` tag from the terminating result, or
    /// flags inconsistency when both are present and disagree.
    fn reconcile_result(&self, game: &mut Game) -> Result<(), ParseError> {
        let tag_result = game.tags.get(crate::tag::KnownTag::Result).map(str::to_string);
        let Some(terminator) = game.terminating_result.clone() else {
            return Ok(());
        };
        match tag_result {
            None => game.tags.set("Result", terminator),
            Some(tag) if tag == "?" || tag.is_empty() => game.tags.set("Result", terminator),
            Some(tag) if tag != terminator => {
                if self.config.reject_inconsistent_results {
                    game.moves_ok = false;
                    game.diagnostics.push(format!(
                        "Result tag '{tag}' inconsistent with terminating result '{terminator}'"
                    ));
                }
            }
            Some(_) => {}
        }
        Ok(())
    }

    fn parse_move_list(
        &mut self,
        depth: u32,
        diagnostics: &mut Vec<String>,
    ) -> Result<Vec<GameMove>, ParseError> {
        let mut moves = Vec::new();
        loop {
            match &self.lookahead.kind {
                TokenKind::MoveNumber(_) => {
                    self.advance()?;
                }
                TokenKind::Move(_) => {
                    let mv = self.parse_move_and_variants(depth, diagnostics)?;
                    moves.push(mv);
                }
                _ => break,
            }
        }
        Ok(moves)
    }

    fn parse_move_and_variants(
        &mut self,
        depth: u32,
        diagnostics: &mut Vec<String>,
    ) -> Result<GameMove, ParseError> {
        let TokenKind::Move(san) = self.lookahead.kind.clone() else {
            unreachable!("caller checked for Move token");
        };
        let line = self.lookahead.line;
        self.advance()?;

        if (san == "--" || san == "Z0") && depth == 0 && !self.config.allow_null_moves {
            diagnostics.push(format!("line {line}: null move not allowed in main line"));
        }

        let mut game_move = GameMove::new(san);

        while let TokenKind::Nag(n) = self.lookahead.kind {
            game_move.nags.push(n);
            self.advance()?;
        }

        if let TokenKind::Comment(text) = self.lookahead.kind.clone() {
            game_move.comments.push(text);
            self.advance()?;
        }

        while matches!(self.lookahead.kind, TokenKind::RavStart) {
            let variation = self.parse_variation(depth, &mut game_move, diagnostics)?;
            game_move.variations.push(variation);
        }

        if let TokenKind::Comment(text) = self.lookahead.kind.clone() {
            game_move.comments.push(text);
            self.advance()?;
        }

        Ok(game_move)
    }

    fn parse_variation(
        &mut self,
        depth: u32,
        enclosing_move: &mut GameMove,
        diagnostics: &mut Vec<String>,
    ) -> Result<Variation, ParseError> {
        self.advance()?; // consume '('
        let mut variation = Variation::default();

        if let TokenKind::Comment(text) = self.lookahead.kind.clone() {
            variation.prefix_comment = Some(text);
            self.advance()?;
        }

        variation.moves = self.parse_move_list(depth + 1, diagnostics)?;

        if let TokenKind::TerminatingResult(result) = self.lookahead.kind.clone() {
            variation.terminating_result = Some(result);
            self.advance()?;
        }

        // A comment here (before the closing paren) trails the variation's
        // last move, mirroring the main line's "trailing comment before the
        // terminator attaches to the last move" rule.
        if let TokenKind::Comment(text) = self.lookahead.kind.clone() {
            match variation.moves.last_mut() {
                Some(last) => last.comments.push(text),
                None => variation.suffix_comment = Some(text),
            }
            self.advance()?;
        }

        if matches!(self.lookahead.kind, TokenKind::RavEnd) {
            self.advance()?;
        } else {
            diagnostics.push(format!(
                "line {}: missing ')' closing variation",
                self.lookahead.line
            ));
        }

        if self.config.lichess_comment_fix {
            if let Some(comment) = variation.prefix_comment.take() {
                if let Some(first) = variation.moves.first_mut() {
                    first.comments.insert(0, comment);
                } else {
                    variation.prefix_comment = Some(comment);
                }
            }
        }

        // The comment immediately after ')' belongs to the enclosing move,
        // per the spec's "its suffix to the enclosing move".
        if let TokenKind::Comment(text) = self.lookahead.kind.clone() {
            enclosing_move.comments.push(text);
            self.advance()?;
        }

        Ok(variation)
    }
}

/// Fetches the next token, recovering from any `LexError` (spec §7: lex
/// errors are diagnostics, not hard failures). A corrupted byte means the
/// rest of the current game's move text can no longer be trusted, so
/// recovery jumps straight to the next game's opening `[` rather than
/// retrying one byte at a time; the diagnostic is recorded so the bytes
/// that vanished aren't silently dropped.
fn lex_next(lexer: &mut Lexer, diagnostics: &mut Vec<String>) -> Token {
    loop {
        match lexer.next_token() {
            Ok(tok) => return tok,
            Err(err) => {
                diagnostics.push(format!("line {}: {err}", lexer.line()));
                lexer.skip_to_next_game();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(src: &str) -> Game {
        let mut parser = Parser::new(src.as_bytes(), ParserConfig::default()).unwrap();
        parser.parse_game().unwrap().unwrap()
    }

    #[test]
    fn parses_tags_and_moves() {
        let game = parse_one(
            "[Event \"Test\"]\n[Site \"?\"]\n[Result \"1-0\"]\n\n1. e4 e5 2. Nf3 Nc6 1-0\n",
        );
        assert_eq!(game.tags.get(crate::tag::KnownTag::Event), Some("Test"));
        assert_eq!(game.moves.len(), 4);
        assert_eq!(game.terminating_result.as_deref(), Some("1-0"));
    }

    #[test]
    fn attaches_comment_to_preceding_move() {
        let game = parse_one("[Result \"*\"]\n\n1. e4 {good} e5 *\n");
        assert_eq!(game.moves[0].comments, vec!["good".to_string()]);
    }

    #[test]
    fn variation_attaches_to_preceding_move() {
        let game = parse_one("[Result \"*\"]\n\n1. e4 (1. d4 d5) e5 *\n");
        assert_eq!(game.moves[0].variations.len(), 1);
        assert_eq!(game.moves[0].variations[0].moves[0].san, "d4");
    }

    #[test]
    fn fills_result_tag_from_terminator() {
        let game = parse_one("[Event \"?\"]\n\n1. e4 e5 1-0\n");
        assert_eq!(game.tags.get(crate::tag::KnownTag::Result), Some("1-0"));
    }

    #[test]
    fn trailing_comment_after_variation_attaches_to_enclosing_move() {
        let game = parse_one("[Result \"*\"]\n\n1. e4 (1. d4) {after} e5 *\n");
        assert_eq!(game.moves[0].comments, vec!["after".to_string()]);
    }

    #[test]
    fn stray_byte_records_diagnostic_and_recovers_to_next_game() {
        let src = "[Event \"A\"]\n[Result \"*\"]\n\n1. e4 & e5 *\n\n\
                   [Event \"B\"]\n[Result \"*\"]\n\n1. d4 d5 *\n";
        let mut parser = Parser::new(src.as_bytes(), ParserConfig::default()).unwrap();

        let first = parser.parse_game().unwrap().unwrap();
        assert!(first.diagnostics.iter().any(|d| d.contains("stray token")));

        let second = parser.parse_game().unwrap().unwrap();
        assert_eq!(second.tags.get(crate::tag::KnownTag::Event), Some("B"));
        assert_eq!(second.moves.len(), 2);
    }
}
