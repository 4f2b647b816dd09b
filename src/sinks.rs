//! Concrete [`pipeline::driver::GameSink`] implementations: one renderer
//! per [`OutputFormat`], writing matched/duplicate/non-matching games to up
//! to three independent output streams (spec §4.7's "output sinks (main,
//! duplicates, non-matching)").

use std::io::Write;

use pipeline::config::OutputFormat;
use pipeline::driver::GameSink;
use pipeline::game::Game;

use crate::render;

pub struct FileSink {
    format: OutputFormat,
    max_line_length: u32,
    main: Box<dyn Write>,
    non_matching: Option<Box<dyn Write>>,
    duplicates: Option<Box<dyn Write>>,
}

impl FileSink {
    pub fn new(
        format: OutputFormat,
        max_line_length: u32,
        main: Box<dyn Write>,
        non_matching: Option<Box<dyn Write>>,
        duplicates: Option<Box<dyn Write>>,
    ) -> Self {
        Self {
            format,
            max_line_length,
            main,
            non_matching,
            duplicates,
        }
    }

    fn render(&self, game: &Game) -> String {
        let wrap = if self.format.wraps_lines() { self.max_line_length } else { 0 };
        match self.format {
            OutputFormat::Pgn => render::render_pgn(game, wrap),
            OutputFormat::Epd => render::render_epd(game),
            OutputFormat::Fen => render::render_fen(game),
            OutputFormat::Lalg
            | OutputFormat::Halg
            | OutputFormat::Elalg
            | OutputFormat::Xlalg
            | OutputFormat::Xolalg
            | OutputFormat::Uci
            | OutputFormat::ChessMaster => render::render_long_algebraic(game, self.format),
            OutputFormat::Json => render::render_json(game),
            OutputFormat::Tsv => render::render_tsv(game),
        }
    }
}

impl GameSink for FileSink {
    fn accept_matched(&mut self, game: &Game, source_file: &str, game_number: u32) {
        let text = self.render(game);
        if let Err(err) = self.main.write_all(text.as_bytes()) {
            tracing::warn!(source_file, game_number, error = %err, "failed to write matched game");
        }
    }

    fn accept_duplicate(
        &mut self,
        game: &Game,
        source_file: &str,
        game_number: u32,
        prior_file: &str,
        prior_number: u32,
    ) {
        tracing::debug!(source_file, game_number, prior_file, prior_number, "duplicate game");
        let text = self.render(game);
        if let Some(writer) = self.duplicates.as_mut() {
            let _ = writer.write_all(text.as_bytes());
        }
    }

    fn accept_non_matching(&mut self, game: &Game, _source_file: &str, _game_number: u32) {
        let text = self.render(game);
        if let Some(writer) = self.non_matching.as_mut() {
            let _ = writer.write_all(text.as_bytes());
        }
    }
}
