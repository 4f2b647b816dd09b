//! `pgnsift`: batch PGN ingest, validate, select and re-emit (spec §1).
//!
//! Wires the `pipeline` crate's parser/match-engine/driver together with a
//! `clap` CLI surface and concrete [`GameSink`] renderers. Library errors
//! are `thiserror`; this binary aggregates with `anyhow`, matching the
//! teacher's `chess`-uses-`thiserror`/binary-uses-`anyhow` split.

mod cli;
mod render;
mod sinks;

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use pipeline::config::Config;
use pipeline::driver::Driver;
use pipeline::eco::EcoTable;
use pipeline::game_number_range::parse_ranges;
use pipeline::match_engine::{TagName, TagOp, TagRule};

use cli::Cli;
use sinks::FileSink;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Some(eco_arg) = &cli.eco {
        return run_eco_mode(&cli, eco_arg);
    }

    let config = build_config(&cli)?;
    let input_files = collect_input_files(&cli)?;
    if input_files.is_empty() {
        anyhow::bail!("no input files given (pass paths or -f/--file-list)");
    }

    let main_writer = open_output_or_stdout(cli.output.as_deref())?;
    let non_matching_writer = cli.non_matching.as_deref().map(open_output).transpose()?;
    let duplicates_writer = cli.duplicates.as_deref().map(open_output).transpose()?;

    let mut sink = FileSink::new(
        config.output_format,
        config.max_line_length,
        main_writer,
        non_matching_writer,
        duplicates_writer,
    );

    let mut driver = Driver::new(&config);
    for path in &input_files {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let source_file = path.display().to_string();
        driver
            .run_source(&bytes, &source_file, &mut sink)
            .with_context(|| format!("parsing {}", path.display()))?;
    }

    let counters = driver.counters();
    if !cli.quiet {
        tracing::info!(
            processed = counters.num_processed,
            matched = counters.num_matched,
            duplicates = counters.num_duplicates,
            parse_errors = counters.num_parse_errors,
            "done"
        );
    }

    Ok(())
}

/// ECO mode (spec §6 `-e`): load the classification file and report its
/// size instead of running the normal ingest/select/re-emit pipeline.
fn run_eco_mode(cli: &Cli, eco_arg: &str) -> Result<()> {
    let path = if eco_arg.is_empty() {
        std::env::var("ECO_FILE")
            .map(PathBuf::from)
            .context("no ECO file given and ECO_FILE is not set")?
    } else {
        PathBuf::from(eco_arg)
    };
    let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let mut table = EcoTable::new();
    table.load(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    if !cli.quiet {
        tracing::info!(entries = table.len(), file = %path.display(), "loaded ECO table");
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::new();

    config.output_format = cli.format.into();
    config.max_line_length = cli.wrap;
    config.quiet = cli.quiet;
    config.fuzzy_match_depth = cli.fuzzy_depth;
    config.duplicate_index.fuzzy_depth = cli.fuzzy_depth;

    config.duplicate_policy = match (cli.suppress_duplicates, cli.suppress_originals) {
        (true, true) => anyhow::bail!("-U and -D are mutually exclusive"),
        (true, false) => pipeline::config::DuplicatePolicy::SuppressDuplicates,
        (false, true) => pipeline::config::DuplicatePolicy::SuppressOriginals,
        (false, false) => pipeline::config::DuplicatePolicy::KeepAll,
    };

    config.limits.first_game_number = cli.first_game_number;
    config.limits.game_limit = cli.game_limit;
    config.limits.maximum_matches = cli.max_matches;
    if let Some(spec) = &cli.select_only {
        config.limits.matching_game_numbers = parse_ranges(spec).map_err(anyhow::Error::msg)?;
    }
    if let Some(spec) = &cli.skip_matching {
        config.limits.skip_game_numbers = parse_ranges(spec).map_err(anyhow::Error::msg)?;
    }

    config.criteria.require_any_comment = cli.comment_only;

    for raw_rule in &cli.tag_rules {
        config.criteria.tag.positive.push(parse_tag_rule(raw_rule)?);
    }

    if let Some(bounds) = &cli.move_bounds {
        let (lower, upper) = bounds
            .split_once('-')
            .with_context(|| format!("bad move bounds: {bounds}"))?;
        config.criteria.move_bound = Some(pipeline::match_engine::MoveBoundPredicate {
            lower: lower.trim().parse().context("bad lower move bound")?,
            upper: upper.trim().parse().context("bad upper move bound")?,
            by_move_number: false,
        });
    }

    if let Some(pattern) = &cli.fen_pattern {
        config
            .criteria
            .fen_patterns
            .insert(pattern)
            .map_err(|e| anyhow::anyhow!("bad FEN pattern {pattern:?}: {e}"))?;
    }

    Ok(config)
}

/// Parses one `-T` tag rule of the form `Name=Value`, `Name!=Value`,
/// `Name<Value`, `Name>Value`, `Name<=Value`, `Name>=Value` or
/// `Name=~Pattern`.
fn parse_tag_rule(raw: &str) -> Result<TagRule> {
    const OPS: [(&str, TagOp); 7] = [
        ("=~", TagOp::RegexMatch),
        ("!=", TagOp::Ne),
        ("<=", TagOp::Le),
        (">=", TagOp::Ge),
        ("=", TagOp::Eq),
        ("<", TagOp::Lt),
        (">", TagOp::Gt),
    ];
    for (token, op) in OPS {
        if let Some((name, value)) = raw.split_once(token) {
            let tag = if name == "EloDiff" {
                TagName::EloDiff
            } else {
                pipeline::tag::KnownTag::from_name(name)
                    .map(TagName::Known)
                    .unwrap_or_else(|| TagName::Named(name.to_string()))
            };
            return Ok(TagRule {
                tag,
                op,
                value: value.to_string(),
            });
        }
    }
    anyhow::bail!("tag rule {raw:?} has no recognised operator")
}

/// Expands `cli.files` plus the contents of `-f`/`--file-list`, one path per
/// line (spec SPEC_FULL §4: "Basic glob/list-file expansion for `-f`").
fn collect_input_files(cli: &Cli) -> Result<Vec<PathBuf>> {
    let mut files = cli.files.clone();
    if let Some(list_path) = &cli.file_list {
        let mut text = String::new();
        File::open(list_path)
            .with_context(|| format!("opening {}", list_path.display()))?
            .read_to_string(&mut text)?;
        for line in text.lines() {
            let line = line.trim();
            if !line.is_empty() {
                files.push(PathBuf::from(line));
            }
        }
    }
    Ok(files)
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn open_output_or_stdout(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => open_output(path),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
