//! Duplicate/fuzzy-duplicate detection (spec §4.6): a game's identity is
//! `(final_hash, cumulative_hash, ply_count)`; a second index keyed by the
//! hash at ply `d` supports fuzzy matching when enabled. Detection is
//! within a single run only — no persistent cross-run database (spec §1
//! Non-goals).

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::DuplicateIndexError;

/// A game's dedup identity: final position hash, cumulative checksum over
/// every position it passed through, and ply count. Two games collide
/// under exact-match iff all three agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameIdentity {
    pub final_hash: u64,
    pub cumulative_hash: u32,
    pub ply_count: u32,
}

#[derive(Debug, Clone)]
struct Record {
    identity: GameIdentity,
    fuzzy_hash: Option<u64>,
    source_file: String,
    game_number: u32,
}

/// What to do with a game once it is known to duplicate an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    KeepAll,
    /// Drop every occurrence after the first.
    SuppressDuplicates,
    /// Keep only occurrences from the second onward (discard the first).
    SuppressOriginals,
}

/// Source-file/game-number reference to a prior occurrence, returned by
/// [`DuplicateIndex::insert`] when the inserted game duplicates one
/// already seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorOccurrence {
    pub source_file: String,
    pub game_number: u32,
}

#[derive(Debug, Clone)]
pub struct DuplicateIndexConfig {
    pub fuzzy_depth: Option<u32>,
    /// Switch to the disk-backed mode once the table would hold more than
    /// this many records (spec: "trades memory for a backing file when
    /// the table would exceed an implementation-specific threshold").
    pub spill_threshold: usize,
    pub spill_path: PathBuf,
}

impl Default for DuplicateIndexConfig {
    fn default() -> Self {
        Self {
            fuzzy_depth: None,
            spill_threshold: 2_000_000,
            spill_path: PathBuf::from("virtual.tmp"),
        }
    }
}

enum Backing {
    Memory {
        by_final: std::collections::HashMap<u64, Vec<Record>>,
        by_fuzzy: std::collections::HashMap<u64, Vec<Record>>,
    },
    Disk {
        file: File,
    },
}

/// In-memory (or spill-to-disk) duplicate index. Each call to
/// [`insert`](Self::insert) both checks membership and adds the new
/// record in one pass, per spec §5's ordering guarantee: "duplicate-index
/// insertion uses the *match* position as the membership key and always
/// occurs before the duplicate-policy branch."
pub struct DuplicateIndex {
    config: DuplicateIndexConfig,
    backing: Backing,
    total_records: usize,
}

impl DuplicateIndex {
    pub fn new(config: DuplicateIndexConfig) -> Self {
        Self {
            config,
            backing: Backing::Memory {
                by_final: std::collections::HashMap::new(),
                by_fuzzy: std::collections::HashMap::new(),
            },
            total_records: 0,
        }
    }

    /// Inserts a game's identity and returns its prior occurrence, if any
    /// (exact match, or fuzzy match when `fuzzy_depth` is configured and
    /// `fuzzy_hash` is `Some`).
    pub fn insert(
        &mut self,
        identity: GameIdentity,
        fuzzy_hash: Option<u64>,
        source_file: &str,
        game_number: u32,
    ) -> Result<Option<PriorOccurrence>, DuplicateIndexError> {
        self.maybe_spill()?;

        let record = Record {
            identity,
            fuzzy_hash,
            source_file: source_file.to_string(),
            game_number,
        };

        let prior = match &mut self.backing {
            Backing::Memory { by_final, by_fuzzy } => {
                let exact = by_final
                    .get(&identity.final_hash)
                    .and_then(|bucket| bucket.iter().find(|r| r.identity == identity));
                let fuzzy = fuzzy_hash.and_then(|h| {
                    by_fuzzy
                        .get(&h)
                        .and_then(|bucket| bucket.iter().find(|r| r.fuzzy_hash == Some(h)))
                });
                let prior = exact.or(fuzzy).map(to_prior_occurrence);

                by_final.entry(identity.final_hash).or_default().push(record.clone());
                if let Some(h) = fuzzy_hash {
                    by_fuzzy.entry(h).or_default().push(record);
                }
                prior
            }
            Backing::Disk { file } => {
                let found = scan_disk(&self.config.spill_path, identity, fuzzy_hash)?;
                write_record(file, &record)?;
                found
            }
        };

        self.total_records += 1;
        Ok(prior)
    }

    fn maybe_spill(&mut self) -> Result<(), DuplicateIndexError> {
        if matches!(self.backing, Backing::Disk { .. }) {
            return Ok(());
        }
        if self.total_records < self.config.spill_threshold {
            return Ok(());
        }
        let Backing::Memory { by_final, by_fuzzy } = &self.backing else {
            unreachable!("checked above");
        };
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.config.spill_path)
            .map_err(|e| DuplicateIndexError::Io(e.to_string()))?;
        for record in by_final.values().flatten() {
            write_record(&mut file, record)?;
        }
        // by_fuzzy shares the same records by value-equality of identity;
        // they were already written via by_final, so no second pass here.
        let _ = by_fuzzy;
        self.backing = Backing::Disk { file };
        Ok(())
    }

    pub fn is_disk_backed(&self) -> bool {
        matches!(self.backing, Backing::Disk { .. })
    }
}

impl Drop for DuplicateIndex {
    fn drop(&mut self) {
        if matches!(self.backing, Backing::Disk { .. }) {
            let _ = std::fs::remove_file(&self.config.spill_path);
        }
    }
}

fn to_prior_occurrence(r: &Record) -> PriorOccurrence {
    PriorOccurrence {
        source_file: r.source_file.clone(),
        game_number: r.game_number,
    }
}

fn write_record(file: &mut File, record: &Record) -> Result<(), DuplicateIndexError> {
    writeln!(
        file,
        "{:x}\t{:x}\t{}\t{}\t{}\t{}",
        record.identity.final_hash,
        record.identity.cumulative_hash,
        record.identity.ply_count,
        record.fuzzy_hash.map(|h| format!("{h:x}")).unwrap_or_else(|| "-".to_string()),
        record.source_file,
        record.game_number,
    )
    .map_err(|e| DuplicateIndexError::Io(e.to_string()))
}

fn scan_disk(
    path: &PathBuf,
    identity: GameIdentity,
    fuzzy_hash: Option<u64>,
) -> Result<Option<PriorOccurrence>, DuplicateIndexError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return Ok(None),
    };
    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line.map_err(|e| DuplicateIndexError::Io(e.to_string()))?;
        let mut parts = line.splitn(6, '\t');
        let (Some(fh), Some(ch), Some(pc), Some(fz), Some(src), Some(num)) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            continue;
        };
        let final_hash = u64::from_str_radix(fh, 16).unwrap_or(0);
        let cumulative_hash = u32::from_str_radix(ch, 16).unwrap_or(0);
        let ply_count: u32 = pc.parse().unwrap_or(0);
        let line_identity = GameIdentity {
            final_hash,
            cumulative_hash,
            ply_count,
        };
        let line_fuzzy = if fz == "-" {
            None
        } else {
            u64::from_str_radix(fz, 16).ok()
        };
        if line_identity == identity || (fuzzy_hash.is_some() && fuzzy_hash == line_fuzzy) {
            return Ok(Some(PriorOccurrence {
                source_file: src.to_string(),
                game_number: num.parse().unwrap_or(0),
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_identical_game_reports_the_first() {
        let mut index = DuplicateIndex::new(DuplicateIndexConfig::default());
        let identity = GameIdentity {
            final_hash: 42,
            cumulative_hash: 7,
            ply_count: 10,
        };
        let first = index.insert(identity, None, "a.pgn", 1).unwrap();
        assert!(first.is_none());
        let second = index.insert(identity, None, "b.pgn", 2).unwrap();
        assert_eq!(
            second,
            Some(PriorOccurrence {
                source_file: "a.pgn".to_string(),
                game_number: 1,
            })
        );
    }

    #[test]
    fn different_ply_count_is_not_a_duplicate() {
        let mut index = DuplicateIndex::new(DuplicateIndexConfig::default());
        let a = GameIdentity {
            final_hash: 42,
            cumulative_hash: 7,
            ply_count: 10,
        };
        let b = GameIdentity { ply_count: 12, ..a };
        index.insert(a, None, "a.pgn", 1).unwrap();
        assert!(index.insert(b, None, "b.pgn", 2).unwrap().is_none());
    }

    #[test]
    fn fuzzy_match_keys_on_depth_hash() {
        let mut config = DuplicateIndexConfig::default();
        config.fuzzy_depth = Some(8);
        let mut index = DuplicateIndex::new(config);
        let a = GameIdentity {
            final_hash: 1,
            cumulative_hash: 2,
            ply_count: 40,
        };
        let b = GameIdentity {
            final_hash: 99,
            cumulative_hash: 100,
            ply_count: 41,
        };
        index.insert(a, Some(777), "a.pgn", 1).unwrap();
        let found = index.insert(b, Some(777), "b.pgn", 2).unwrap();
        assert_eq!(found.map(|p| p.source_file), Some("a.pgn".to_string()));
    }
}
