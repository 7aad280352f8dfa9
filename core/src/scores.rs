use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::Tier;

/// Longest player name kept in the table, in characters.
pub const MAX_NAME_LEN: usize = 15;

pub const DEFAULT_NAME: &str = "Anonymous";

pub const DEFAULT_RECORDS_PATH: &str = "records.txt";

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("{} games are not ranked", .0.name())]
    UnrankedTier(Tier),
    #[error("Cannot write records to {}", .path.display())]
    PersistenceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Best time for one tier; `seconds == 0` means no record yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub seconds: u32,
}

impl ScoreEntry {
    pub const fn is_set(&self) -> bool {
        self.seconds != 0
    }
}

impl Default for ScoreEntry {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            seconds: 0,
        }
    }
}

/// Best times for the ranked tiers, stored as six lines of text: a name
/// line and a seconds line for Easy, Normal and Hard in that order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreBoard {
    path: PathBuf,
    entries: [ScoreEntry; 3],
}

impl ScoreBoard {
    /// Reads the table at `path`. Never fails: a missing or unreadable file
    /// gives an empty table, and each broken record falls back on its own.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match fs::read(&path) {
            // lines are decoded one by one so a garbled name spoils only its record
            Ok(bytes) => {
                let lines = bytes
                    .split(|&b| b == b'\n')
                    .map(|line| std::str::from_utf8(line).ok().map(|l| l.trim_end_matches('\r')))
                    .collect();
                Self::from_lines(path, lines)
            }
            Err(err) => {
                if err.kind() == io::ErrorKind::NotFound {
                    log::info!("No records at {}, starting empty", path.display());
                } else {
                    log::warn!("Cannot read records at {}: {}", path.display(), err);
                }
                Self {
                    path,
                    entries: Default::default(),
                }
            }
        }
    }

    pub fn from_records_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self::from_lines(path, text.lines().map(Some).collect())
    }

    /// `None` marks a line that is not valid UTF-8.
    fn from_lines(path: impl Into<PathBuf>, lines: Vec<Option<&str>>) -> Self {
        let entries = core::array::from_fn(|slot| {
            let tier = Tier::RANKED[slot].name();
            match (lines.get(slot * 2), lines.get(slot * 2 + 1)) {
                (Some(Some(name)), Some(Some(seconds))) => match seconds.trim().parse::<u32>() {
                    Ok(seconds) => ScoreEntry {
                        name: clean_name(name),
                        seconds,
                    },
                    Err(err) => {
                        log::warn!("Broken record for {}: {}", tier, err);
                        ScoreEntry::default()
                    }
                },
                (Some(None), _) | (_, Some(None)) => {
                    log::warn!("Unreadable record for {}", tier);
                    ScoreEntry::default()
                }
                _ => {
                    log::warn!("Missing record for {}", tier);
                    ScoreEntry::default()
                }
            }
        });

        Self {
            path: path.into(),
            entries,
        }
    }

    pub fn to_records_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}\n{}\n", entry.name, entry.seconds))
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in ranked tier order.
    pub fn entries(&self) -> &[ScoreEntry; 3] {
        &self.entries
    }

    pub fn entry(&self, tier: Tier) -> Option<&ScoreEntry> {
        tier.slot().map(|slot| &self.entries[slot])
    }

    /// Whether `seconds` would beat the stored time. Always false for
    /// unranked tiers.
    pub fn is_new_best(&self, tier: Tier, seconds: u32) -> bool {
        self.entry(tier)
            .is_some_and(|entry| !entry.is_set() || seconds < entry.seconds)
    }

    /// Stores a new best time and rewrites the whole file. The in-memory
    /// table keeps the new entry even when writing fails.
    pub fn record(&mut self, tier: Tier, name: &str, seconds: u32) -> Result<(), ScoreError> {
        let slot = tier.slot().ok_or(ScoreError::UnrankedTier(tier))?;
        let entry = ScoreEntry {
            name: clean_name(name),
            seconds,
        };
        log::info!("New {} record: {} in {}s", tier.name(), entry.name, seconds);
        self.entries[slot] = entry;
        self.save()
    }

    /// Writes a sibling temporary file and renames it over the table, so a
    /// failed write never leaves a half-written file behind.
    pub fn save(&self) -> Result<(), ScoreError> {
        let unavailable = |source| ScoreError::PersistenceUnavailable {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }

        let mut tmp_path = OsString::from(self.path.as_os_str());
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        fs::write(&tmp_path, self.to_records_text()).map_err(unavailable)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(unavailable(err));
        }
        log::debug!("Saved records to {}", self.path.display());
        Ok(())
    }
}

/// Truncates to [`MAX_NAME_LEN`] characters and keeps the name on one line.
/// Applying it twice gives the same name, so a stored name reloads unchanged.
fn clean_name(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(MAX_NAME_LEN)
        .collect();
    match name.trim() {
        "" => DEFAULT_NAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records_path(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sweeper-{}-{}", std::process::id(), test));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.join("records.txt")
    }

    fn entry(name: &str, seconds: u32) -> ScoreEntry {
        ScoreEntry {
            name: name.to_string(),
            seconds,
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let board = ScoreBoard::load(records_path("missing"));

        assert_eq!(board.entries(), &<[ScoreEntry; 3]>::default());
        assert_eq!(board.entry(Tier::Easy), Some(&entry("Anonymous", 0)));
        assert!(board.is_new_best(Tier::Hard, 999));
    }

    #[test]
    fn truncated_file_keeps_readable_records() {
        let path = records_path("truncated");
        fs::write(&path, "Ann\n120\n").unwrap();

        let board = ScoreBoard::load(&path);

        assert_eq!(
            board.entries(),
            &[entry("Ann", 120), ScoreEntry::default(), ScoreEntry::default()]
        );
    }

    #[test]
    fn broken_record_does_not_spoil_others() {
        let board = ScoreBoard::from_records_text("unused", "Ann\n120\nBob\nfast\nCid\n300\n");

        assert_eq!(
            board.entries(),
            &[entry("Ann", 120), ScoreEntry::default(), entry("Cid", 300)]
        );
    }

    #[test]
    fn new_best_rewrites_only_its_slot() {
        let path = records_path("new-best");
        fs::write(&path, "Ann\n120\nBob\n200\nCid\n300\n").unwrap();
        let mut board = ScoreBoard::load(&path);

        assert!(board.is_new_best(Tier::Easy, 90));
        assert!(!board.is_new_best(Tier::Easy, 120));
        board.record(Tier::Easy, "Eve", 90).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Eve\n90\nBob\n200\nCid\n300\n"
        );
        assert!(!board.is_new_best(Tier::Easy, 100));
    }

    #[test]
    fn record_then_load_round_trips() {
        let path = records_path("round-trip");
        let mut board = ScoreBoard::load(&path);
        board.record(Tier::Hard, "Zed", 412).unwrap();
        board.record(Tier::Easy, "Ann", 17).unwrap();

        let loaded = ScoreBoard::load(&path);

        assert_eq!(
            loaded.entries(),
            &[entry("Ann", 17), ScoreEntry::default(), entry("Zed", 412)]
        );
        assert_eq!(loaded, board);
    }

    #[test]
    fn custom_tier_is_never_recorded() {
        let path = records_path("custom");
        let mut board = ScoreBoard::load(&path);

        assert!(!board.is_new_best(Tier::Custom, 1));
        assert!(matches!(
            board.record(Tier::Custom, "Ann", 1),
            Err(ScoreError::UnrankedTier(Tier::Custom))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn names_are_truncated_to_one_line() {
        let mut board = ScoreBoard::from_records_text(records_path("names"), "");

        board.record(Tier::Normal, "Bartholomew the Bold", 50).unwrap();
        assert_eq!(board.entry(Tier::Normal).unwrap().name, "Bartholomew the");

        board.record(Tier::Normal, "Ёжик\nв тумане навсегда", 40).unwrap();
        assert_eq!(board.entry(Tier::Normal).unwrap().name, "Ёжик в тумане н");
        assert_eq!(board.to_records_text().lines().count(), 6);
    }

    #[test]
    fn stored_names_reload_unchanged() {
        let path = records_path("reload-names");
        let mut board = ScoreBoard::load(&path);
        board.record(Tier::Easy, "abcdefghijklmn xyz", 30).unwrap();
        board.record(Tier::Normal, "Ann\u{7}", 60).unwrap();
        board.record(Tier::Hard, "  \t ", 90).unwrap();

        assert_eq!(
            board.entries(),
            &[
                entry("abcdefghijklmn", 30),
                entry("Ann", 60),
                entry("Anonymous", 90)
            ]
        );
        assert_eq!(ScoreBoard::load(&path), board);
    }

    #[test]
    fn invalid_utf8_spoils_only_its_record() {
        let path = records_path("invalid-utf8");
        fs::write(&path, b"Ann\n120\n\xFF\xFE\n200\nCid\n300\n").unwrap();

        let board = ScoreBoard::load(&path);

        assert_eq!(
            board.entries(),
            &[entry("Ann", 120), ScoreEntry::default(), entry("Cid", 300)]
        );
    }

    #[test]
    fn write_failure_is_reported() {
        let path = records_path("unwritable");
        fs::create_dir_all(&path).unwrap();
        let mut board = ScoreBoard::load(&path);

        let result = board.record(Tier::Easy, "Ann", 10);

        assert!(matches!(
            result,
            Err(ScoreError::PersistenceUnavailable { .. })
        ));
        assert_eq!(board.entry(Tier::Easy), Some(&entry("Ann", 10)));
    }
}
