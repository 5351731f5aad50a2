use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A catch submission as it arrives from the client. `date` and `time` are
/// caller-supplied display strings and are stored verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCatch {
    pub species: String,
    pub bait: String,
    pub location: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchRecord {
    pub id: u64,
    pub species: String,
    pub bait: String,
    pub location: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub notes: String,
    pub logged_at: String,
}

#[derive(Debug, Serialize)]
pub struct CatchStats {
    pub total_catches: usize,
    pub species_count: usize,
    pub most_common_species: Option<String>,
    pub species_breakdown: HashMap<String, usize>,
}

/// Append-only catch log mirrored to a single JSON file. Every `add`
/// rewrites the whole file; callers serialize access through the mutex in
/// `AppState`, so in-process writers cannot interleave. Writers in other
/// processes still race (last writer wins).
pub struct CatchStore {
    path: PathBuf,
    catches: Vec<CatchRecord>,
}

impl CatchStore {
    /// Open the store at `path`. A missing or unparseable file means "no
    /// prior records" and is never an error; write faults on `add` are.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let catches = load_or_empty(&path);
        Self { path, catches }
    }

    /// Append a record and rewrite the backing file.
    ///
    /// Ids are `current length + 1` at insertion time. If the file is ever
    /// pruned externally an id can be reissued; kept for compatibility with
    /// the existing log format.
    pub fn add(&mut self, new: NewCatch) -> Result<CatchRecord> {
        let record = CatchRecord {
            id: self.catches.len() as u64 + 1,
            species: new.species,
            bait: new.bait,
            location: new.location,
            date: new.date,
            time: new.time,
            notes: new.notes,
            logged_at: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        };
        self.catches.push(record.clone());
        self.persist()?;
        Ok(record)
    }

    /// All records, newest first by the caller-supplied `date` string.
    /// The sort is lexicographic, which is date-correct for ISO dates.
    pub fn all(&self) -> Vec<CatchRecord> {
        let mut catches = self.catches.clone();
        catches.sort_by(|a, b| b.date.cmp(&a.date));
        catches
    }

    /// Case-insensitive exact species match, in insertion order.
    pub fn by_species(&self, species: &str) -> Vec<CatchRecord> {
        self.catches
            .iter()
            .filter(|c| c.species.eq_ignore_ascii_case(species))
            .cloned()
            .collect()
    }

    /// Case-insensitive substring match on location, in insertion order.
    pub fn by_location(&self, needle: &str) -> Vec<CatchRecord> {
        let needle = needle.to_lowercase();
        self.catches
            .iter()
            .filter(|c| c.location.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> CatchStats {
        let mut breakdown: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();
        for catch in &self.catches {
            if !breakdown.contains_key(&catch.species) {
                first_seen.push(catch.species.clone());
            }
            *breakdown.entry(catch.species.clone()).or_default() += 1;
        }

        // Ties resolve to whichever species was logged first.
        let mut most_common_species: Option<String> = None;
        let mut best = 0;
        for species in &first_seen {
            let count = breakdown[species];
            if count > best {
                best = count;
                most_common_species = Some(species.clone());
            }
        }

        CatchStats {
            total_catches: self.catches.len(),
            species_count: breakdown.len(),
            most_common_species,
            species_breakdown: breakdown,
        }
    }

    pub fn len(&self) -> usize {
        self.catches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catches.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let body = serde_json::to_string_pretty(&self.catches)?;
        fs::write(&self.path, body)
            .with_context(|| format!("writing catch log {}", self.path.display()))
    }
}

fn load_or_empty(path: &Path) -> Vec<CatchRecord> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&raw) {
        Ok(catches) => catches,
        Err(e) => {
            warn!("catch log {} is unreadable, starting empty: {e}", path.display());
            Vec::new()
        }
    }
}
