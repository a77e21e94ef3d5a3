//! Append-only log of tested and estimated maxima.
//!
//! Each test is appended to a JSONL file with file locking so the CLI can
//! record from several shells at once. The generation engine never reads
//! the log itself; callers fold it into a [`MaxTable`] and pass that in.

use crate::onerm::{self, OneRmMethod};
use crate::types::normalize_tag;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One recorded test
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MaxEntry {
    pub id: Uuid,
    /// Exercise id (e.g. "bench_press")
    pub exercise: String,
    pub weight_kg: f64,
    pub reps: u32,
    pub method: OneRmMethod,
    pub estimated_1rm: f64,
    pub recorded_at: DateTime<Utc>,
}

impl MaxEntry {
    /// Estimate the max from a tested set and stamp it with the current time
    pub fn from_test(exercise: &str, weight_kg: f64, reps: u32, method: OneRmMethod) -> Result<Self> {
        let exercise = exercise_key(exercise);
        if exercise.is_empty() {
            return Err(Error::invalid("exercise name must not be empty"));
        }
        let estimated_1rm = onerm::estimate(weight_kg, reps, method)?;
        Ok(Self {
            id: Uuid::new_v4(),
            exercise,
            weight_kg,
            reps,
            method,
            estimated_1rm,
            recorded_at: Utc::now(),
        })
    }
}

/// Exercise names and ids fold to the same key ("Bench Press" -> "bench_press")
pub fn exercise_key(name: &str) -> String {
    normalize_tag(name)
}

/// Current 1RM per exercise, in kilograms
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MaxTable {
    maxes: BTreeMap<String, f64>,
}

impl MaxTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold log entries into a table; the most recent test of an exercise wins
    pub fn from_entries(entries: &[MaxEntry]) -> Self {
        let mut latest: BTreeMap<&str, &MaxEntry> = BTreeMap::new();
        for entry in entries {
            match latest.get(entry.exercise.as_str()) {
                Some(prev) if prev.recorded_at > entry.recorded_at => {}
                _ => {
                    latest.insert(entry.exercise.as_str(), entry);
                }
            }
        }
        Self {
            maxes: latest
                .into_iter()
                .map(|(k, e)| (k.to_string(), e.estimated_1rm))
                .collect(),
        }
    }

    /// Set a max; non-positive values remove the exercise
    pub fn insert(&mut self, exercise: &str, one_rm_kg: f64) {
        let key = exercise_key(exercise);
        if one_rm_kg.is_finite() && one_rm_kg > 0.0 {
            self.maxes.insert(key, one_rm_kg);
        } else {
            self.maxes.remove(&key);
        }
    }

    pub fn with(mut self, exercise: &str, one_rm_kg: f64) -> Self {
        self.insert(exercise, one_rm_kg);
        self
    }

    /// Look up by exercise id or display name
    pub fn get(&self, exercise: &str) -> Option<f64> {
        self.maxes.get(&exercise_key(exercise)).copied()
    }

    /// Overlay `other` on top of this table
    pub fn merge(&mut self, other: &MaxTable) {
        for (k, v) in &other.maxes {
            self.maxes.insert(k.clone(), *v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.maxes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.maxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maxes.is_empty()
    }
}

/// JSONL max log with file locking
pub struct MaxLog {
    path: PathBuf,
}

impl MaxLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &MaxEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended max entry {} ({}) to log", entry.id, entry.exercise);
        Ok(())
    }

    /// Read every entry, skipping lines that fail to parse
    pub fn read_entries(&self) -> Result<Vec<MaxEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut reader = BufReader::new(&file);
        let mut entries = Vec::new();
        let mut buf = Vec::new();
        let mut line_num = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_num += 1;

            // A torn or binary line must not hide the rest of the log
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Skipping non UTF-8 max entry at line {}: {}", line_num, e);
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<MaxEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse max entry at line {}: {}", line_num, e);
                }
            }
        }

        file.unlock()?;
        tracing::debug!("Read {} max entries", entries.len());
        Ok(entries)
    }

    pub fn table(&self) -> Result<MaxTable> {
        Ok(MaxTable::from_entries(&self.read_entries()?))
    }
}
