//! Resumable generation state with file locking.
//!
//! A [`GenerationState`] is the snapshot that lets a long plan be produced
//! in batches: the original request, the weeks generated so far and the
//! running maxima. The engine only takes and returns these values; this
//! module is how the CLI keeps them on disk, one file per client under
//! `<data_dir>/states/`.

use crate::assembler::ProgramRequest;
use crate::maxes::MaxTable;
use crate::{Error, GeneratedProgram, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    InProgress,
    Completed,
    Error,
}

/// Snapshot of a batch generation in progress
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationState {
    pub id: Uuid,
    pub client: String,
    /// The request as first submitted
    pub request: ProgramRequest,
    /// Weeks generated so far
    #[serde(default)]
    pub program: Option<GeneratedProgram>,
    pub last_completed_week: u32,
    pub total_weeks: u32,
    pub batch_size: u32,
    /// Request maxima plus every update supplied between batches
    pub running_maxes: MaxTable,
    pub status: GenerationStatus,
    #[serde(default)]
    pub last_error: Option<String>,
    /// Custom exercise catalog the first batch ran with; later batches reload it
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationState {
    pub fn new(client: &str, request: ProgramRequest, batch_size: u32) -> Result<Self> {
        if client.trim().is_empty() {
            return Err(Error::invalid("client name must not be empty"));
        }
        if batch_size == 0 {
            return Err(Error::invalid("batch size must be at least 1"));
        }
        request.profile.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            client: client.trim().to_string(),
            total_weeks: request.profile.total_weeks,
            running_maxes: request.maxes.clone(),
            request,
            program: None,
            last_completed_week: 0,
            batch_size,
            status: GenerationStatus::InProgress,
            last_error: None,
            catalog_path: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Weeks the next batch covers, or None once every week exists
    pub fn next_batch_range(&self) -> Option<RangeInclusive<u32>> {
        if self.is_complete() {
            return None;
        }
        let start = self.last_completed_week + 1;
        let end = (self.last_completed_week + self.batch_size.max(1)).min(self.total_weeks);
        Some(start..=end)
    }

    pub fn is_complete(&self) -> bool {
        self.last_completed_week >= self.total_weeks
    }

    /// Fraction of weeks generated, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        if self.total_weeks == 0 {
            return 1.0;
        }
        (self.last_completed_week.min(self.total_weeks) as f64) / self.total_weeks as f64
    }

    /// Record a failed batch; the weeks already generated stay valid
    pub fn mark_failed(&mut self, err: &Error) {
        self.status = GenerationStatus::Error;
        self.last_error = Some(err.to_string());
        self.updated_at = Utc::now();
    }

    /// Load a state file with shared locking
    ///
    /// Returns None if the file doesn't exist. An unreadable or corrupted
    /// file is logged and treated as missing.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let Some(contents) = read_locked(path)? else {
            return Ok(None);
        };

        match serde_json::from_str::<GenerationState>(&contents) {
            Ok(state) => {
                tracing::debug!("Loaded generation state from {:?}", path);
                Ok(Some(state))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse state file {:?}: {}. Ignoring it.",
                    path,
                    e
                );
                Ok(None)
            }
        }
    }

    /// Save atomically: temp file in the same directory, sync, rename
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("state path {path:?} has no parent")))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved generation state to {:?}", path);
        Ok(())
    }

    /// Load, modify and save back
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut GenerationState) -> Result<()>,
    {
        let mut state = Self::load(path)?
            .ok_or_else(|| Error::State(format!("no generation state at {path:?}")))?;
        f(&mut state)?;
        state.save(path)?;
        Ok(state)
    }
}

fn read_locked(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open state file {:?}: {}", path, e);
            return Ok(None);
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock state file {:?}: {}", path, e);
        return Ok(None);
    }

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    if let Err(e) = reader.read_to_string(&mut contents) {
        let _ = file.unlock();
        tracing::warn!("Failed to read state file {:?}: {}", path, e);
        return Ok(None);
    }

    file.unlock()?;
    Ok(Some(contents))
}

// ============================================================================
// State directory
// ============================================================================

pub fn states_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("states")
}

/// File-safe form of a client name: lowercase alphanumerics, '-' and '_'
pub fn sanitize_client(client: &str) -> String {
    let cleaned: String = client
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}

pub fn state_path(data_dir: &Path, client: &str) -> PathBuf {
    states_dir(data_dir).join(format!("{}.json", sanitize_client(client)))
}

/// Load the state stored for `client`
///
/// Different names can sanitize to the same file, so a file that belongs to
/// another client is an error instead of a match.
pub fn load_client_state(data_dir: &Path, client: &str) -> Result<Option<GenerationState>> {
    let path = state_path(data_dir, client);
    match GenerationState::load(&path)? {
        Some(state) if state.client != client.trim() => Err(Error::State(format!(
            "state file {:?} belongs to client '{}', not '{}'",
            path,
            state.client,
            client.trim()
        ))),
        other => Ok(other),
    }
}

/// Every readable state under the data directory, oldest update first
pub fn list_states(data_dir: &Path) -> Result<Vec<GenerationState>> {
    let dir = states_dir(data_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut states = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(state) = GenerationState::load(&path)? {
            states.push(state);
        }
    }
    states.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
    Ok(states)
}

/// Remove a client's state; false when there was none
pub fn delete_state(data_dir: &Path, client: &str) -> Result<bool> {
    let path = state_path(data_dir, client);
    if !path.exists() {
        return Ok(false);
    }
    // Unreadable files can go; another client's plan cannot
    load_client_state(data_dir, client)?;
    std::fs::remove_file(&path)?;
    tracing::info!("Deleted generation state {:?}", path);
    Ok(true)
}
