//! Append-only generation history, persisted as JSON.
//!
//! One record is written per successful generation and is immutable
//! afterward. The list is newest-first and capped: the oldest entries fall
//! off once the cap is reached.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tts::{AnnouncerGender, AnnouncerStyle};

/// Number of records kept by default.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

// ---------------------------------------------------------------------------
// HistoryError
// ---------------------------------------------------------------------------

/// History persistence failure.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// HistoryRecord
// ---------------------------------------------------------------------------

/// One completed generation: what was asked for and what script came out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub original_text: String,
    pub script: String,
    pub style: AnnouncerStyle,
    pub gender: AnnouncerGender,
    pub timestamp_ms: u64,
    pub author: String,
    pub likes: u32,
}

// ---------------------------------------------------------------------------
// HistoryStore
// ---------------------------------------------------------------------------

/// JSON-file-backed history list, newest first, capped at `max_entries`.
///
/// Persisted after every [`append`](Self::append) so records survive
/// restarts.
pub struct HistoryStore {
    records: Vec<HistoryRecord>,
    path: PathBuf,
    max_entries: usize,
}

impl HistoryStore {
    /// Load history from `path`, or start empty when the file is missing.
    ///
    /// A corrupt file is treated as empty rather than failing startup; the
    /// next successful generation overwrites it.
    pub fn load_from(path: &Path, max_entries: usize) -> Self {
        let records = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<HistoryRecord>>(&content) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("history: could not parse {}: {e}", path.display());
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            records,
            path: path.to_path_buf(),
            max_entries,
        }
    }

    /// Append a new record (newest first), enforce the cap, and persist.
    ///
    /// Returns the stored record, including its generated id and timestamp.
    pub fn append(
        &mut self,
        original_text: &str,
        script: &str,
        style: AnnouncerStyle,
        gender: AnnouncerGender,
        author: &str,
    ) -> Result<HistoryRecord, HistoryError> {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let record = HistoryRecord {
            id: timestamp_ms.to_string(),
            original_text: original_text.to_string(),
            script: script.to_string(),
            style,
            gender,
            timestamp_ms,
            author: author.to_string(),
            likes: 0,
        };

        self.records.insert(0, record.clone());
        self.records.truncate(self.max_entries);
        self.save()?;

        Ok(record)
    }

    /// All records, newest first.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when no generations have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn save(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
