//! Ledger Source Adapters
//!
//! Implements the `LedgerSource` port over memory and over a JSON file.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{FeedError, LedgerEntry};
use crate::ports::outbound::{LedgerSnapshot, LedgerSource};

/// Append-only in-memory ledger.
///
/// Sequence indices must strictly increase; anything else is refused so the
/// source can never reorder under a running session.
pub struct InMemoryLedger {
    /// Source identifier.
    id: String,
    /// Current entries.
    entries: RwLock<LedgerSnapshot>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Create a ledger holding `entries`.
    pub fn with_entries(id: impl Into<String>, entries: Vec<LedgerEntry>) -> Result<Self, FeedError> {
        let ledger = Self::new(id);
        for entry in entries {
            ledger.append(entry)?;
        }
        Ok(ledger)
    }

    /// Append an entry to the end of the ledger.
    pub fn append(&self, entry: LedgerEntry) -> Result<(), FeedError> {
        let mut entries = self.entries.write();
        if let Some(last) = entries.last() {
            if entry.sequence_index <= last.sequence_index {
                return Err(FeedError::LedgerOrder {
                    last: last.sequence_index,
                    got: entry.sequence_index,
                });
            }
        }
        debug!("[feed] Ledger {} appended entry {}", self.id, entry.sequence_index);
        Arc::make_mut(&mut *entries).push(entry);
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LedgerSource for InMemoryLedger {
    async fn entries(&self) -> Result<LedgerSnapshot, FeedError> {
        Ok(Arc::clone(&self.entries.read()))
    }

    fn source_id(&self) -> &str {
        &self.id
    }
}

/// Ledger stored as a JSON array of entries.
///
/// The file is re-read on every call, so a writer appending to it is picked
/// up by the next page fetch or refresh.
pub struct JsonFileLedger {
    path: PathBuf,
    id: String,
}

impl JsonFileLedger {
    /// Ledger backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = format!("file:{}", path.display());
        Self { path, id }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LedgerSource for JsonFileLedger {
    async fn entries(&self) -> Result<LedgerSnapshot, FeedError> {
        let raw = tokio::fs::read(&self.path).await.map_err(|e| {
            warn!("[feed] Cannot read ledger {}: {}", self.path.display(), e);
            FeedError::SourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        let entries: Vec<LedgerEntry> = serde_json::from_slice(&raw).map_err(|e| {
            warn!("[feed] Cannot parse ledger {}: {}", self.path.display(), e);
            FeedError::SourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        Ok(Arc::new(entries))
    }

    fn source_id(&self) -> &str {
        &self.id
    }
}
