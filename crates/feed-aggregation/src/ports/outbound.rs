//! # Outbound Ports
//!
//! Traits for external dependencies (ledger source, content store).

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ContentId, FeedError, LedgerEntry, MetadataRecord, ResolveError};

/// Shared snapshot of the ledger.
pub type LedgerSnapshot = Arc<Vec<LedgerEntry>>;

/// Ledger source - outbound port.
///
/// Returns the full ordered entry sequence. The sequence may grow between
/// calls but previously returned entries must keep their positions.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Current entry sequence.
    ///
    /// An `Err` is a systemic failure: the whole page fetch is abandoned.
    async fn entries(&self) -> Result<LedgerSnapshot, FeedError>;

    /// Source identifier (for logging/debugging).
    fn source_id(&self) -> &str;
}

/// Content resolver - outbound port.
///
/// Slow, unreliable and invoked concurrently. Caching and retries belong
/// to implementations, not to callers.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Resolve a content identifier to its metadata record.
    async fn resolve(&self, content_id: &ContentId) -> Result<MetadataRecord, ResolveError>;
}

#[async_trait]
impl<R: ContentResolver + ?Sized> ContentResolver for Arc<R> {
    async fn resolve(&self, content_id: &ContentId) -> Result<MetadataRecord, ResolveError> {
        (**self).resolve(content_id).await
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock ledger for testing.
pub struct MockLedgerSource {
    entries: RwLock<LedgerSnapshot>,
    should_fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockLedgerSource {
    /// Ledger holding `entries`.
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self {
            entries: RwLock::new(Arc::new(entries)),
            should_fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replace the entry sequence (simulates growth or misbehaving sources).
    pub fn set_entries(&self, entries: Vec<LedgerEntry>) {
        *self.entries.write() = Arc::new(entries);
    }

    /// Toggle systemic failure.
    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    /// Number of `entries()` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockLedgerSource {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl LedgerSource for MockLedgerSource {
    async fn entries(&self) -> Result<LedgerSnapshot, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(FeedError::SourceUnavailable("Mock failure".to_string()));
        }
        Ok(Arc::clone(&self.entries.read()))
    }

    fn source_id(&self) -> &str {
        "mock-ledger"
    }
}

/// Mock content store for testing.
///
/// Unknown identifiers resolve to `NotFound`. Delays use `tokio::time`, so
/// tests with paused time run instantly.
#[derive(Default)]
pub struct MockContentResolver {
    records: HashMap<ContentId, MetadataRecord>,
    failures: HashMap<ContentId, ResolveError>,
    delays: HashMap<ContentId, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockContentResolver {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record.
    pub fn with_record(mut self, content_id: &str, record: MetadataRecord) -> Self {
        self.records.insert(ContentId::from(content_id), record);
        self
    }

    /// Make a lookup fail.
    pub fn with_failure(mut self, content_id: &str, error: ResolveError) -> Self {
        self.failures.insert(ContentId::from(content_id), error);
        self
    }

    /// Delay a lookup.
    pub fn with_delay(mut self, content_id: &str, delay: Duration) -> Self {
        self.delays.insert(ContentId::from(content_id), delay);
        self
    }

    /// Number of `resolve()` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrently outstanding lookups observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentResolver for MockContentResolver {
    async fn resolve(&self, content_id: &ContentId) -> Result<MetadataRecord, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = self.delays.get(content_id) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(error) = self.failures.get(content_id) {
            return Err(error.clone());
        }
        self.records
            .get(content_id)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(content_id.to_string()))
    }
}
