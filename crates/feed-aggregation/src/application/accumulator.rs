//! # Feed Accumulator
//!
//! Owns the ordered output of one feed session.
//!
//! Snapshots are `Arc`s of the item vector. `append` takes the write lock for
//! the whole batch and copies-on-write if a snapshot is still held, so a
//! reader sees either none or all of a batch.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{ContentId, FeedItem};

/// Immutable view of a feed.
pub type FeedSnapshot = Arc<Vec<FeedItem>>;

#[derive(Default)]
struct FeedInner {
    items: FeedSnapshot,
    seen: HashSet<ContentId>,
}

/// Ordered, deduplicated, append-only feed.
#[derive(Default)]
pub struct FeedAccumulator {
    inner: RwLock<FeedInner>,
}

impl FeedAccumulator {
    /// Empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the items whose content id is not yet present.
    ///
    /// Batch order and existing order are preserved. Returns the number of
    /// items added; duplicates, including repeats inside `batch`, are skipped.
    pub fn append(&self, batch: Vec<FeedItem>) -> usize {
        if batch.is_empty() {
            return 0;
        }
        let mut inner = self.inner.write();
        let FeedInner { items, seen } = &mut *inner;

        let fresh: Vec<FeedItem> = batch
            .into_iter()
            .filter(|item| seen.insert(item.content_id.clone()))
            .collect();
        let added = fresh.len();
        if added > 0 {
            Arc::make_mut(items).extend(fresh);
        }
        added
    }

    /// Current ordered feed.
    pub fn snapshot(&self) -> FeedSnapshot {
        Arc::clone(&self.inner.read().items)
    }

    /// Is an item with this content id present?
    pub fn contains(&self, content_id: &ContentId) -> bool {
        self.inner.read().seen.contains(content_id)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    /// True when the feed holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every item. Outstanding snapshots are unaffected.
    pub fn reset(&self) {
        *self.inner.write() = FeedInner::default();
    }
}
