//! # Inbound Ports
//!
//! API trait exposed to the rendering layer.

use async_trait::async_trait;

use crate::algorithms::EntryFilter;
use crate::application::FeedSnapshot;
use crate::domain::{FeedError, PageReport, PaginationState};

/// Feed API - inbound port.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// Replace the active session with one for `filter` and load page 1.
    async fn start(&self, filter: EntryFilter) -> Result<PageReport, FeedError>;

    /// Load the next page. Called by the scroll sentinel.
    ///
    /// Ignored while a fetch is outstanding, after the end of data, or
    /// while paused on an error.
    async fn advance(&self) -> Result<PageReport, FeedError>;

    /// Re-poll the ledger after the end of data was reached.
    async fn refresh(&self) -> Result<PageReport, FeedError>;

    /// Current ordered feed.
    fn snapshot(&self) -> FeedSnapshot;

    /// Current pagination state.
    fn pagination_state(&self) -> PaginationState;
}
