//! Drives a controller through a session, the way a scrolling reader would.

use feed_aggregation::{
    ContentResolver, EntryFilter, FeedError, FeedPhase, LedgerSource, PageReport,
    PaginationController,
};
use tracing::info;

/// Start a session and advance until the end of data or `max_pages` pages.
///
/// `max_pages == 0` means no limit.
pub async fn page_feed<L: LedgerSource, R: ContentResolver>(
    controller: &PaginationController<L, R>,
    filter: EntryFilter,
    max_pages: u32,
) -> Result<Vec<PageReport>, FeedError> {
    let mut reports = vec![controller.start(filter).await?];

    while matches!(controller.phase(), FeedPhase::Idle { .. })
        && (max_pages == 0 || (reports.len() as u32) < max_pages)
    {
        reports.push(controller.advance().await?);
    }

    info!(
        "[feed] Loaded {} page(s), {} item(s), phase {}",
        reports.len(),
        controller.snapshot().len(),
        controller.phase().name()
    );
    Ok(reports)
}
