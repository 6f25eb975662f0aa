//! # Domain Invariants
//!
//! Constants and rules that must always hold for a feed.

use std::collections::HashSet;

use super::entities::FeedItem;

/// Entries per page. Also the default bound on concurrent resolutions.
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Gateway prefix that ledger pointers are stored with.
pub const DEFAULT_GATEWAY_PREFIX: &str = "https://ipfs.io/ipfs/";

/// Image value produced when an object was stringified into a gateway URL
/// instead of its content identifier.
pub const BROKEN_IMAGE_SENTINEL: &str = "https://ipfs.io/ipfs/[object Object]";

/// Default per-resolution time limit.
pub const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 10_000;

/// Invariant: no two feed items share a content pointer.
pub fn invariant_unique_pointers(items: &[FeedItem]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().all(|item| seen.insert(&item.content_id))
}

/// Invariant: feed order follows ledger order.
///
/// Holds for append-only ledgers because pages are appended sequentially
/// and each page preserves entry order.
pub fn invariant_ledger_order(items: &[FeedItem]) -> bool {
    items
        .windows(2)
        .all(|pair| pair[0].entry.sequence_index < pair[1].entry.sequence_index)
}
