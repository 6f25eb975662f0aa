//! # Feed Aggregation
//!
//! Paged, filtered, enriched feed over an append-only ledger of posts.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Ledger entries carry a pointer into a content store. A feed session
//! windows the ledger into fixed-size pages, keeps the entries matching its
//! filter, resolves their metadata concurrently, drops broken records and
//! appends the rest to an ordered, deduplicated feed.
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | No overlapping page fetches | `advance()` only honored from `Idle`, checked under the state lock |
//! | Stale results never appear | Fetches tagged with a `SessionId`, checked at commit |
//! | Entry order within a page | Order-preserving bounded fan-out |
//! | No duplicate posts | Accumulator keyed by normalized content id |
//! | Atomic batches | Copy-on-write snapshots swapped under a write lock |
//!
//! ## Module Structure
//!
//! ```text
//! feed-aggregation/
//! ├── domain/          # Core types: LedgerEntry, FeedItem, FeedPhase, errors
//! ├── algorithms/      # Windowing, entry filter, record validation
//! ├── ports/           # API trait (inbound) + ledger/resolver traits (outbound)
//! ├── application/     # Enricher, FeedAccumulator, PaginationController
//! ├── adapters/        # In-memory/file ledgers, file/HTTP/caching resolvers
//! └── config.rs        # FeedConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    CachingResolver, FileSystemResolver, HttpGatewayResolver, InMemoryLedger, JsonFileLedger,
    DEFAULT_CACHE_SIZE,
};
pub use algorithms::{is_short_page, page_bounds, page_count, window_page, EntryFilter, Validator};
pub use application::{
    EnrichedBatch, Enricher, FeedAccumulator, FeedSnapshot, PaginationController, ResolvedEntry,
};
pub use config::FeedConfig;
pub use domain::{
    display_date, invariant_ledger_order, invariant_unique_pointers, Address, Attribute,
    ContentId, FeedError, FeedItem, FeedPhase, LedgerEntry, MetadataRecord, PageOutcome,
    PageReport, PaginationState, RejectReason, Rejection, ResolutionFailure, ResolveError,
    SessionId, BROKEN_IMAGE_SENTINEL, DEFAULT_GATEWAY_PREFIX, DEFAULT_PAGE_SIZE,
    DEFAULT_RESOLVE_TIMEOUT_MS,
};
pub use ports::{
    ContentResolver, FeedApi, LedgerSnapshot, LedgerSource, MockContentResolver,
    MockLedgerSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
