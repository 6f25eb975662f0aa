//! # Application Layer
//!
//! Enrichment, accumulation and the pagination controller.

pub mod accumulator;
pub mod enricher;
pub mod service;

pub use accumulator::{FeedAccumulator, FeedSnapshot};
pub use enricher::{EnrichedBatch, Enricher, ResolvedEntry};
pub use service::PaginationController;
