//! Feed-Admin: Society Feed admin CLI
//!
//! Pages a feed out of a JSON ledger file, resolving post metadata from a
//! local directory or an HTTP content gateway, and prints the result.
//!
//! ```text
//! ledger.json ──► PaginationController ──► stdout (text or JSON lines)
//!                      │
//!                      └── CachingResolver ──► FileSystemResolver | HttpGatewayResolver
//! ```

pub mod cli;
pub mod output;
pub mod runner;

pub use cli::{Args, ContentSource};
pub use runner::page_feed;
