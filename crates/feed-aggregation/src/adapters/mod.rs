//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound ports: ledger sources and content resolvers.

mod cache;
mod file_store;
mod gateway;
mod ledger;

pub use cache::{CachingResolver, DEFAULT_CACHE_SIZE};
pub use file_store::FileSystemResolver;
pub use gateway::HttpGatewayResolver;
pub use ledger::{InMemoryLedger, JsonFileLedger};
