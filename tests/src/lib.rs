//! # Society Feed Test Suite
//!
//! Unified test crate for flows that span more than one component.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs   # Ledger/store builders shared by the flows
//!     └── flows.rs      # End-to-end pagination, growth, guard and cancellation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p feed-tests
//! cargo test -p feed-tests integration::flows::
//! ```

pub mod integration;
