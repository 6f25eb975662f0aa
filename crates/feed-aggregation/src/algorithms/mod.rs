//! # Algorithms Module
//!
//! Pure, synchronous pipeline stages: windowing, filtering and validation.

pub mod filtering;
pub mod validation;
pub mod windowing;

pub use filtering::EntryFilter;
pub use validation::Validator;
pub use windowing::{is_short_page, page_bounds, page_count, window_page};
