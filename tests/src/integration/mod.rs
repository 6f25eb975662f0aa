//! Cross-component integration flows.

pub mod fixtures;
mod flows;
