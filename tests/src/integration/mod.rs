//! Cross-party flows.

pub mod flows;
pub mod properties;
