//! Utility functions

pub mod time;
pub mod validation;

pub use time::format_duration;
pub use validation::{normalize_handle, validate_handle, validate_ladder_rating};
