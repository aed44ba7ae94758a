//! Input validation utilities

use crate::constants::{LADDER_MAX_RATING, LADDER_MIN_RATING, LADDER_RATING_STEP, MAX_HANDLE_LENGTH};

/// Validate Codeforces handle format
pub fn validate_handle(handle: &str) -> Result<(), &'static str> {
    if handle.is_empty() {
        return Err("Handle must not be empty");
    }
    if handle.len() > MAX_HANDLE_LENGTH {
        return Err("Handle must be at most 24 characters");
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err("Handle can only contain letters, numbers, underscores, hyphens, and dots");
    }
    Ok(())
}

/// Validate a handle and return the form it is stored under
pub fn normalize_handle(handle: &str) -> Result<String, &'static str> {
    let handle = handle.trim();
    validate_handle(handle)?;
    Ok(handle.to_ascii_lowercase())
}

/// Validate that a rating sits on a ladder rung
pub fn validate_ladder_rating(rating: i32) -> Result<(), &'static str> {
    if !(LADDER_MIN_RATING..=LADDER_MAX_RATING).contains(&rating) {
        return Err("Rating must be between 800 and 3500");
    }
    if (rating - LADDER_MIN_RATING) % LADDER_RATING_STEP != 0 {
        return Err("Rating must be a multiple of 100");
    }
    Ok(())
}
