//! Time utilities

use chrono::Duration;

/// Format a duration as a human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.num_milliseconds();

    if total_ms < 0 {
        return "0ms".to_string();
    }
    if total_ms < 1000 {
        return format!("{}ms", total_ms);
    }

    let total_seconds = total_ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();

    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }

    parts.join(" ")
}
