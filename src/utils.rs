use std::time::{SystemTime, UNIX_EPOCH};

/// Get the current time in seconds since the Unix epoch
pub fn current_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

/// Get a departure timestamp the given number of hours in the future
pub fn hours_from_now(hours: u64) -> u64 {
    current_time() + hours * 60 * 60
}
