use std::time::{SystemTime, UNIX_EPOCH};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub fn days_to_millis(days: i64) -> i64 {
    days * MILLIS_PER_DAY
}

/// A deadline is reached once the clock catches up with it, so a token
/// expiring at exactly `now` is already dead.
pub fn is_deadline_reached(deadline_millis: i64, now_millis: i64) -> bool {
    deadline_millis <= now_millis
}
