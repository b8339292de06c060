use chrono::Utc;

/// Current wall-clock time in epoch milliseconds, the unit every `due_at`
/// and `created_at` field is stored in.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
