use chrono::Utc;

// ============== Timestamp Helpers ==============

/// RFC3339 timestamp in UTC (for persisted records).
pub fn iso_timestamp_utc() -> String {
    Utc::now().to_rfc3339()
}

// ============== Text Helpers ==============

/// Cut `s` to `max_len` characters, appending `...` when shortened.
pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out = s.chars().take(max_len).collect::<String>();
    out.push_str("...");
    out
}
