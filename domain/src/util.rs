//! Shared utility functions.

use std::time::{SystemTime, UNIX_EPOCH};

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Truncate with a trailing ellipsis when the text had to be cut.
pub fn ellipsize(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        s.to_string()
    } else {
        format!("{}...", truncate_str(s, max_bytes.saturating_sub(3)))
    }
}

/// Milliseconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn truncate_no_op_when_short() {
        assert_eq!(truncate_str("hi", 10), "hi");
    }

    #[test]
    fn truncate_multibyte_boundary() {
        // '€' is 3 bytes
        let s = "€€€";
        assert_eq!(truncate_str(s, 4), "€");
        assert_eq!(truncate_str(s, 6), "€€");
    }

    #[test]
    fn ellipsize_marks_cut_text() {
        assert_eq!(ellipsize("hello world", 8), "hello...");
        assert_eq!(ellipsize("hello", 8), "hello");
    }
}
