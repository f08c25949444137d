// src/util.rs — Shared text helpers

/// First `max_chars` characters of `s` (never splits a code point).
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Shorten `s` to at most `max_chars` characters, marking the cut with "...".
pub fn ellipsize(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    format!("{}...", truncate_chars(s, keep))
}

/// Round to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("café au lait", 4), "café");
    }

    #[test]
    fn test_truncate_zero() {
        assert_eq!(truncate_chars("hello", 0), "");
    }

    #[test]
    fn test_ellipsize_keeps_short_text() {
        assert_eq!(ellipsize("short", 200), "short");
    }

    #[test]
    fn test_ellipsize_long_text() {
        let long = "x".repeat(250);
        let out = ellipsize(&long, 200);
        assert_eq!(out.chars().count(), 200);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(1.25), 1.3);
        assert_eq!(round1(2.0), 2.0);
        assert_eq!(round1(0.04), 0.0);
    }
}
