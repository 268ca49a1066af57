//! Text helpers shared by the field resolvers.

use regex::Regex;

use super::patterns::{HAS_LETTER, WHITESPACE_RUN};

/// Marker appended to values cut by [`cap_length`].
pub const ELLIPSIS: &str = "...";

/// Collapse every run of whitespace (newlines included) into a single space.
///
/// Leading and trailing whitespace is collapsed, not removed, so the function
/// is idempotent.
pub fn normalize(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Collapse whitespace and trim.
pub fn squash(text: &str) -> String {
    normalize(text).trim().to_string()
}

/// Truncate to `max` characters and append `...` when anything was cut.
pub fn cap_length(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}{}", &value[..byte_idx], ELLIPSIS),
        None => value.to_string(),
    }
}

/// Apply each pattern in order, replacing its matches with nothing.
pub fn strip_junk(value: &str, patterns: &[Regex]) -> String {
    patterns.iter().fold(value.to_string(), |acc, pattern| {
        pattern.replace_all(&acc, "").into_owned()
    })
}

pub fn contains_letter(value: &str) -> bool {
    HAS_LETTER.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_collapses_newlines() {
        assert_eq!(normalize("CỘNG HÒA\n\n  XÃ HỘI\tCHỦ NGHĨA"), "CỘNG HÒA XÃ HỘI CHỦ NGHĨA");
        assert_eq!(normalize("\n a \n"), " a ");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "",
            "   ",
            "a\nb",
            "\n\n\nx  y\t\tz\r\n",
            "Nơi thường trú:\n Hà Nội",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_cap_length_counts_chars() {
        let long = "Đ".repeat(150);
        let capped = cap_length(&long, 100);
        assert_eq!(capped.chars().count(), 103);
        assert!(capped.ends_with("..."));

        assert_eq!(cap_length("Hà Nội", 100), "Hà Nội");
        assert_eq!(cap_length("abcd", 4), "abcd");
        assert_eq!(cap_length("abcde", 4), "abcd...");
    }

    #[test]
    fn test_strip_junk_is_ordered() {
        let patterns = vec![Regex::new("b").unwrap(), Regex::new("ac").unwrap()];
        assert_eq!(strip_junk("abc", &patterns), "");

        // `ac` only exists once `b` is gone
        let reversed: Vec<Regex> = patterns.into_iter().rev().collect();
        assert_eq!(strip_junk("abc", &reversed), "ac");
    }

    #[test]
    fn test_contains_letter() {
        assert!(contains_letter("12 Đường"));
        assert!(!contains_letter("12 / 34"));
    }
}
