//! Place of origin and place of residence extraction.

use super::patterns::{ORIGIN_EN, ORIGIN_JUNK, ORIGIN_VI, RESIDENCE_EN, RESIDENCE_JUNK, RESIDENCE_VI};
use super::text::{cap_length, contains_letter, squash, strip_junk};

/// Labeled place of origin, capped at `max_len` characters.
pub fn extract_origin(text: &str, max_len: usize) -> Option<String> {
    [&*ORIGIN_EN, &*ORIGIN_VI]
        .iter()
        .filter_map(|pattern| pattern.captures(text))
        .find_map(|caps| {
            let value = squash(&ORIGIN_JUNK.replace_all(&caps[1], ""));
            (value.chars().count() > 3 && contains_letter(&value))
                .then(|| cap_length(&value, max_len))
        })
}

/// Labeled place of residence with label remnants and trailers stripped,
/// capped at `max_len` characters.
pub fn extract_residence(text: &str, max_len: usize) -> Option<String> {
    [&*RESIDENCE_EN, &*RESIDENCE_VI]
        .iter()
        .filter_map(|pattern| pattern.captures(text))
        .find_map(|caps| {
            let stripped = squash(&strip_junk(&caps[1], &RESIDENCE_JUNK));
            let value = stripped.trim_end_matches('/').trim();
            contains_letter(value).then(|| cap_length(value, max_len))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MAX: usize = 100;

    #[test]
    fn test_origin_stops_at_next_label() {
        let text = "Quê quán / Place of origin: Hà Nội Nơi thường trú / Place of residence: 12 Lê Lợi";
        assert_eq!(extract_origin(text, MAX), Some("Hà Nội".to_string()));
    }

    #[test]
    fn test_origin_vietnamese_label() {
        let text = "Quê quán: Xã Tân Lập, Huyện Đan Phượng Nơi thường trú: Hà Nội";
        assert_eq!(
            extract_origin(text, MAX),
            Some("Xã Tân Lập, Huyện Đan Phượng".to_string())
        );
    }

    #[test]
    fn test_origin_rejects_short_or_letterless() {
        assert_eq!(extract_origin("Place of origin: Hà", MAX), None);
        assert_eq!(extract_origin("Place of origin: 12 / 34", MAX), None);
        assert_eq!(extract_origin("nothing", MAX), None);
    }

    #[test]
    fn test_residence_stops_at_validity_trailer() {
        let text = "Nơi thường trú / Place of residence: 12 Lê Lợi, Hoàn Kiếm, Hà Nội Có giá trị đến: 01/01/2040";
        assert_eq!(
            extract_residence(text, MAX),
            Some("12 Lê Lợi, Hoàn Kiếm, Hà Nội".to_string())
        );
    }

    #[test]
    fn test_residence_strips_place_artifact() {
        let text = "Place of residence: Thôn 5, Xã An Bình Place 2 Date of expiry 01/01/2040";
        assert_eq!(
            extract_residence(text, MAX),
            Some("Thôn 5, Xã An Bình".to_string())
        );
    }

    #[test]
    fn test_residence_ascii_label() {
        let text = "Noi thuong tru: Phường 1, Quận 3 Co gia tri den 01/01/2040";
        assert_eq!(extract_residence(text, MAX), Some("Phường 1, Quận 3".to_string()));
    }

    #[test]
    fn test_residence_trailing_slash_and_letterless() {
        assert_eq!(
            extract_residence("Place of residence: Hà Nội /", MAX),
            Some("Hà Nội".to_string())
        );
        assert_eq!(extract_residence("Place of residence: 12 / 3", MAX), None);
    }

    #[test]
    fn test_places_are_capped() {
        let long = "Đường ".repeat(40);
        let origin = extract_origin(&format!("Place of origin: {long}"), MAX).unwrap();
        let residence = extract_residence(&format!("Place of residence: {long}"), MAX).unwrap();
        assert!(origin.chars().count() <= 103);
        assert!(residence.chars().count() <= 103);
        assert!(residence.ends_with("..."));
    }
}
