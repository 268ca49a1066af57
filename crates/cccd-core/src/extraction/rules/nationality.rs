//! Nationality extraction.

use super::patterns::{NATIONALITY_EN, NATIONALITY_SHAPE, NATIONALITY_TRAILER, NATIONALITY_VI};

/// Labeled nationality with trailing labels split off.
///
/// Values that are not 2-20 letters and spaces are rejected and the next
/// label pattern is tried.
pub fn extract_nationality(text: &str, fixups: &[(String, String)]) -> Option<String> {
    [&*NATIONALITY_EN, &*NATIONALITY_VI]
        .iter()
        .filter_map(|pattern| pattern.captures(text))
        .find_map(|caps| {
            let raw = &caps[1];
            let head = NATIONALITY_TRAILER.split(raw).next().unwrap_or(raw).trim();
            if !NATIONALITY_SHAPE.is_match(head) {
                return None;
            }
            Some(apply_fixups(head, fixups))
        })
}

fn apply_fixups(value: &str, fixups: &[(String, String)]) -> String {
    fixups
        .iter()
        .fold(value.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionTables;
    use pretty_assertions::assert_eq;

    fn fixups() -> Vec<(String, String)> {
        ExtractionTables::default().nationality_fixups
    }

    #[test]
    fn test_splits_glued_labels() {
        let text = "Quốc tịch / Nationality: Việt Nam Quê quán / Place of origin: Hà Nội";
        assert_eq!(extract_nationality(text, &fixups()), Some("Việt Nam".to_string()));
    }

    #[test]
    fn test_gender_label_glued() {
        let text = "Nationality: Việt Nam Giới tính: Nam";
        assert_eq!(extract_nationality(text, &fixups()), Some("Việt Nam".to_string()));
    }

    #[test]
    fn test_fixups() {
        assert_eq!(
            extract_nationality("Nationality: Viet Nam", &fixups()),
            Some("Việt Nam".to_string())
        );
        assert_eq!(
            extract_nationality("Quốc tịch: Viêt Nam", &fixups()),
            Some("Việt Nam".to_string())
        );
    }

    #[test]
    fn test_rejects_bad_shape() {
        assert_eq!(extract_nationality("Nationality: 12345", &fixups()), None);
        assert_eq!(
            extract_nationality("Nationality: Việt Nam Nơi thường trú 12 Lê Lợi", &fixups()),
            None
        );
        assert_eq!(extract_nationality("no label", &fixups()), None);
    }

    #[test]
    fn test_falls_through_to_vietnamese_label() {
        // the Vietnamese value runs into the English label and is rejected too
        let text = "Quốc tịch: Việt Nam / Nationality: 0000";
        assert_eq!(extract_nationality(text, &fixups()), None);

        let text = "Nationality: 9 Quốc tịch: Việt Nam";
        assert_eq!(extract_nationality(text, &fixups()), Some("Việt Nam".to_string()));
    }
}
