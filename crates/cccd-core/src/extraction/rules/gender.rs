//! Gender extraction.

use super::patterns::{GENDER_BARE, GENDER_LABELED};
use crate::models::Gender;

/// Labeled value (`Giới tính: Nữ`, `Sex: Male`) first, then any bare keyword.
pub fn extract_gender(text: &str) -> Option<Gender> {
    [&*GENDER_LABELED, &*GENDER_BARE]
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| Gender::from_token(&caps[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled() {
        assert_eq!(extract_gender("Giới tính / Sex: Nữ Quốc tịch"), Some(Gender::Female));
        assert_eq!(extract_gender("Giới tính: Nam"), Some(Gender::Male));
        assert_eq!(extract_gender("Sex: FEMALE"), Some(Gender::Female));
    }

    #[test]
    fn test_label_beats_earlier_bare_keyword() {
        // "Nam" in the country name comes first but the label decides
        let text = "VIỆT NAM Giới tính: Nữ";
        assert_eq!(extract_gender(text), Some(Gender::Female));
    }

    #[test]
    fn test_bare_fallback() {
        assert_eq!(extract_gender("NGUYỄN VĂN AN Nam 01/01/1990"), Some(Gender::Male));
        assert_eq!(extract_gender("male"), Some(Gender::Male));
        assert_eq!(extract_gender("nothing here"), None);
    }

    #[test]
    fn test_no_match_inside_words() {
        assert_eq!(extract_gender("Namdinh Females"), None);
    }
}
