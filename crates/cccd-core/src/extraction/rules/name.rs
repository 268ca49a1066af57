//! Full name extraction.
//!
//! Header boilerplate (country name, card title) is printed before the name,
//! so later candidates score higher.

use super::patterns::NAME_CANDIDATE;
use super::{best_match, ExtractionMatch};
use crate::extraction::ExtractionTables;

/// All non-blacklisted uppercase runs, scored by relative position.
pub fn name_candidates(text: &str, tables: &ExtractionTables) -> Vec<ExtractionMatch<String>> {
    let total_chars = text.chars().count();
    if total_chars == 0 {
        return Vec::new();
    }

    NAME_CANDIDATE
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(1)?;
            let candidate = m.as_str();
            if tables.is_blacklisted(candidate) {
                return None;
            }
            let start = text[..m.start()].chars().count();
            let end = start + candidate.chars().count();
            let score = start as f32 / total_chars as f32;
            Some(ExtractionMatch::new(candidate.to_string(), score).with_position(start, end))
        })
        .collect()
}

/// Best name candidate with OCR spelling corrections applied per word.
pub fn extract_name(text: &str, tables: &ExtractionTables) -> Option<String> {
    let candidates = name_candidates(text, tables);
    let best = best_match(&candidates)?;
    Some(correct_name(&best.value, tables))
}

fn correct_name(name: &str, tables: &ExtractionTables) -> String {
    name.split_whitespace()
        .map(|word| tables.correct_word(word))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tables() -> ExtractionTables {
        ExtractionTables::default()
    }

    #[test]
    fn test_skips_header_boilerplate() {
        let text = "CỘNG HÒA XÃ HỘI CHỦ NGHĨA VIỆT NAM Họ và tên / Full name: TRẦN THỊ MAI";
        assert_eq!(extract_name(text, &tables()), Some("TRẦN THỊ MAI".to_string()));
    }

    #[test]
    fn test_later_candidate_wins() {
        let text = "LÊ MINH Số 001 NGUYỄN VĂN AN";
        let candidates = name_candidates(text, &tables());
        assert_eq!(candidates.len(), 2);
        assert!(candidates[1].score > candidates[0].score);
        assert_eq!(extract_name(text, &tables()), Some("NGUYỄN VĂN AN".to_string()));
    }

    #[test]
    fn test_blacklisted_only_candidate_is_absent() {
        assert_eq!(extract_name("Card: CITIZEN IDENTITY CARD", &tables()), None);
        assert_eq!(extract_name("VIỆT NAM", &tables()), None);
    }

    #[test]
    fn test_spelling_correction() {
        assert_eq!(
            extract_name("Họ tên: PHAM VĂN TÚ", &tables()),
            Some("PHẠM VĂN TÚ".to_string())
        );
        assert_eq!(
            extract_name("Họ tên: NGUYN THỊ LAN", &tables()),
            Some("NGUYỄN THỊ LAN".to_string())
        );
    }

    #[test]
    fn test_single_word_is_not_a_name() {
        assert_eq!(extract_name("Tên: MAI", &tables()), None);
        assert_eq!(extract_name("", &tables()), None);
    }

    #[test]
    fn test_candidate_positions_are_char_based() {
        let text = "Đặng ĐỖ MINH";
        let candidates = name_candidates(text, &tables());
        assert_eq!(candidates[0].position, Some((5, 12)));
    }
}
