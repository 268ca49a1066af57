//! Citizen ID number extraction.

use super::patterns::DIGIT_RUN;

/// First run of exactly twelve digits not adjacent to other digits.
///
/// Letters may touch the run (`No001099012345`). No checksum exists for the
/// 12-digit number, so any such run is accepted.
pub fn extract_id_number(text: &str) -> Option<String> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|run| run.len() == 12)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_twelve_digits() {
        assert_eq!(
            extract_id_number("Số / No.: 001099012345 Họ và tên"),
            Some("001099012345".to_string())
        );
    }

    #[test]
    fn test_rejects_other_lengths() {
        assert_eq!(extract_id_number("12345678901"), None);
        assert_eq!(extract_id_number("1234567890123"), None);
        assert_eq!(extract_id_number("no digits here"), None);
    }

    #[test]
    fn test_first_run_wins() {
        assert_eq!(
            extract_id_number("079203001234 and 001099012345"),
            Some("079203001234".to_string())
        );
    }

    #[test]
    fn test_digit_adjacent_run_is_skipped() {
        // 13 digits then a valid 12-digit run
        assert_eq!(
            extract_id_number("0123456789012 111122223333"),
            Some("111122223333".to_string())
        );
    }

    #[test]
    fn test_letters_glued_to_run() {
        assert_eq!(
            extract_id_number("No001099012345 Họ và tên"),
            Some("001099012345".to_string())
        );
        assert_eq!(
            extract_id_number("CCCD079203001234"),
            Some("079203001234".to_string())
        );
        assert_eq!(extract_id_number("ID1234567890123"), None);
    }
}
