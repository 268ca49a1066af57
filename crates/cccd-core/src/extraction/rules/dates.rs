//! Date of birth and expiry date extraction.

use regex::Captures;

use super::patterns::{DATE_DMY, EXPIRY_LABELED_EN, EXPIRY_LABELED_VI};

/// Day, month and year of a `dd/mm/yyyy` capture, when day and month are in
/// range.
fn checked_parts(caps: &Captures<'_>) -> Option<(u32, u32, i32)> {
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    ((1..=31).contains(&day) && (1..=12).contains(&month)).then_some((day, month, year))
}

fn format_date(day: u32, month: u32, year: i32) -> String {
    format!("{:02}/{:02}/{:04}", day, month, year)
}

/// First valid date whose year lies in `[min_year, current_year]`.
pub fn extract_dob(text: &str, current_year: i32, min_year: i32) -> Option<String> {
    DATE_DMY.captures_iter(text).find_map(|caps| {
        let (day, month, year) = checked_parts(&caps)?;
        (min_year..=current_year)
            .contains(&year)
            .then(|| format_date(day, month, year))
    })
}

/// Expiry date, label-anchored first.
///
/// A labeled date may expire this year; an unlabeled one must lie strictly in
/// the future since it could be the issue date.
pub fn extract_expiry(text: &str, current_year: i32, horizon_years: i32) -> Option<String> {
    let latest = current_year + horizon_years;

    let labeled = EXPIRY_LABELED_VI
        .captures_iter(text)
        .chain(EXPIRY_LABELED_EN.captures_iter(text))
        .find_map(|caps| {
            let (day, month, year) = checked_parts(&caps)?;
            (current_year..=latest)
                .contains(&year)
                .then(|| format_date(day, month, year))
        });
    if labeled.is_some() {
        return labeled;
    }

    DATE_DMY.captures_iter(text).find_map(|caps| {
        let (day, month, year) = checked_parts(&caps)?;
        (year > current_year && year <= latest).then(|| format_date(day, month, year))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2025;

    #[test]
    fn test_dob_first_valid() {
        let text = "Ngày sinh: 15/08/1992 Có giá trị đến: 15/08/2032";
        assert_eq!(extract_dob(text, YEAR, 1900), Some("15/08/1992".to_string()));
    }

    #[test]
    fn test_dob_skips_invalid_and_future() {
        assert_eq!(extract_dob("32/01/1990 01/13/1990", YEAR, 1900), None);
        assert_eq!(extract_dob("01/01/2030", YEAR, 1900), None);
        assert_eq!(extract_dob("01/01/1899 02/02/1950", YEAR, 1900), Some("02/02/1950".to_string()));
        assert_eq!(extract_dob("01/01/2025", YEAR, 1900), Some("01/01/2025".to_string()));
    }

    #[test]
    fn test_expiry_labeled_vietnamese() {
        let text = "Ngày sinh 01/01/1990 Có giá trị đến: 01/01/2040";
        assert_eq!(extract_expiry(text, YEAR, 30), Some("01/01/2040".to_string()));
    }

    #[test]
    fn test_expiry_labeled_allows_current_year() {
        let text = "Date of expiry: 31/12/2025";
        assert_eq!(extract_expiry(text, YEAR, 30), Some("31/12/2025".to_string()));
    }

    #[test]
    fn test_expiry_fallback_requires_future_year() {
        // unlabeled current-year date may be an issue date
        assert_eq!(extract_expiry("10/10/2025", YEAR, 30), None);
        assert_eq!(
            extract_expiry("01/01/1990 10/10/2025 10/10/2031", YEAR, 30),
            Some("10/10/2031".to_string())
        );
    }

    #[test]
    fn test_expiry_horizon() {
        assert_eq!(extract_expiry("Có giá trị đến: 01/01/2056", YEAR, 30), None);
        assert_eq!(extract_expiry("01/01/2055", YEAR, 30), Some("01/01/2055".to_string()));
        assert_eq!(extract_expiry("01/01/2056", YEAR, 30), None);
    }

    #[test]
    fn test_expiry_labeled_rejected_falls_back() {
        // labeled date in the past, unlabeled future date elsewhere
        let text = "expiry: 01/01/2001 12/12/2035";
        assert_eq!(extract_expiry(text, YEAR, 30), Some("12/12/2035".to_string()));
    }

    #[test]
    fn test_date_properties_over_years() {
        let text = "01/01/1850 01/01/1900 05/05/1980 01/01/2024 01/01/2025 01/01/2026 01/01/2060";
        for year in 1990..2050 {
            if let Some(dob) = extract_dob(text, year, 1900) {
                let y: i32 = dob[6..].parse().unwrap();
                assert!((1900..=year).contains(&y));
            }
            if let Some(exp) = extract_expiry(text, year, 30) {
                let y: i32 = exp[6..].parse().unwrap();
                assert!(y > year && y <= year + 30);
            }
        }
    }
}
