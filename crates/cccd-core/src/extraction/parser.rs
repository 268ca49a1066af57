//! Field parser combining the independent resolvers into a record.

use chrono::{Datelike, Local};
use tracing::{debug, trace};

use crate::models::{ExtractedRecord, RawToken};

use super::rules::{
    detect_card_type, extract_dob, extract_expiry, extract_gender, extract_id_number,
    extract_name, extract_nationality, extract_origin, extract_residence, normalize,
};
use super::ExtractionTables;

/// Resolves identity fields from recognized text.
///
/// Holds only immutable tables, so one parser can be shared across threads.
#[derive(Debug, Clone)]
pub struct FieldParser {
    tables: ExtractionTables,
    /// Fixed "current year"; the local calendar year when unset.
    reference_year: Option<i32>,
}

impl FieldParser {
    pub fn new(tables: ExtractionTables) -> Self {
        Self {
            tables,
            reference_year: None,
        }
    }

    /// Pin the year used for date range checks.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    pub fn tables(&self) -> &ExtractionTables {
        &self.tables
    }

    fn current_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Local::now().year())
    }

    /// Parse recognized text into a record.
    ///
    /// `tokens` are the raw fragments behind `full_text`. Resolution works on
    /// the normalized text alone; tokens are only counted for logging.
    pub fn parse(&self, full_text: &str, tokens: &[RawToken]) -> ExtractedRecord {
        debug!(
            "Parsing {} characters from {} tokens",
            full_text.chars().count(),
            tokens.len()
        );
        self.parse_text(full_text)
    }

    /// Parse text without token information.
    pub fn parse_text(&self, full_text: &str) -> ExtractedRecord {
        let text = normalize(full_text);
        let year = self.current_year();
        let tables = &self.tables;

        let record = ExtractedRecord {
            card_type: detect_card_type(&text),
            id_number: extract_id_number(&text),
            full_name: extract_name(&text, tables),
            date_of_birth: extract_dob(&text, year, tables.min_birth_year),
            gender: extract_gender(&text),
            nationality: extract_nationality(&text, &tables.nationality_fixups),
            place_of_origin: extract_origin(&text, tables.max_place_length),
            place_of_residence: extract_residence(&text, tables.max_place_length),
            expiry_date: extract_expiry(&text, year, tables.expiry_horizon_years),
        };

        debug!(
            card_type = %record.card_type,
            fields = ?record.populated_fields(),
            "Extracted record"
        );
        trace!(?record, "Resolved fields");
        record
    }
}

impl Default for FieldParser {
    fn default() -> Self {
        Self::new(ExtractionTables::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardType, Gender};
    use pretty_assertions::assert_eq;

    fn parser() -> FieldParser {
        FieldParser::default().with_reference_year(2025)
    }

    #[test]
    fn test_header_then_fields() {
        let text = "CỘNG HÒA... NGUYỄN VĂN AN Nam 12345678901 01/01/1990";
        let record = parser().parse_text(text);

        assert_eq!(record.id_number, None);
        assert_eq!(record.full_name.as_deref(), Some("NGUYỄN VĂN AN"));
        assert_eq!(record.gender, Some(Gender::Male));
        assert_eq!(record.date_of_birth.as_deref(), Some("01/01/1990"));
        assert_eq!(record.expiry_date, None);
    }

    #[test]
    fn test_full_front_side() {
        let text = "CỘNG HÒA XÃ HỘI CHỦ NGHĨA VIỆT NAM\n\
                    Độc lập - Tự do - Hạnh phúc\n\
                    SOCIALIST REPUBLIC OF VIET NAM\n\
                    CĂN CƯỚC CÔNG DÂN\n\
                    Citizen Identity Card\n\
                    Số / No.: 001099012345\n\
                    Họ và tên / Full name:\n\
                    TRẦN THỊ MAI\n\
                    Ngày sinh / Date of birth: 15/08/1992\n\
                    Giới tính / Sex: Nữ Quốc tịch / Nationality: Việt Nam\n\
                    Quê quán / Place of origin: Hà Nội\n\
                    Nơi thường trú / Place of residence: 12 Lê Lợi, Hoàn Kiếm, Hà Nội\n\
                    Có giá trị đến: 15/08/2032";

        let record = parser().parse(text, &[]);
        let expected = ExtractedRecord {
            card_type: CardType::CitizenIdentity,
            id_number: Some("001099012345".to_string()),
            full_name: Some("TRẦN THỊ MAI".to_string()),
            date_of_birth: Some("15/08/1992".to_string()),
            gender: Some(Gender::Female),
            nationality: Some("Việt Nam".to_string()),
            place_of_origin: Some("Hà Nội".to_string()),
            place_of_residence: Some("12 Lê Lợi, Hoàn Kiếm, Hà Nội".to_string()),
            expiry_date: Some("15/08/2032".to_string()),
        };
        assert_eq!(record, expected);
    }

    #[test]
    fn test_empty_text() {
        let record = parser().parse_text("");
        assert!(record.is_empty());
        assert_eq!(record.card_type, CardType::Unknown);
    }

    #[test]
    fn test_missing_fields_do_not_block_others() {
        let record = parser().parse_text("garbage ### 079203001234 ### more garbage");
        assert_eq!(record.id_number.as_deref(), Some("079203001234"));
        assert_eq!(record.full_name, None);
        assert_eq!(record.populated_fields(), vec!["id_number"]);
    }

    #[test]
    fn test_reference_year_changes_expiry() {
        let text = "Có giá trị đến: 01/01/2030";
        assert_eq!(
            parser().parse_text(text).expiry_date.as_deref(),
            Some("01/01/2030")
        );
        let later = FieldParser::default().with_reference_year(2031);
        assert_eq!(later.parse_text(text).expiry_date, None);
    }

    #[test]
    fn test_line_breaks_do_not_matter() {
        let a = parser().parse_text("Họ và tên:\nLÊ\nVĂN\nTÁM\nSex: Male");
        let b = parser().parse_text("Họ và tên: LÊ VĂN TÁM Sex: Male");
        assert_eq!(a, b);
        assert_eq!(a.full_name.as_deref(), Some("LÊ VĂN TÁM"));
    }
}
