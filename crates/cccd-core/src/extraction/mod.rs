//! Field extraction engine for Vietnamese identity documents.
//!
//! This module provides:
//! - Text normalization
//! - Independent per-field resolvers (ID number, name, dates, gender,
//!   nationality, places)
//! - Card type detection
//! - A [`FieldParser`] combining them into an [`ExtractedRecord`]
//!
//! [`ExtractedRecord`]: crate::models::ExtractedRecord

pub mod parser;
pub mod rules;

use std::collections::HashMap;

use crate::models::config::ExtractionConfig;

pub use parser::FieldParser;
pub use rules::{normalize, rank_candidates};

/// Immutable lookup tables and limits injected into the field parser.
#[derive(Debug, Clone)]
pub struct ExtractionTables {
    /// Blacklist entries, uppercased with spaces removed.
    pub blacklist: Vec<String>,
    /// Garbled name word to canonical spelling.
    pub name_corrections: HashMap<String, String>,
    /// Ordered substring replacements for nationality values.
    pub nationality_fixups: Vec<(String, String)>,
    pub max_place_length: usize,
    pub expiry_horizon_years: i32,
    pub min_birth_year: i32,
}

impl ExtractionTables {
    /// Whether `candidate` contains any blacklisted entry, ignoring case and
    /// spaces.
    pub fn is_blacklisted(&self, candidate: &str) -> bool {
        let compact: String = candidate
            .to_uppercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        self.blacklist
            .iter()
            .any(|entry| !entry.is_empty() && compact.contains(entry.as_str()))
    }

    /// Corrected spelling for one name word, or the word itself.
    pub fn correct_word<'a>(&'a self, word: &'a str) -> &'a str {
        self.name_corrections
            .get(word)
            .map(String::as_str)
            .unwrap_or(word)
    }
}

impl From<&ExtractionConfig> for ExtractionTables {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            blacklist: config
                .blacklist
                .iter()
                .map(|entry| entry.to_uppercase().replace(' ', ""))
                .collect(),
            name_corrections: config.name_corrections.iter().cloned().collect(),
            nationality_fixups: config.nationality_fixups.clone(),
            max_place_length: config.max_place_length,
            expiry_horizon_years: config.expiry_horizon_years,
            min_birth_year: config.min_birth_year,
        }
    }
}

impl Default for ExtractionTables {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklist_ignores_case_and_spaces() {
        let tables = ExtractionTables::default();
        assert!(tables.is_blacklisted("CỘNG HÒA"));
        assert!(tables.is_blacklisted("viet nam"));
        assert!(tables.is_blacklisted("CĂN CƯỚC"));
        assert!(!tables.is_blacklisted("NGUYỄN VĂN AN"));
    }

    #[test]
    fn test_custom_tables() {
        let config = ExtractionConfig {
            blacklist: vec!["test card".to_string()],
            name_corrections: vec![("NGUEN".to_string(), "NGUYỄN".to_string())],
            ..Default::default()
        };
        let tables = ExtractionTables::from(&config);
        assert!(tables.is_blacklisted("A TESTCARD B"));
        assert!(!tables.is_blacklisted("CỘNG HÒA"));
        assert_eq!(tables.correct_word("NGUEN"), "NGUYỄN");
        assert_eq!(tables.correct_word("AN"), "AN");
    }
}
