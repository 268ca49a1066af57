//! The structured record produced by the field extraction engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of identity document, detected from marker phrases in the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    /// Căn cước công dân (chip-based citizen identity card).
    CitizenIdentity,
    /// Chứng minh nhân dân (legacy identity card).
    OldIdentityCard,
    /// Hộ chiếu.
    Passport,
    #[default]
    Unknown,
}

impl CardType {
    /// Vietnamese label as printed on the document.
    pub fn label(&self) -> &'static str {
        match self {
            CardType::CitizenIdentity => "Căn cước công dân",
            CardType::OldIdentityCard => "Chứng minh nhân dân",
            CardType::Passport => "Hộ chiếu",
            CardType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical gender value. Serializes as the Vietnamese token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Nam")]
    Male,
    #[serde(rename = "Nữ")]
    Female,
}

impl Gender {
    /// Parse a recognized token in either script, any case.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "nam" | "male" => Some(Gender::Male),
            "nữ" | "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Nam",
            Gender::Female => "Nữ",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields extracted from one identity document.
///
/// Every field is independently optional; a missing field is ordinary output.
/// Dates keep the `dd/mm/yyyy` form they were read in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub card_type: CardType,

    /// Twelve ASCII digits.
    pub id_number: Option<String>,

    /// Uppercase, two to four words.
    pub full_name: Option<String>,

    pub date_of_birth: Option<String>,

    pub gender: Option<Gender>,

    pub nationality: Option<String>,

    pub place_of_origin: Option<String>,

    pub place_of_residence: Option<String>,

    pub expiry_date: Option<String>,
}

impl ExtractedRecord {
    /// Names of the fields that hold a value, in declaration order.
    pub fn populated_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.card_type != CardType::Unknown {
            fields.push("card_type");
        }
        let optional = [
            ("id_number", self.id_number.is_some()),
            ("full_name", self.full_name.is_some()),
            ("date_of_birth", self.date_of_birth.is_some()),
            ("gender", self.gender.is_some()),
            ("nationality", self.nationality.is_some()),
            ("place_of_origin", self.place_of_origin.is_some()),
            ("place_of_residence", self.place_of_residence.is_some()),
            ("expiry_date", self.expiry_date.is_some()),
        ];
        fields.extend(optional.iter().filter(|(_, set)| *set).map(|(name, _)| *name));
        fields
    }

    /// True when nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.populated_fields().is_empty()
    }
}
