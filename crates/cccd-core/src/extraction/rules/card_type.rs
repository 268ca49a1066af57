//! Document type detection from header vocabulary.

use crate::models::CardType;

/// Marker phrases per card type, most specific document first.
const CARD_MARKERS: &[(CardType, &[&str])] = &[
    (CardType::CitizenIdentity, &["CĂN CƯỚC", "CITIZEN IDENTITY"]),
    (CardType::OldIdentityCard, &["CHỨNG MINH", "IDENTITY CARD"]),
    (CardType::Passport, &["PASSPORT", "HỘ CHIẾU"]),
];

/// First marker found (case-insensitive) decides the card type.
pub fn detect_card_type(text: &str) -> CardType {
    let upper = text.to_uppercase();
    CARD_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| upper.contains(m)))
        .map(|(card_type, _)| *card_type)
        .unwrap_or(CardType::Unknown)
}
