//! Regex patterns for Vietnamese identity card fields.
//!
//! All patterns run against normalized single-line text, so "line" patterns
//! capture up to the next known label rather than a newline.

use lazy_static::lazy_static;
use regex::Regex;

/// Uppercase letters used in Vietnamese names, including precomposed
/// diacritics and `Đ`.
pub const VI_UPPER: &str = "A-ZÀÁẠẢÃÂẦẤẬẨẪĂẰẮẶẲẴÈÉẸẺẼÊỀẾỆỂỄÌÍỊỈĨÒÓỌỎÕÔỒỐỘỔỖƠỜỚỢỞỠÙÚỤỦŨƯỪỨỰỬỮỲÝỴỶỸĐ";

lazy_static! {
    // Normalization
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Maximal ASCII digit runs; the ID number is a run of exactly twelve
    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();

    // Full name: 2-4 consecutive uppercase words of 2+ letters
    pub static ref NAME_CANDIDATE: Regex = Regex::new(&format!(
        r"\b([{u}]{{2,}}(?:\s+[{u}]{{2,}}){{1,3}})\b",
        u = VI_UPPER
    ))
    .unwrap();

    // dd/mm/yyyy
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b([0-9]{2})/([0-9]{2})/([0-9]{4})\b"
    ).unwrap();

    // Labeled expiry dates, Vietnamese first
    pub static ref EXPIRY_LABELED_VI: Regex = Regex::new(
        r"(?i)(?:Có\s+giá\s+trị\s+đến|Co\s+gia\s+tri\s+den|giá\s+trj\s+dên)[:\s]+([0-9]{2})/([0-9]{2})/([0-9]{4})"
    ).unwrap();

    pub static ref EXPIRY_LABELED_EN: Regex = Regex::new(
        r"(?i)(?:Date\s+of\s+)?expiry[:\s]+([0-9]{2})/([0-9]{2})/([0-9]{4})"
    ).unwrap();

    // Gender
    pub static ref GENDER_LABELED: Regex = Regex::new(
        r"(?i)(?:Giới\s*tính|Sex)[:\s]+(Nữ|Nam|Female|Male)"
    ).unwrap();

    pub static ref GENDER_BARE: Regex = Regex::new(
        r"(?i)\b(Nữ|Nam|Female|Male)\b"
    ).unwrap();

    // Nationality
    pub static ref NATIONALITY_EN: Regex = Regex::new(
        r"(?i)Nationality[:\s]+([^\n]+)"
    ).unwrap();

    pub static ref NATIONALITY_VI: Regex = Regex::new(
        r"(?i)(?:Quốc\s*tịch|tich)[:\s]+([^\n]+)"
    ).unwrap();

    /// Labels OCR tends to glue onto the nationality value.
    pub static ref NATIONALITY_TRAILER: Regex = Regex::new(
        r"(?i)\s+(?:Giới|Quê|Place|of\s+origin)"
    ).unwrap();

    pub static ref NATIONALITY_SHAPE: Regex = Regex::new(
        r"^[A-Za-zÀ-ỹ\s]{2,20}$"
    ).unwrap();

    // Place of origin
    pub static ref ORIGIN_EN: Regex = Regex::new(
        r"(?i)origin[:\s]+(.+?)(?:\s+(?:thuòng|thu[oò]ng|N[oơ]i|Place\s+of\s+residence|Có\s+giá)|$)"
    ).unwrap();

    pub static ref ORIGIN_VI: Regex = Regex::new(
        r"(?i)Quê\s+quán[:\s/]+(.+?)(?:\s+Nơi|$)"
    ).unwrap();

    pub static ref ORIGIN_JUNK: Regex = Regex::new(
        r"(?i)thu[oò]ng\s+"
    ).unwrap();

    // Place of residence
    pub static ref RESIDENCE_EN: Regex = Regex::new(
        r"(?is)residence[:\s]+(.+?)(?:\s*(?:Co|Có)\s+gi[aá]|Date\s+of\s+expiry|$)"
    ).unwrap();

    pub static ref RESIDENCE_VI: Regex = Regex::new(
        r"(?is)Noi\s+thu[oò]ng\s+tr[uú][:\s/]+(.+?)(?:\s*(?:Co|Có)\s+gi[aá]|$)"
    ).unwrap();

    /// Fragments stripped from residence values, in order. Later entries
    /// assume earlier ones already ran.
    pub static ref RESIDENCE_JUNK: Vec<Regex> = [
        r"(?i)Noi\s+trú[:/\s]+",
        r"(?i)Place\s+of\s+residence[:\s]+",
        r"(?i)thu[oò]ng\s+",
        r"(?is)\s*(?:Co|Có)\s+gi[aá].*$",
        r"(?is)\s*Date\s+of.*$",
        r"(?is)\s+Place\s+\d+.*$",
        r"(?i)\s+Place$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    /// At least one Latin or Vietnamese letter.
    pub static ref HAS_LETTER: Regex = Regex::new(r"[A-Za-zÀ-ỹ]").unwrap();
}
