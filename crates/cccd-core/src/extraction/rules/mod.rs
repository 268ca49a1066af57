//! Rule-based field resolvers for Vietnamese identity cards.
//!
//! Each resolver is independent and works on normalized text.

pub mod card_type;
pub mod dates;
pub mod gender;
pub mod id_number;
pub mod name;
pub mod nationality;
pub mod patterns;
pub mod places;
pub mod text;

pub use card_type::detect_card_type;
pub use dates::{extract_dob, extract_expiry};
pub use gender::extract_gender;
pub use id_number::extract_id_number;
pub use name::{extract_name, name_candidates};
pub use nationality::extract_nationality;
pub use places::{extract_origin, extract_residence};
pub use text::{cap_length, contains_letter, normalize, strip_junk};

/// A candidate value with its score and where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Score used to rank candidates; higher wins.
    pub score: f32,
    /// Character span in the source text.
    pub position: Option<(usize, usize)>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, score: f32) -> Self {
        Self {
            value,
            score,
            position: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Pick the highest-scoring candidate. Ties go to the earliest entry.
///
/// NaN scores never win.
pub fn rank_candidates<T>(candidates: &[(T, f32)]) -> Option<&T> {
    let mut best: Option<(&T, f32)> = None;
    for (value, score) in candidates {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if *score <= best_score => {}
            _ => best = Some((value, *score)),
        }
    }
    best.map(|(value, _)| value)
}

/// [`rank_candidates`] over scored matches.
pub fn best_match<T>(matches: &[ExtractionMatch<T>]) -> Option<&ExtractionMatch<T>> {
    let scored: Vec<(&ExtractionMatch<T>, f32)> = matches.iter().map(|m| (m, m.score)).collect();
    rank_candidates(&scored).copied()
}
