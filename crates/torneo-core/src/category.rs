//! Age and competition category derivation.
//!
//! Categories come from a fixed table of non-overlapping age bands. A
//! participant's category is always derived from their age; it is never
//! taken from user input in the canonical schema.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::FieldError;

/// Youngest age that has a category.
const MIN_CATEGORY_AGE: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum AgeCategory {
    Infantil,
    Juvenil,
    Adulto,
    Senior,
    #[serde(rename = "Senior Senior")]
    SeniorSenior,
}

impl AgeCategory {
    pub const ALL: [AgeCategory; 5] = [
        AgeCategory::Infantil,
        AgeCategory::Juvenil,
        AgeCategory::Adulto,
        AgeCategory::Senior,
        AgeCategory::SeniorSenior,
    ];

    /// Band lookup. Ages under six have no category.
    pub fn for_age(age: i32) -> Option<Self> {
        match age {
            a if a < MIN_CATEGORY_AGE => None,
            6..=12 => Some(AgeCategory::Infantil),
            13..=17 => Some(AgeCategory::Juvenil),
            18..=35 => Some(AgeCategory::Adulto),
            36..=50 => Some(AgeCategory::Senior),
            _ => Some(AgeCategory::SeniorSenior),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeCategory::Infantil => "Infantil",
            AgeCategory::Juvenil => "Juvenil",
            AgeCategory::Adulto => "Adulto",
            AgeCategory::Senior => "Senior",
            AgeCategory::SeniorSenior => "Senior Senior",
        }
    }

    /// Inclusive age range of the band; the last band is open-ended.
    pub fn age_range(&self) -> (i32, Option<i32>) {
        match self {
            AgeCategory::Infantil => (6, Some(12)),
            AgeCategory::Juvenil => (13, Some(17)),
            AgeCategory::Adulto => (18, Some(35)),
            AgeCategory::Senior => (36, Some(50)),
            AgeCategory::SeniorSenior => (51, None),
        }
    }
}

impl std::fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of classifying a birth date or a declared age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub age: i32,
    pub category: Option<AgeCategory>,
}

impl Classification {
    pub const EMPTY: Classification = Classification { age: 0, category: None };

    /// Category label, or the empty string when the age has no band.
    pub fn category_label(&self) -> &'static str {
        self.category.map(|c| c.label()).unwrap_or("")
    }
}

/// Whole years between `birth` and `today`, one less if this year's birthday
/// has not happened yet. Negative for dates after `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Classify a birth date relative to `today`.
///
/// A missing birth date is not an error: it yields age 0 and no category,
/// which is what the form shows before the field is filled in.
pub fn classify(birth: Option<NaiveDate>, today: NaiveDate) -> Classification {
    match birth {
        Some(birth) => classify_age(age_on(birth, today)),
        None => Classification::EMPTY,
    }
}

pub fn classify_age(age: i32) -> Classification {
    Classification {
        age,
        category: AgeCategory::for_age(age),
    }
}

/// Parse a birth date as typed into the form.
///
/// Accepts ISO (`2006-10-16`) and Argentine (`16/10/2006`) layouts. Blank
/// input is `Ok(None)`.
pub fn parse_birth_date(input: &str) -> Result<Option<NaiveDate>, FieldError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map(Some)
        .map_err(|_| FieldError::new("birthDate", format!("Fecha de nacimiento inválida: {}", trimmed)))
}
