//! Versioned registration payloads.
//!
//! Three form layouts have posted registrations over time:
//!
//! - version 1: `schoolName`/`masterFullName`/`location` with `competitors`,
//!   a declared age and a lowercase four-value age category
//! - version 2: `school`/`teacherName`/`teacherLastName`/`locality` with
//!   `participants`, a declared age, a four-value category and a single
//!   hand-forms choice
//! - version 3: the canonical [`Registration`]
//!
//! Everything is migrated to version 3. Older layouts let the user pick an
//! age category by hand from four values, while the canonical schema derives
//! one of five bands. The two tables disagree for some ages and which one the
//! tournament actually uses is still undecided, so a migrated participant
//! keeps the hand-picked value in `declared_category` and every disagreement
//! is reported as a [`MigrationNote::CategoryMismatch`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::category::classify_age;
use crate::models::{
    BirthInfo, CombatKind, FormStyle, Grade, Modalities, Participant, Registration, SchoolInfo,
    WeaponKind,
};

pub const CURRENT_VERSION: u32 = 3;

const VERSION_KEY: &str = "schemaVersion";

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(u64),

    #[error("Could not recognise the registration layout")]
    UnknownLayout,

    #[error("Invalid registration payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unknown value '{value}' in {field}")]
    UnknownSelection { field: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MigrationNote {
    /// Hand-picked category differs from the one derived from age.
    #[serde(rename_all = "camelCase")]
    CategoryMismatch {
        participant: usize,
        declared: String,
        derived: String,
    },
    /// A single "full name" field was split into name and last name.
    #[serde(rename_all = "camelCase")]
    TeacherNameSplit { original: String },
}

#[derive(Debug, Clone)]
pub struct Migrated {
    pub registration: Registration,
    pub from_version: u32,
    pub notes: Vec<MigrationNote>,
}

fn lenient_age<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| serde::de::Error::custom("age out of range")),
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| serde::de::Error::custom(format!("invalid age: {}", s))),
        _ => Err(serde::de::Error::custom("age must be a number")),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompetitorV1 {
    name: String,
    last_name: String,
    #[serde(default)]
    dni: Option<String>,
    #[serde(deserialize_with = "lenient_age")]
    age: i32,
    kyu_rank: Grade,
    #[serde(default)]
    category_age: Option<String>,
    #[serde(default)]
    forms_categories: Vec<String>,
    #[serde(default)]
    combat_categories: Vec<String>,
    #[serde(default)]
    weapon_forms_categories: Vec<String>,
    #[serde(default)]
    exhibition: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationV1 {
    school_name: String,
    martial_art_style: String,
    master_full_name: String,
    location: String,
    #[serde(default)]
    competitors: Vec<CompetitorV1>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantV2 {
    name: String,
    last_name: String,
    #[serde(deserialize_with = "lenient_age")]
    age: i32,
    grade: Grade,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    forms: Option<String>,
    #[serde(default)]
    combat: Vec<String>,
    #[serde(default)]
    weapons: Vec<String>,
    #[serde(default)]
    exhibition: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationV2 {
    school: String,
    martial_art_style: String,
    teacher_name: String,
    teacher_last_name: String,
    locality: String,
    #[serde(default)]
    participants: Vec<ParticipantV2>,
}

fn parse_all<T: std::str::FromStr<Err = String>>(
    field: &str,
    values: &[String],
) -> Result<Vec<T>, SchemaError> {
    values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            v.parse().map_err(|_| SchemaError::UnknownSelection {
                field: field.to_string(),
                value: v.clone(),
            })
        })
        .collect()
}

/// Splits "Juan Carlos Pérez" into ("Juan Carlos", "Pérez").
fn split_full_name(full: &str) -> (String, String) {
    let trimmed = full.trim();
    match trimmed.rsplit_once(char::is_whitespace) {
        Some((first, last)) => (first.trim().to_string(), last.to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn check_declared_category(
    index: usize,
    age: i32,
    declared: Option<&str>,
    notes: &mut Vec<MigrationNote>,
) {
    let Some(declared) = declared else {
        return;
    };
    let derived = classify_age(age).category_label();
    if !declared.eq_ignore_ascii_case(derived) {
        warn!(
            participant = index + 1,
            age,
            declared,
            derived,
            "Declared category differs from derived category"
        );
        notes.push(MigrationNote::CategoryMismatch {
            participant: index + 1,
            declared: declared.to_string(),
            derived: derived.to_string(),
        });
    }
}

impl RegistrationV1 {
    fn migrate(self) -> Result<Migrated, SchemaError> {
        let mut notes = Vec::new();
        let (teacher_name, teacher_last_name) = split_full_name(&self.master_full_name);
        notes.push(MigrationNote::TeacherNameSplit {
            original: self.master_full_name.clone(),
        });

        let mut participants = Vec::with_capacity(self.competitors.len());
        for (i, c) in self.competitors.into_iter().enumerate() {
            let declared = non_empty(c.category_age);
            check_declared_category(i, c.age, declared.as_deref(), &mut notes);
            let modalities = Modalities {
                exhibition: c.exhibition,
                hand_forms: parse_all::<FormStyle>("formsCategories", &c.forms_categories)?,
                weapon_forms: parse_all::<WeaponKind>("weaponFormsCategories", &c.weapon_forms_categories)?,
                combat_kinds: parse_all::<CombatKind>("combatCategories", &c.combat_categories)?,
                ..Default::default()
            }
            .with_implied_flags();

            participants.push(Participant {
                name: c.name,
                last_name: c.last_name,
                birth: Some(BirthInfo::Age(c.age)),
                grade: c.kyu_rank,
                specific_grade: None,
                document_id: non_empty(c.dni),
                declared_category: declared,
                modalities,
            });
        }

        Ok(Migrated {
            registration: Registration {
                school: SchoolInfo {
                    school_name: self.school_name,
                    province: None,
                    locality: self.location,
                    martial_art_style: self.martial_art_style,
                    teacher_name,
                    teacher_last_name,
                    teacher_phone: None,
                },
                participants,
            },
            from_version: 1,
            notes,
        })
    }
}

impl RegistrationV2 {
    fn migrate(self) -> Result<Migrated, SchemaError> {
        let mut notes = Vec::new();
        let mut participants = Vec::with_capacity(self.participants.len());
        for (i, p) in self.participants.into_iter().enumerate() {
            let declared = non_empty(p.category);
            check_declared_category(i, p.age, declared.as_deref(), &mut notes);
            let hand_forms: Vec<String> = non_empty(p.forms).into_iter().collect();
            let modalities = Modalities {
                exhibition: p.exhibition,
                hand_forms: parse_all::<FormStyle>("forms", &hand_forms)?,
                weapon_forms: parse_all::<WeaponKind>("weapons", &p.weapons)?,
                combat_kinds: parse_all::<CombatKind>("combat", &p.combat)?,
                ..Default::default()
            }
            .with_implied_flags();

            participants.push(Participant {
                name: p.name,
                last_name: p.last_name,
                birth: Some(BirthInfo::Age(p.age)),
                grade: p.grade,
                specific_grade: None,
                document_id: None,
                declared_category: declared,
                modalities,
            });
        }

        Ok(Migrated {
            registration: Registration {
                school: SchoolInfo {
                    school_name: self.school,
                    province: None,
                    locality: self.locality,
                    martial_art_style: self.martial_art_style,
                    teacher_name: self.teacher_name,
                    teacher_last_name: self.teacher_last_name,
                    teacher_phone: None,
                },
                participants,
            },
            from_version: 2,
            notes,
        })
    }
}

fn explicit_version(obj: &serde_json::Map<String, Value>) -> Option<u64> {
    match obj.get(VERSION_KEY)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Guess the layout of an untagged payload from its keys.
fn sniff_version(obj: &serde_json::Map<String, Value>) -> Option<u64> {
    if obj.contains_key("competitors") || obj.contains_key("masterFullName") {
        Some(1)
    } else if obj.get("school").map(Value::is_string).unwrap_or(false) {
        Some(2)
    } else if obj.get("school").map(Value::is_object).unwrap_or(false) {
        Some(3)
    } else {
        None
    }
}

/// Read a registration in any known layout and migrate it to the canonical one.
pub fn migrate(payload: Value) -> Result<Migrated, SchemaError> {
    let mut obj = match payload {
        Value::Object(obj) => obj,
        _ => return Err(SchemaError::UnknownLayout),
    };
    let version = match explicit_version(&obj) {
        Some(v) => v,
        None => sniff_version(&obj).ok_or(SchemaError::UnknownLayout)?,
    };
    obj.remove(VERSION_KEY);
    debug!(version, "Migrating registration payload");

    let payload = Value::Object(obj);
    match version {
        1 => serde_json::from_value::<RegistrationV1>(payload)?.migrate(),
        2 => serde_json::from_value::<RegistrationV2>(payload)?.migrate(),
        3 => Ok(Migrated {
            registration: serde_json::from_value(payload)?,
            from_version: CURRENT_VERSION,
            notes: Vec::new(),
        }),
        other => Err(SchemaError::UnsupportedVersion(other)),
    }
}

pub fn migrate_str(json: &str) -> Result<Migrated, SchemaError> {
    migrate(serde_json::from_str(json)?)
}
