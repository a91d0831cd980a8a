//! Field rules checked before a registration is normalized.
//!
//! Every violated rule is reported, not just the first, so the form can mark
//! all bad fields at once. Field paths use the JSON names of the canonical
//! schema (`participants[0].lastName`).

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::{BirthInfo, Participant, Registration, SchoolInfo};

/// Minimum length of every required free-text field.
pub const MIN_TEXT_LEN: usize = 2;

pub const MIN_AGE: i32 = 3;
pub const MAX_AGE: i32 = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn nested(mut self, prefix: &str) -> Self {
        self.field = format!("{}.{}", prefix, self.field);
        self
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let summary = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{} campo(s) inválido(s): {}", self.errors.len(), summary)
    }
}

impl ValidationErrors {
    pub fn into_result(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// A required text field and the message shown when it is too short.
struct MinLength<T> {
    field: &'static str,
    get: fn(&T) -> &str,
    message: &'static str,
}

const SCHOOL_RULES: &[MinLength<SchoolInfo>] = &[
    MinLength {
        field: "schoolName",
        get: |s| s.school_name.as_str(),
        message: "El nombre de la escuela debe tener al menos 2 caracteres.",
    },
    MinLength {
        field: "locality",
        get: |s| s.locality.as_str(),
        message: "La localidad debe tener al menos 2 caracteres.",
    },
    MinLength {
        field: "martialArtStyle",
        get: |s| s.martial_art_style.as_str(),
        message: "El estilo de arte marcial debe tener al menos 2 caracteres.",
    },
    MinLength {
        field: "teacherName",
        get: |s| s.teacher_name.as_str(),
        message: "El nombre del maestro debe tener al menos 2 caracteres.",
    },
    MinLength {
        field: "teacherLastName",
        get: |s| s.teacher_last_name.as_str(),
        message: "El apellido del maestro debe tener al menos 2 caracteres.",
    },
];

const PARTICIPANT_RULES: &[MinLength<Participant>] = &[
    MinLength {
        field: "name",
        get: |p| p.name.as_str(),
        message: "El nombre es requerido.",
    },
    MinLength {
        field: "lastName",
        get: |p| p.last_name.as_str(),
        message: "El apellido es requerido.",
    },
];

fn check_min_length<T>(value: &T, rules: &[MinLength<T>]) -> Vec<FieldError> {
    rules
        .iter()
        .filter(|rule| (rule.get)(value).trim().chars().count() < MIN_TEXT_LEN)
        .map(|rule| FieldError::new(rule.field, rule.message))
        .collect()
}

pub fn validate_school(school: &SchoolInfo) -> Vec<FieldError> {
    check_min_length(school, SCHOOL_RULES)
}

fn check_age(age: i32) -> Option<&'static str> {
    if age < MIN_AGE {
        Some("La edad mínima es 3 años.")
    } else if age > MAX_AGE {
        Some("La edad máxima es 99 años.")
    } else {
        None
    }
}

/// Rules for one participant, with field names relative to the participant.
pub fn validate_participant(participant: &Participant, today: NaiveDate) -> Vec<FieldError> {
    let mut errors = check_min_length(participant, PARTICIPANT_RULES);

    match participant.birth {
        None => errors.push(FieldError::new("birth", "La fecha de nacimiento o la edad es requerida.")),
        Some(BirthInfo::Age(age)) => {
            if let Some(msg) = check_age(age) {
                errors.push(FieldError::new("birth", msg));
            }
        }
        Some(BirthInfo::Date(_)) => {
            let age = participant.classification(today).age;
            if let Some(msg) = check_age(age) {
                errors.push(FieldError::new("birth", msg));
            }
        }
    }

    let m = &participant.modalities;
    if !m.any_selected() {
        errors.push(FieldError::new("modalities", "Debes seleccionar al menos una modalidad."));
    }
    if m.forms && m.hand_forms.is_empty() && m.weapon_forms.is_empty() {
        errors.push(FieldError::new(
            "modalities.handForms",
            "Debes seleccionar una categoría de formas.",
        ));
    }
    if m.combat && m.combat_kinds.is_empty() {
        errors.push(FieldError::new(
            "modalities.combatKinds",
            "Debes seleccionar al menos una categoría de combate.",
        ));
    }

    errors
}

pub fn validate_participants(participants: &[Participant], today: NaiveDate) -> Vec<FieldError> {
    if participants.is_empty() {
        return vec![FieldError::new("participants", "Debes agregar al menos un participante.")];
    }
    participants
        .iter()
        .enumerate()
        .flat_map(|(i, p)| {
            let prefix = format!("participants[{}]", i);
            validate_participant(p, today)
                .into_iter()
                .map(move |e| e.nested(&prefix))
        })
        .collect()
}

pub fn validate_registration(registration: &Registration, today: NaiveDate) -> Result<(), ValidationErrors> {
    let mut errors: Vec<FieldError> = validate_school(&registration.school)
        .into_iter()
        .map(|e| e.nested("school"))
        .collect();
    errors.extend(validate_participants(&registration.participants, today));
    ValidationErrors::into_result(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CombatKind, Grade, Modalities};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn valid_school() -> SchoolInfo {
        SchoolInfo {
            school_name: "Dragón Blanco".to_string(),
            province: None,
            locality: "Burzaco".to_string(),
            martial_art_style: "Kung Fu".to_string(),
            teacher_name: "Juan".to_string(),
            teacher_last_name: "Pérez".to_string(),
            teacher_phone: None,
        }
    }

    fn valid_participant() -> Participant {
        let mut p = Participant::new("Ana", "Gómez", Grade::KyuA);
        p.birth = Some(BirthInfo::Age(15));
        p.modalities.exhibition = true;
        p
    }

    #[test]
    fn test_valid_registration() {
        let reg = Registration {
            school: valid_school(),
            participants: vec![valid_participant()],
        };
        assert!(validate_registration(&reg, today()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut school = valid_school();
        school.school_name = "D".to_string();
        school.teacher_last_name = "  ".to_string();
        let mut p = valid_participant();
        p.last_name = String::new();
        p.modalities = Modalities::default();

        let reg = Registration {
            school,
            participants: vec![valid_participant(), p],
        };
        let err = validate_registration(&reg, today()).unwrap_err();
        assert_eq!(err.errors.len(), 4);
        assert!(err.has_field("school.schoolName"));
        assert!(err.has_field("school.teacherLastName"));
        assert!(err.has_field("participants[1].lastName"));
        assert!(err.has_field("participants[1].modalities"));
        assert!(err.to_string().starts_with("4 campo(s)"));
    }

    #[test]
    fn test_age_range() {
        let mut p = valid_participant();
        p.birth = Some(BirthInfo::Age(2));
        assert_eq!(validate_participant(&p, today())[0].message, "La edad mínima es 3 años.");

        p.birth = Some(BirthInfo::Age(100));
        assert_eq!(validate_participant(&p, today())[0].message, "La edad máxima es 99 años.");

        p.birth = Some(BirthInfo::Date(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
        assert_eq!(validate_participant(&p, today()).len(), 1);

        p.birth = Some(BirthInfo::Date(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()));
        assert!(validate_participant(&p, today()).is_empty());

        p.birth = None;
        assert_eq!(validate_participant(&p, today())[0].field, "birth");
    }

    #[test]
    fn test_modality_sub_selections() {
        let mut p = valid_participant();
        p.modalities.combat = true;
        let errors = validate_participant(&p, today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "modalities.combatKinds");

        p.modalities.combat_kinds.push(CombatKind::Kickboxing);
        p.modalities.forms = true;
        let errors = validate_participant(&p, today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "modalities.handForms");
    }

    #[test]
    fn test_no_participants() {
        let reg = Registration {
            school: valid_school(),
            participants: vec![],
        };
        let err = validate_registration(&reg, today()).unwrap_err();
        assert!(err.has_field("participants"));
    }
}
