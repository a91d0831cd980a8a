//! Registration → spreadsheet rows.
//!
//! The normalizer assumes its input already passed validation and has no
//! failure mode. Everything time- or randomness-dependent comes in through
//! `SubmissionContext` so the mapping itself stays pure.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{ExportRecord, Participant, Registration, SchoolInfo};

const YES: &str = "Sí";
const NO: &str = "No";

/// Separator for multi-select columns.
const LIST_SEPARATOR: &str = ", ";

/// Identifier shared by every row of one submission.
///
/// `REG_<yyyymmddHHMMSS>_<8 hex digits>`: the time part keeps ids sortable,
/// the random part keeps two submissions in the same second apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(String);

impl RegistrationId {
    pub fn generate(at: DateTime<Utc>) -> Self {
        let suffix: u32 = rand::thread_rng().gen();
        Self(format!("REG_{}_{:08x}", at.format("%Y%m%d%H%M%S"), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RegistrationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionContext {
    pub registration_id: RegistrationId,
    pub submitted_at: DateTime<Utc>,
    /// Reference date for age calculation, in the tournament's local calendar.
    pub today: NaiveDate,
}

impl SubmissionContext {
    /// Context for a submission happening now.
    pub fn now() -> Self {
        let submitted_at = Utc::now();
        Self {
            registration_id: RegistrationId::generate(submitted_at),
            submitted_at,
            today: Local::now().date_naive(),
        }
    }
}

fn yes_no(flag: bool) -> String {
    let text = if flag { YES } else { NO };
    text.to_string()
}

fn join_labels<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn record_for(
    school: &SchoolInfo,
    participant: &Participant,
    number: usize,
    ctx: &SubmissionContext,
) -> ExportRecord {
    let classification = participant.classification(ctx.today);
    let modalities = &participant.modalities;

    ExportRecord {
        registration_id: ctx.registration_id.to_string(),
        participant_number: number.to_string(),
        registration_date: ctx.submitted_at.with_timezone(&Local).format("%d/%m/%Y").to_string(),
        timestamp: ctx.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        school_name: school.school_name.clone(),
        province: school.province.clone().unwrap_or_default(),
        locality: school.locality.clone(),
        martial_art_style: school.martial_art_style.clone(),
        teacher_name: school.teacher_name.clone(),
        teacher_last_name: school.teacher_last_name.clone(),
        teacher_phone: school.teacher_phone.clone().unwrap_or_default(),
        participant_name: participant.name.clone(),
        participant_last_name: participant.last_name.clone(),
        document_id: participant.document_id.clone().unwrap_or_default(),
        birth_date: participant
            .birth_date()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
        age: if participant.birth.is_some() {
            classification.age.to_string()
        } else {
            String::new()
        },
        category: classification.category_label().to_string(),
        declared_category: participant.declared_category.clone().unwrap_or_default(),
        grade: participant.grade.to_string(),
        specific_grade: participant.specific_grade.clone().unwrap_or_default(),
        exhibition: yes_no(modalities.exhibition),
        forms: yes_no(modalities.forms),
        hand_forms: join_labels(&modalities.hand_forms),
        weapon_forms: join_labels(&modalities.weapon_forms),
        combat: yes_no(modalities.combat),
        combat_kinds: join_labels(&modalities.combat_kinds),
    }
}

/// One record per participant, numbered from 1 in input order.
pub fn normalize(
    school: &SchoolInfo,
    participants: &[Participant],
    ctx: &SubmissionContext,
) -> Vec<ExportRecord> {
    participants
        .iter()
        .enumerate()
        .map(|(i, p)| record_for(school, p, i + 1, ctx))
        .collect()
}

impl Registration {
    pub fn to_records(&self, ctx: &SubmissionContext) -> Vec<ExportRecord> {
        normalize(&self.school, &self.participants, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BirthInfo, CombatKind, FormStyle, Grade, Modalities, WeaponKind};
    use chrono::TimeZone;

    fn ctx() -> SubmissionContext {
        SubmissionContext {
            registration_id: RegistrationId::from("REG_TEST".to_string()),
            submitted_at: Utc.with_ymd_and_hms(2026, 10, 16, 15, 30, 0).unwrap(),
            today: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        }
    }

    fn school() -> SchoolInfo {
        SchoolInfo {
            school_name: "Dragón Blanco".to_string(),
            province: Some("Buenos Aires".to_string()),
            locality: "Burzaco".to_string(),
            martial_art_style: "Kung Fu".to_string(),
            teacher_name: "Juan".to_string(),
            teacher_last_name: "Pérez".to_string(),
            teacher_phone: None,
        }
    }

    fn ana() -> Participant {
        let mut p = Participant::new("Ana", "Gómez", Grade::KyuA);
        p.birth = Some(BirthInfo::Date(NaiveDate::from_ymd_opt(2006, 10, 15).unwrap()));
        p.modalities = Modalities {
            exhibition: true,
            combat: true,
            combat_kinds: vec![CombatKind::Individual, CombatKind::LightContact],
            ..Default::default()
        };
        p
    }

    fn leo() -> Participant {
        let mut p = Participant::new("Leo", "Paz", Grade::Dan);
        p.birth = Some(BirthInfo::Age(11));
        p.specific_grade = Some("2do Dan".to_string());
        p.modalities = Modalities {
            forms: true,
            hand_forms: vec![FormStyle::Chinas],
            weapon_forms: vec![WeaponKind::Cortas, WeaponKind::Largas],
            ..Default::default()
        };
        p
    }

    #[test]
    fn test_single_participant_example() {
        let records = normalize(&school(), &[ana()], &ctx());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Nombre_Escuela"), Some("Dragón Blanco"));
        assert_eq!(records[0].get("Numero_Participante"), Some("1"));
    }

    #[test]
    fn test_one_record_per_participant_in_order() {
        let records = normalize(&school(), &[ana(), leo(), ana()], &ctx());
        assert_eq!(records.len(), 3);
        let numbers: Vec<_> = records.iter().map(|r| r.participant_number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "2", "3"]);
        assert_eq!(records[1].participant_name, "Leo");
    }

    #[test]
    fn test_school_fields_identical_across_records() {
        let records = normalize(&school(), &[ana(), leo()], &ctx());
        let school_columns = [
            "ID_Registro",
            "Fecha_Registro",
            "Timestamp",
            "Nombre_Escuela",
            "Provincia",
            "Localidad",
            "Estilo_Arte_Marcial",
            "Nombre_Maestro",
            "Apellido_Maestro",
            "Telefono_Maestro",
        ];
        for column in school_columns {
            assert_eq!(records[0].get(column), records[1].get(column), "{}", column);
        }
        assert_eq!(records[0].registration_id, "REG_TEST");
    }

    #[test]
    fn test_non_derived_fields_copied_verbatim() {
        let participants = [ana(), leo()];
        let records = normalize(&school(), &participants, &ctx());
        for (record, p) in records.iter().zip(&participants) {
            assert_eq!(record.participant_name, p.name);
            assert_eq!(record.participant_last_name, p.last_name);
            assert_eq!(record.grade, p.grade.label());
            assert_eq!(record.specific_grade, p.specific_grade.clone().unwrap_or_default());
            assert_eq!(record.school_name, "Dragón Blanco");
            assert_eq!(record.locality, "Burzaco");
            assert_eq!(record.province, "Buenos Aires");
            assert_eq!(record.teacher_last_name, "Pérez");
        }
    }

    #[test]
    fn test_derived_fields() {
        let records = normalize(&school(), &[ana(), leo()], &ctx());

        assert_eq!(records[0].age, "20");
        assert_eq!(records[0].category, "Adulto");
        assert_eq!(records[0].birth_date, "15/10/2006");
        assert_eq!(records[0].exhibition, "Sí");
        assert_eq!(records[0].forms, "No");
        assert_eq!(records[0].combat, "Sí");
        assert_eq!(records[0].combat_kinds, "Individual, Light Contact");
        assert_eq!(records[0].weapon_forms, "");

        assert_eq!(records[1].age, "11");
        assert_eq!(records[1].category, "Infantil");
        assert_eq!(records[1].birth_date, "");
        assert_eq!(records[1].hand_forms, "Chinas");
        assert_eq!(records[1].weapon_forms, "Armas Cortas, Armas Largas");
        assert_eq!(records[1].exhibition, "No");
    }

    #[test]
    fn test_timestamp_format() {
        let records = normalize(&school(), &[ana()], &ctx());
        assert_eq!(records[0].timestamp, "2026-10-16T15:30:00.000Z");
    }

    #[test]
    fn test_missing_birth_leaves_age_and_category_blank() {
        let p = Participant::new("Sin", "Fecha", Grade::KyuB);
        let records = normalize(&school(), &[p], &ctx());
        assert_eq!(records[0].age, "");
        assert_eq!(records[0].category, "");
    }

    #[test]
    fn test_empty_participant_list() {
        assert!(normalize(&school(), &[], &ctx()).is_empty());
    }

    #[test]
    fn test_registration_ids_differ() {
        let at = Utc::now();
        let a = RegistrationId::generate(at);
        let b = RegistrationId::generate(at);
        assert!(a.as_str().starts_with("REG_"));
        assert_eq!(a.as_str().len(), "REG_".len() + 14 + 1 + 8);
        assert_ne!(a, b);
    }
}
