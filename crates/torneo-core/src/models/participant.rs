use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::{classify, classify_age, Classification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Grade {
    #[serde(rename = "Kyu A", alias = "kyu a", alias = "KyuA")]
    KyuA,
    #[serde(rename = "Kyu B", alias = "kyu b", alias = "KyuB")]
    KyuB,
    #[serde(rename = "Dan", alias = "dan")]
    Dan,
}

impl Grade {
    pub fn label(&self) -> &'static str {
        match self {
            Grade::KyuA => "Kyu A",
            Grade::KyuB => "Kyu B",
            Grade::Dan => "Dan",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Either an exact birth date or a declared age in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum BirthInfo {
    Date(NaiveDate),
    Age(i32),
}

// Selection lists parse case-insensitively so the lowercase values of the
// oldest form layout map onto the same variants.
fn normalize_label(s: &str) -> String {
    s.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FormStyle {
    Interna,
    Chinas,
    Japonesas,
    Coreanas,
    Modernas,
    TaiChi,
}

impl FormStyle {
    pub const ALL: [FormStyle; 6] = [
        FormStyle::Interna,
        FormStyle::Chinas,
        FormStyle::Japonesas,
        FormStyle::Coreanas,
        FormStyle::Modernas,
        FormStyle::TaiChi,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormStyle::Interna => "Interna",
            FormStyle::Chinas => "Chinas",
            FormStyle::Japonesas => "Japonesas",
            FormStyle::Coreanas => "Coreanas",
            FormStyle::Modernas => "Modernas",
            FormStyle::TaiChi => "Tai Chi",
        }
    }
}

impl FromStr for FormStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|v| normalize_label(v.label()) == wanted)
            .ok_or_else(|| format!("Estilo de formas desconocido: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WeaponKind {
    Cortas,
    Largas,
    Especiales,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Cortas, WeaponKind::Largas, WeaponKind::Especiales];

    pub fn label(&self) -> &'static str {
        match self {
            WeaponKind::Cortas => "Armas Cortas",
            WeaponKind::Largas => "Armas Largas",
            WeaponKind::Especiales => "Armas Especiales",
        }
    }
}

impl FromStr for WeaponKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|v| {
                let label = normalize_label(v.label());
                label == wanted || label.trim_start_matches("armas ") == wanted
            })
            .ok_or_else(|| format!("Tipo de armas desconocido: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CombatKind {
    Individual,
    PorEquipo,
    Kickboxing,
    LightContact,
}

impl CombatKind {
    pub const ALL: [CombatKind; 4] = [
        CombatKind::Individual,
        CombatKind::PorEquipo,
        CombatKind::Kickboxing,
        CombatKind::LightContact,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CombatKind::Individual => "Individual",
            CombatKind::PorEquipo => "Por Equipo",
            CombatKind::Kickboxing => "Kickboxing",
            CombatKind::LightContact => "Light Contact",
        }
    }
}

impl FromStr for CombatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|v| normalize_label(v.label()) == wanted)
            .ok_or_else(|| format!("Tipo de combate desconocido: {}", s))
    }
}

// serde plumbing shared by the three selection enums
macro_rules! label_conversions {
    ($($ty:ty),*) => {$(
        impl TryFrom<String> for $ty {
            type Error = String;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.label().to_string()
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    )*};
}

label_conversions!(FormStyle, WeaponKind, CombatKind);

/// Disciplines a participant opts into, with their sub-selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Modalities {
    #[serde(default)]
    pub exhibition: bool,
    #[serde(default)]
    pub forms: bool,
    #[serde(default)]
    pub combat: bool,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "Array<string>"))]
    pub hand_forms: Vec<FormStyle>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "Array<string>"))]
    pub weapon_forms: Vec<WeaponKind>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "Array<string>"))]
    pub combat_kinds: Vec<CombatKind>,
}

impl Modalities {
    pub fn any_selected(&self) -> bool {
        self.exhibition || self.forms || self.combat
    }

    /// Turn on `forms`/`combat` when a sub-selection implies them.
    pub fn with_implied_flags(mut self) -> Self {
        self.forms |= !self.hand_forms.is_empty() || !self.weapon_forms.is_empty();
        self.combat |= !self.combat_kinds.is_empty();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Participant {
    pub name: String,
    pub last_name: String,
    pub birth: Option<BirthInfo>,
    pub grade: Grade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Category chosen by hand in an older form layout. Never used for
    /// classification; exported alongside the derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_category: Option<String>,
    #[serde(default)]
    pub modalities: Modalities,
}

impl Participant {
    pub fn new(name: &str, last_name: &str, grade: Grade) -> Self {
        Self {
            name: name.to_string(),
            last_name: last_name.to_string(),
            birth: None,
            grade,
            specific_grade: None,
            document_id: None,
            declared_category: None,
            modalities: Modalities::default(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        match self.birth {
            Some(BirthInfo::Date(d)) => Some(d),
            _ => None,
        }
    }

    pub fn classification(&self, today: NaiveDate) -> Classification {
        match self.birth {
            Some(BirthInfo::Date(d)) => classify(Some(d), today),
            Some(BirthInfo::Age(age)) => classify_age(age),
            None => classify(None, today),
        }
    }
}
