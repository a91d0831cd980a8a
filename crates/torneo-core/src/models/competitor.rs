//! Rows of the published competitor list.
//!
//! The list comes from a spreadsheet script whose column names have changed
//! over time, so rows are read from loose JSON and every field falls back to
//! a default instead of failing the whole list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_NAME: &str = "Sin nombre";
pub const DEFAULT_SCHOOL: &str = "Sin escuela";
pub const DEFAULT_CATEGORY: &str = "Sin categoría";
pub const DEFAULT_GENDER: &str = "-";

/// Filter value that keeps every category.
pub const ALL_CATEGORIES: &str = "all";

const TIMESTAMP_KEYS: &[&str] = &["timestamp", "marca temporal", "fecha_registro", "fecha"];
const NAME_KEYS: &[&str] = &["nombrecompleto", "nombre_completo", "fullname", "full_name", "nombre", "name"];
const SCHOOL_KEYS: &[&str] = &["escuela", "nombre_escuela", "school", "schoolname"];
const CATEGORY_KEYS: &[&str] = &["categoria", "categoría", "category"];
const GENDER_KEYS: &[&str] = &["sexo", "genero", "género", "gender"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Competitor {
    pub timestamp: Option<String>,
    pub full_name: String,
    pub school: String,
    pub category: String,
    /// Single uppercase letter, or "-" when unknown.
    pub gender: String,
}

// Keys are tried in priority order; the first non-blank value wins.
fn lookup(row: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        row.iter()
            .find(|(k, _)| k.trim().to_lowercase() == *key)
            .and_then(|(_, v)| text_of(v))
    })
}

fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn gender_initial(raw: Option<String>) -> String {
    raw.and_then(|g| g.chars().next())
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| DEFAULT_GENDER.to_string())
}

impl Competitor {
    /// Read one polled row. Non-object rows become an all-default entry.
    pub fn from_row(row: &Value) -> Self {
        let Some(obj) = row.as_object() else {
            return Self::placeholder();
        };
        Self {
            timestamp: lookup(obj, TIMESTAMP_KEYS),
            full_name: lookup(obj, NAME_KEYS).unwrap_or_else(|| DEFAULT_NAME.to_string()),
            school: lookup(obj, SCHOOL_KEYS).unwrap_or_else(|| DEFAULT_SCHOOL.to_string()),
            category: lookup(obj, CATEGORY_KEYS).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            gender: gender_initial(lookup(obj, GENDER_KEYS)),
        }
    }

    fn placeholder() -> Self {
        Self {
            timestamp: None,
            full_name: DEFAULT_NAME.to_string(),
            school: DEFAULT_SCHOOL.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            gender: DEFAULT_GENDER.to_string(),
        }
    }

    /// First letter of the name, for the avatar badge.
    pub fn initial(&self) -> char {
        self.full_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('?')
    }
}

/// A polled competitor list, in the order the sheet returned it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompetitorList {
    pub competitors: Vec<Competitor>,
}

impl CompetitorList {
    pub fn from_rows(rows: &[Value]) -> Self {
        Self {
            competitors: rows.iter().map(Competitor::from_row).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for c in &self.competitors {
            if !seen.contains(&c.category.as_str()) {
                seen.push(&c.category);
            }
        }
        seen
    }

    /// Competitors in `category`; `"all"` keeps everyone.
    pub fn filter_by_category(&self, category: &str) -> Vec<&Competitor> {
        if category == ALL_CATEGORIES {
            return self.competitors.iter().collect();
        }
        self.competitors
            .iter()
            .filter(|c| c.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_with_spanish_keys() {
        let row = json!({
            "Timestamp": "2025-10-01T12:00:00Z",
            "NombreCompleto": "Ana Gómez",
            "Escuela": "Dragón Blanco",
            "Categoria": "Juvenil",
            "Sexo": "femenino"
        });
        let c = Competitor::from_row(&row);
        assert_eq!(c.timestamp.as_deref(), Some("2025-10-01T12:00:00Z"));
        assert_eq!(c.full_name, "Ana Gómez");
        assert_eq!(c.school, "Dragón Blanco");
        assert_eq!(c.category, "Juvenil");
        assert_eq!(c.gender, "F");
        assert_eq!(c.initial(), 'A');
    }

    #[test]
    fn test_missing_and_wrong_typed_fields_default() {
        let row = json!({"fullName": "  ", "school": null, "category": 3, "gender": true});
        let c = Competitor::from_row(&row);
        assert_eq!(c.timestamp, None);
        assert_eq!(c.full_name, DEFAULT_NAME);
        assert_eq!(c.school, DEFAULT_SCHOOL);
        assert_eq!(c.category, "3");
        assert_eq!(c.gender, DEFAULT_GENDER);
    }

    #[test]
    fn test_non_object_row() {
        let c = Competitor::from_row(&json!("garbage"));
        assert_eq!(c.full_name, DEFAULT_NAME);
        assert_eq!(c.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_filter_and_categories() {
        let rows = vec![
            json!({"nombre": "Chen Wei", "escuela": "Shaolin", "categoria": "Adulto"}),
            json!({"nombre": "Yuki Tanaka", "escuela": "Kyokushin", "categoria": "Juvenil"}),
            json!({"nombre": "Li Ming", "escuela": "Wudang", "categoria": "Adulto"}),
        ];
        let list = CompetitorList::from_rows(&rows);
        assert_eq!(list.len(), 3);
        assert_eq!(list.categories(), vec!["Adulto", "Juvenil"]);
        assert_eq!(list.filter_by_category(ALL_CATEGORIES).len(), 3);
        let adults = list.filter_by_category("Adulto");
        assert_eq!(adults.len(), 2);
        assert_eq!(adults[1].full_name, "Li Ming");
        assert!(list.filter_by_category("Senior").is_empty());
    }
}
