use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SchoolInfo {
    pub school_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    pub locality: String,
    pub martial_art_style: String,
    pub teacher_name: String,
    pub teacher_last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_phone: Option<String>,
}

impl SchoolInfo {
    pub fn teacher_full_name(&self) -> String {
        format!("{} {}", self.teacher_name, self.teacher_last_name)
            .trim()
            .to_string()
    }

    /// "Locality, Province" or just the locality when no province was given.
    pub fn location(&self) -> String {
        match self.province.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => format!("{}, {}", self.locality, p),
            _ => self.locality.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{"schoolName":"Dragón Blanco","locality":"Burzaco","martialArtStyle":"Kung Fu","teacherName":"Juan","teacherLastName":"Pérez"}"#;
        let school: SchoolInfo = serde_json::from_str(json).unwrap();
        assert_eq!(school.province, None);
        assert_eq!(school.teacher_phone, None);
        assert_eq!(school.teacher_full_name(), "Juan Pérez");
        assert_eq!(school.location(), "Burzaco");
    }

    #[test]
    fn test_location_with_province() {
        let school = SchoolInfo {
            locality: "Burzaco".to_string(),
            province: Some("Buenos Aires".to_string()),
            ..Default::default()
        };
        assert_eq!(school.location(), "Burzaco, Buenos Aires");
    }
}
