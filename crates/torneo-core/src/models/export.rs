use std::borrow::Cow;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

/// One spreadsheet row. Field names are the sheet's column headers and every
/// value is already rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ExportRecord {
    #[serde(rename = "ID_Registro")]
    pub registration_id: String,
    #[serde(rename = "Numero_Participante")]
    pub participant_number: String,
    #[serde(rename = "Fecha_Registro")]
    pub registration_date: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Nombre_Escuela")]
    pub school_name: String,
    #[serde(rename = "Provincia")]
    pub province: String,
    #[serde(rename = "Localidad")]
    pub locality: String,
    #[serde(rename = "Estilo_Arte_Marcial")]
    pub martial_art_style: String,
    #[serde(rename = "Nombre_Maestro")]
    pub teacher_name: String,
    #[serde(rename = "Apellido_Maestro")]
    pub teacher_last_name: String,
    #[serde(rename = "Telefono_Maestro")]
    pub teacher_phone: String,
    #[serde(rename = "Nombre_Participante")]
    pub participant_name: String,
    #[serde(rename = "Apellido_Participante")]
    pub participant_last_name: String,
    #[serde(rename = "DNI")]
    pub document_id: String,
    #[serde(rename = "Fecha_Nacimiento")]
    pub birth_date: String,
    #[serde(rename = "Edad")]
    pub age: String,
    #[serde(rename = "Categoria")]
    pub category: String,
    #[serde(rename = "Categoria_Declarada")]
    pub declared_category: String,
    #[serde(rename = "Grado")]
    pub grade: String,
    #[serde(rename = "Grado_Especifico")]
    pub specific_grade: String,
    #[serde(rename = "Exhibicion")]
    pub exhibition: String,
    #[serde(rename = "Formas")]
    pub forms: String,
    #[serde(rename = "Estilo_Formas")]
    pub hand_forms: String,
    #[serde(rename = "Formas_con_Armas")]
    pub weapon_forms: String,
    #[serde(rename = "Combate")]
    pub combat: String,
    #[serde(rename = "Tipo_Combate")]
    pub combat_kinds: String,
}

impl ExportRecord {
    /// Column headers in sheet order.
    pub const COLUMNS: [&'static str; 26] = [
        "ID_Registro",
        "Numero_Participante",
        "Fecha_Registro",
        "Timestamp",
        "Nombre_Escuela",
        "Provincia",
        "Localidad",
        "Estilo_Arte_Marcial",
        "Nombre_Maestro",
        "Apellido_Maestro",
        "Telefono_Maestro",
        "Nombre_Participante",
        "Apellido_Participante",
        "DNI",
        "Fecha_Nacimiento",
        "Edad",
        "Categoria",
        "Categoria_Declarada",
        "Grado",
        "Grado_Especifico",
        "Exhibicion",
        "Formas",
        "Estilo_Formas",
        "Formas_con_Armas",
        "Combate",
        "Tipo_Combate",
    ];

    /// Values in the same order as `COLUMNS`.
    pub fn values(&self) -> [&str; 26] {
        [
            self.registration_id.as_str(),
            self.participant_number.as_str(),
            self.registration_date.as_str(),
            self.timestamp.as_str(),
            self.school_name.as_str(),
            self.province.as_str(),
            self.locality.as_str(),
            self.martial_art_style.as_str(),
            self.teacher_name.as_str(),
            self.teacher_last_name.as_str(),
            self.teacher_phone.as_str(),
            self.participant_name.as_str(),
            self.participant_last_name.as_str(),
            self.document_id.as_str(),
            self.birth_date.as_str(),
            self.age.as_str(),
            self.category.as_str(),
            self.declared_category.as_str(),
            self.grade.as_str(),
            self.specific_grade.as_str(),
            self.exhibition.as_str(),
            self.forms.as_str(),
            self.hand_forms.as_str(),
            self.weapon_forms.as_str(),
            self.combat.as_str(),
            self.combat_kinds.as_str(),
        ]
    }

    /// Look up a value by its column header.
    pub fn get(&self, column: &str) -> Option<&str> {
        Self::COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.values()[i])
    }

    /// Download name for a registration's CSV, after its first participant.
    pub fn csv_file_name(records: &[ExportRecord]) -> String {
        let stem = match records.first() {
            Some(r) => format!("{}_{}", r.participant_name.trim(), r.participant_last_name.trim()),
            None => "vacia".to_string(),
        };
        let stem: String = stem
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        format!("{}{}.csv", CSV_FILE_PREFIX, stem)
    }
}

const CSV_FILE_PREFIX: &str = "inscripcion_torneo_";

/// Quote a field when it holds a separator, a quote or a line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn write_csv_row<W: Write>(writer: &mut W, fields: &[&str]) -> io::Result<()> {
    let line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{}", line)
}

/// Header row from `COLUMNS`, then one row per record.
pub fn write_csv<W: Write>(records: &[ExportRecord], mut writer: W) -> io::Result<()> {
    write_csv_row(&mut writer, &ExportRecord::COLUMNS)?;
    for record in records {
        write_csv_row(&mut writer, &record.values())?;
    }
    writer.flush()
}

pub fn to_csv(records: &[ExportRecord]) -> String {
    let mut out = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_csv(records, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}
