//! Data models for tournament registration.
//!
//! - `SchoolInfo`: the registering school and its teacher
//! - `Participant`, `Grade`, `Modalities`: one competitor on a registration
//! - `ExportRecord`: one flat spreadsheet row per participant, plus CSV output
//! - `Competitor`: a row of the published competitor list

pub mod competitor;
pub mod export;
pub mod participant;
pub mod school;

pub use competitor::{Competitor, CompetitorList};
pub use export::{to_csv, write_csv, ExportRecord};
pub use participant::{
    BirthInfo, CombatKind, FormStyle, Grade, Modalities, Participant, WeaponKind,
};
pub use school::SchoolInfo;

use serde::{Deserialize, Serialize};

/// Canonical registration: one school and its participants, in form order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Registration {
    pub school: SchoolInfo,
    pub participants: Vec<Participant>,
}
