//! Tournament details shown on the landing page, and the countdown to it.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// 10:00 in Buenos Aires. Argentina has no DST, so the offset is fixed.
pub const DEFAULT_START: &str = "2025-11-23T10:00:00-03:00";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discipline {
    pub title: &'static str,
    pub description: &'static str,
}

pub const DISCIPLINES: &[Discipline] = &[
    Discipline { title: "Formas Tradicionales", description: "Chinas, Japonesas, Coreanas y Modernas" },
    Discipline { title: "Formas con Armas", description: "Armas cortas, largas y especiales" },
    Discipline { title: "Combate Individual", description: "Competencia uno contra uno" },
    Discipline { title: "Combate por Equipo", description: "Competencia grupal" },
    Discipline { title: "Formas por Equipo", description: "Presentaciones grupales" },
    Discipline { title: "Kick-Boxing & Light Contact", description: "Modalidades de contacto" },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentEvent {
    pub name: String,
    pub organizer: String,
    pub venue: String,
    pub starts_at: DateTime<FixedOffset>,
    pub disciplines: &'static [Discipline],
}

/// Time remaining until the event, split the way the countdown shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    fn from_seconds(total: i64) -> Self {
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }
}

impl std::fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Días {:02} Horas {:02} Min {:02} Seg",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

impl TournamentEvent {
    /// Event with its start given as an RFC 3339 timestamp.
    pub fn starting(starts_at: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(starts_at).map(Self::with_start)
    }

    pub fn with_start(starts_at: DateTime<FixedOffset>) -> Self {
        Self {
            name: "Torneo Abierto de Artes Marciales 2025".to_string(),
            organizer: "Asociación Long Hu He".to_string(),
            venue: "Pellegrini 557, Burzaco".to_string(),
            starts_at,
            disciplines: DISCIPLINES,
        }
    }

    /// `None` once the event has started.
    pub fn countdown(&self, now: DateTime<Utc>) -> Option<TimeLeft> {
        let remaining = (self.starts_at.with_timezone(&Utc) - now).num_seconds();
        if remaining > 0 {
            Some(TimeLeft::from_seconds(remaining))
        } else {
            None
        }
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.countdown(now).is_none()
    }
}
