use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use torneo_core::api::{ApiError, SubmitOutcome};
use torneo_core::event::{TimeLeft, TournamentEvent};
use torneo_core::schema::{self, MigrationNote};
use torneo_core::validation::validate_registration;
use torneo_core::{classify, parse_birth_date, Classification, SubmissionContext};

use crate::state::AppState;

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

// ===== Competitor list proxy =====

pub async fn competitors(State(state): State<AppState>) -> Response {
    match state.client.fetch_competitor_rows().await {
        Ok(rows) => Json(Value::Array(rows)).into_response(),
        Err(e) => proxy_error(&e),
    }
}

fn proxy_error(e: &ApiError) -> Response {
    match e {
        ApiError::Upstream { status, body } => {
            error!(%status, body = %body, "Competitor script returned an error");
            let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            error_body(status, format!("Upstream error: {}", status.as_u16()))
        }
        ApiError::InvalidResponse(reason) => {
            error!(reason = %reason, "Competitor script returned an unexpected shape");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Invalid data format from upstream")
        }
        other => {
            error!(error = %other, "Competitor proxy failed");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

// ===== Registration =====

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    pub registration_id: String,
    pub records: usize,
    pub confirmed: bool,
    pub message: Option<String>,
    pub notes: Vec<MigrationNote>,
}

/// Accepts any supported payload version, validates it, flattens it into
/// sheet rows and forwards them.
pub async fn register(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let migrated = match schema::migrate(payload) {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "Rejected registration payload");
            return error_body(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let ctx = SubmissionContext::now();
    if let Err(errors) = validate_registration(&migrated.registration, ctx.today) {
        info!(count = errors.errors.len(), "Registration failed validation");
        let body = json!({ "error": errors.to_string(), "fields": errors.errors });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }

    let records = migrated.registration.to_records(&ctx);
    match state.client.submit(&records).await {
        Ok(outcome) => {
            let (confirmed, message) = match outcome {
                SubmitOutcome::Confirmed { message } => (true, message),
                SubmitOutcome::Assumed => (false, None),
            };
            info!(registration_id = %ctx.registration_id, rows = records.len(), "Registration forwarded");
            Json(RegistrationReceipt {
                registration_id: ctx.registration_id.to_string(),
                records: records.len(),
                confirmed,
                message,
                notes: migrated.notes,
            })
            .into_response()
        }
        Err(e) => {
            error!(registration_id = %ctx.registration_id, error = %e, "Registration submit failed");
            error_body(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

// ===== Classification =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyQuery {
    #[serde(default)]
    pub birth_date: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub age: i32,
    pub category: &'static str,
}

impl From<Classification> for ClassifyResponse {
    fn from(c: Classification) -> Self {
        Self {
            age: c.age,
            category: c.category_label(),
        }
    }
}

pub async fn classify_birth_date(Query(query): Query<ClassifyQuery>) -> Response {
    match parse_birth_date(&query.birth_date) {
        Ok(birth) => {
            let today = Local::now().date_naive();
            Json(ClassifyResponse::from(classify(birth, today))).into_response()
        }
        Err(e) => error_body(StatusCode::BAD_REQUEST, e.message),
    }
}

// ===== Event =====

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView<'a> {
    #[serde(flatten)]
    pub event: &'a TournamentEvent,
    pub started: bool,
    pub countdown: Option<TimeLeft>,
    pub countdown_text: Option<String>,
}

pub async fn event(State(state): State<AppState>) -> Response {
    let now = Utc::now();
    let countdown = state.event.countdown(now);
    let view = EventView {
        event: &state.event,
        started: state.event.has_started(now),
        countdown,
        countdown_text: countdown.map(|c| c.to_string()),
    };
    Json(view).into_response()
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
