//! Client for the spreadsheet script endpoints.
//!
//! This module provides the `SheetsClient` struct for posting registration
//! rows and reading the competitor list.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Config, SubmitMode};
use crate::models::{CompetitorList, ExportRecord};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// Apps Script cold starts can take several seconds; 30s still fails fast enough for a form.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Optional acknowledgement body returned by the submission script.
#[derive(Debug, Deserialize)]
struct SubmitReply {
    status: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The script answered and did not report an error.
    Confirmed { message: Option<String> },
    /// Fire-and-forget mode: the request went out, the reply was not inspected.
    Assumed,
}

/// Client for the registration and competitor scripts.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    submit_url: String,
    competitors_url: String,
    mode: SubmitMode,
}

impl SheetsClient {
    pub fn new(submit_url: &str, competitors_url: &str, mode: SubmitMode) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            submit_url: submit_url.to_string(),
            competitors_url: competitors_url.to_string(),
            mode,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.submit_url, &config.competitors_url, config.submit_mode)
    }

    pub fn mode(&self) -> SubmitMode {
        self.mode
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Script endpoint returned an error status");
            Err(ApiError::from_status(status, &body))
        }
    }

    // ===== Competitor list =====

    /// Fetch the raw competitor rows. The reply must be a JSON array; its
    /// items are passed through untouched.
    pub async fn fetch_competitor_rows(&self) -> Result<Vec<Value>, ApiError> {
        let response = self.client.get(&self.competitors_url).send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        let parsed: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Response is not JSON: {}", e)))?;

        match parsed {
            Value::Array(rows) => {
                debug!(count = rows.len(), "Competitor rows received");
                Ok(rows)
            }
            _ => Err(ApiError::InvalidResponse(
                "Invalid data format from upstream".to_string(),
            )),
        }
    }

    pub async fn fetch_competitors(&self) -> Result<CompetitorList, ApiError> {
        let rows = self.fetch_competitor_rows().await?;
        Ok(CompetitorList::from_rows(&rows))
    }

    // ===== Registration =====

    /// Post the rows of one registration as a JSON array.
    pub async fn submit(&self, records: &[ExportRecord]) -> Result<SubmitOutcome, ApiError> {
        let registration_id = records.first().map(|r| r.registration_id.as_str()).unwrap_or("");
        info!(registration_id, rows = records.len(), mode = ?self.mode, "Submitting registration");

        let response = self
            .client
            .post(&self.submit_url)
            .json(records)
            .send()
            .await?;

        if self.mode == SubmitMode::FireAndForget {
            debug!(status = %response.status(), "Reply ignored in fire-and-forget mode");
            return Ok(SubmitOutcome::Assumed);
        }

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        // The script may answer with plain text or an empty body; only a JSON
        // object with an explicit error status counts as a rejection.
        let reply = serde_json::from_str::<SubmitReply>(&text).ok();
        match reply {
            Some(SubmitReply { status: Some(status), message }) if status.eq_ignore_ascii_case("error") => {
                let reason = message.unwrap_or(status);
                warn!(registration_id, reason = %reason, "Submission rejected by script");
                Err(ApiError::Rejected(reason))
            }
            Some(reply) => Ok(SubmitOutcome::Confirmed { message: reply.message }),
            None => Ok(SubmitOutcome::Confirmed { message: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    /// Serve `app` on an ephemeral local port and return its base URL.
    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str, mode: SubmitMode) -> SheetsClient {
        SheetsClient::new(&format!("{}/submit", base), &format!("{}/competitors", base), mode).unwrap()
    }

    fn record(n: usize) -> ExportRecord {
        ExportRecord {
            registration_id: "REG_TEST".to_string(),
            participant_number: n.to_string(),
            school_name: "Dragón Blanco".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_competitor_rows_passes_array_through() {
        let app = Router::new().route(
            "/competitors",
            get(|| async { Json(json!([{"nombre": "Ana", "escuela": "Dragón Blanco"}, {"x": 1}])) }),
        );
        let base = spawn_upstream(app).await;
        let rows = client(&base, SubmitMode::Confirmed).fetch_competitor_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], json!({"x": 1}));

        let list = client(&base, SubmitMode::Confirmed).fetch_competitors().await.unwrap();
        assert_eq!(list.competitors[0].full_name, "Ana");
        assert_eq!(list.competitors[1].school, "Sin escuela");
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_array() {
        let app = Router::new().route("/competitors", get(|| async { Json(json!({"rows": []})) }));
        let base = spawn_upstream(app).await;
        let err = client(&base, SubmitMode::Confirmed).fetch_competitor_rows().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_fetch_forwards_upstream_status() {
        let app = Router::new().route(
            "/competitors",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "quota exceeded") }),
        );
        let base = spawn_upstream(app).await;
        let err = client(&base, SubmitMode::Confirmed).fetch_competitor_rows().await.unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.to_string(), "Upstream error: 503 Service Unavailable");
    }

    #[tokio::test]
    async fn test_network_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client(&format!("http://{}", addr), SubmitMode::Confirmed)
            .fetch_competitor_rows()
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_submit_posts_json_array() {
        let received: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let sink = received.clone();
        let app = Router::new().route(
            "/submit",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(json!({"status": "success", "message": "2 filas"}))
                }
            }),
        );
        let base = spawn_upstream(app).await;
        let outcome = client(&base, SubmitMode::Confirmed).submit(&[record(1), record(2)]).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Confirmed { message: Some("2 filas".to_string()) });

        let body = received.lock().unwrap().clone().unwrap();
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Nombre_Escuela"], "Dragón Blanco");
        assert_eq!(rows[1]["Numero_Participante"], "2");
    }

    #[tokio::test]
    async fn test_submit_plain_text_reply_is_success() {
        let app = Router::new().route("/submit", post(|| async { "OK" }));
        let base = spawn_upstream(app).await;
        let outcome = client(&base, SubmitMode::Confirmed).submit(&[record(1)]).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Confirmed { message: None });
    }

    #[tokio::test]
    async fn test_submit_error_status_field() {
        let app = Router::new().route(
            "/submit",
            post(|| async { Json(json!({"status": "ERROR", "message": "Hoja llena"})) }),
        );
        let base = spawn_upstream(app).await;
        let err = client(&base, SubmitMode::Confirmed).submit(&[record(1)]).await.unwrap_err();
        match err {
            ApiError::Rejected(reason) => assert_eq!(reason, "Hoja llena"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_modes_differ_on_http_error() {
        let app = Router::new().route(
            "/submit",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_upstream(app).await;

        let err = client(&base, SubmitMode::Confirmed).submit(&[record(1)]).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(matches!(err, ApiError::Upstream { .. }));

        let fire_and_forget = client(&base, SubmitMode::FireAndForget);
        assert_eq!(fire_and_forget.mode(), SubmitMode::FireAndForget);
        let outcome = fire_and_forget.submit(&[record(1)]).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Assumed);
    }
}
