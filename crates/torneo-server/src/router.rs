use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{classify_birth_date, competitors, event, health, register};
use crate::state::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/api/competitors", get(competitors))
        .route("/api/registrations", post(register))
        .route("/api/classify", get(classify_birth_date))
        .route("/api/event", get(event))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
