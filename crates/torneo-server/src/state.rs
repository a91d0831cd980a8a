use std::sync::Arc;

use torneo_core::api::SheetsClient;
use torneo_core::event::TournamentEvent;

/// Shared handler state. Cloned per request; both fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub client: SheetsClient,
    pub event: Arc<TournamentEvent>,
}

impl AppState {
    pub fn new(client: SheetsClient, event: TournamentEvent) -> Self {
        Self {
            client,
            event: Arc::new(event),
        }
    }
}
