//! Periodic competitor list refresh.
//!
//! The poller runs in a single spawned task and reports each attempt over an
//! MPSC channel. A failed poll is reported as `PollResult::Failed`; the next
//! tick tries again. The task ends when the receiver is dropped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::api::SheetsClient;
use crate::models::CompetitorList;

/// Channel buffer size for poll results
const CHANNEL_BUFFER_SIZE: usize = 8;

/// A competitor list together with when it was fetched.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub list: CompetitorList,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(list: CompetitorList) -> Self {
        Self {
            list,
            fetched_at: Utc::now(),
        }
    }

    pub fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.fetched_at).num_seconds()
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        let seconds = self.age_seconds(now);
        if seconds < 60 {
            // also covers clock skew
            "recién".to_string()
        } else if seconds < 3_600 {
            format!("hace {}m", seconds / 60)
        } else {
            format!("hace {}h", seconds / 3_600)
        }
    }
}

/// Result of one poll attempt.
#[derive(Debug, Clone)]
pub enum PollResult {
    Competitors(Snapshot),
    Failed(String),
}

pub struct CompetitorPoller {
    client: SheetsClient,
    period: Duration,
}

impl CompetitorPoller {
    pub fn new(client: SheetsClient, period: Duration) -> Self {
        Self { client, period }
    }

    /// Fetch the list once.
    pub async fn poll_once(&self) -> PollResult {
        match self.client.fetch_competitors().await {
            Ok(list) => {
                debug!(count = list.len(), "Competitor list refreshed");
                PollResult::Competitors(Snapshot::new(list))
            }
            Err(e) if e.is_network() => {
                warn!(error = %e, "Competitor script unreachable, retrying next tick");
                PollResult::Failed(e.to_string())
            }
            Err(e) => {
                warn!(error = %e, status = e.status_code(), "Competitor poll failed, retrying next tick");
                PollResult::Failed(e.to_string())
            }
        }
    }

    /// Start polling in a background task. The first poll happens immediately.
    pub fn spawn(self) -> (mpsc::Receiver<PollResult>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            self.run(tx).await;
        });
        (rx, handle)
    }

    async fn run(self, tx: mpsc::Sender<PollResult>) {
        info!(period_secs = self.period.as_secs_f64(), "Competitor poller started");
        let mut ticker = tokio::time::interval(self.period);
        // A slow poll pushes the schedule back rather than triggering a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let result = self.poll_once().await;
            if let Err(e) = tx.send(result).await {
                error!(error = %e, "Poll receiver dropped, stopping poller");
                break;
            }
        }
    }
}
