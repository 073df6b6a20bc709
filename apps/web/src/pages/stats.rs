use serde::Serialize;
use tracing::warn;

use crate::api_client::Backend;
use crate::models::StatsEnvelope;
use crate::pages::notice::Notice;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub tech_score: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub current_streak_label: String,
    pub longest_streak_label: String,
    /// Completion breakdown; absent when the API does not report it.
    pub completions: Option<CompletionBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionBreakdown {
    pub total: u32,
    pub first_try_passes: u32,
    pub retry_passes: u32,
}

impl From<StatsEnvelope> for StatsView {
    fn from(envelope: StatsEnvelope) -> Self {
        let stats = envelope.user;
        let completions = envelope.total_completions.map(|total| CompletionBreakdown {
            total,
            first_try_passes: envelope.first_try_passes.unwrap_or(0),
            retry_passes: envelope.retry_passes.unwrap_or(0),
        });
        Self {
            tech_score: stats.tech_score,
            current_streak: stats.current_streak,
            longest_streak: stats.longest_streak,
            current_streak_label: format!("{}d", stats.current_streak),
            longest_streak_label: format!("{}d", stats.longest_streak),
            completions,
        }
    }
}

/// Fetches the authoritative counters. Falls back to zeros plus a notice.
pub async fn load_stats(backend: &dyn Backend) -> (StatsView, Option<Notice>) {
    match backend.stats().await {
        Ok(envelope) => (envelope.into(), None),
        Err(e) => {
            warn!(error = %e, "unable to fetch user stats");
            (
                StatsEnvelope::default().into(),
                Some(Notice::warning("Your tech score and streak are unavailable right now.")),
            )
        }
    }
}
