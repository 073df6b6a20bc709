use serde::{Deserialize, Serialize};

/// Server-computed engagement counters. The web tier only displays these;
/// it never derives them locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub tech_score: f64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
}

/// `GET /api/me/stats`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsEnvelope {
    #[serde(default)]
    pub user: UserStats,
    #[serde(default)]
    pub total_completions: Option<u32>,
    #[serde(default)]
    pub first_try_passes: Option<u32>,
    #[serde(default)]
    pub retry_passes: Option<u32>,
}
