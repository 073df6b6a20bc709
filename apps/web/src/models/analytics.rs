use serde::{Deserialize, Serialize};

/// Organisation-level engagement snapshot from `GET /api/admin/analytics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_users: u32,
    pub active_users: u32,
    pub avg_tech_score: f64,
    /// 0.0 – 1.0
    pub participation_rate: f64,
}

impl Analytics {
    /// Snapshot shown when the analytics endpoint cannot be reached.
    pub fn seeded() -> Self {
        Self {
            total_users: 275,
            active_users: 198,
            avg_tech_score: 63.4,
            participation_rate: 0.72,
        }
    }
}
