use serde::Serialize;
use tracing::warn;

use crate::api_client::Backend;
use crate::models::Analytics;
use crate::pages::notice::Notice;

pub const CHECKOUT_SUCCESS_STATUS: &str = "checkout-success";

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsCards {
    pub total_users: u32,
    pub active_users: u32,
    /// One decimal, e.g. `"63.4"`.
    pub avg_tech_score: String,
    /// Percent with one decimal, e.g. `"72.0%"`.
    pub participation_rate: String,
}

impl From<&Analytics> for AnalyticsCards {
    fn from(a: &Analytics) -> Self {
        Self {
            total_users: a.total_users,
            active_users: a.active_users,
            avg_tech_score: format!("{:.1}", a.avg_tech_score),
            participation_rate: format!("{:.1}%", a.participation_rate * 100.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminView {
    pub organization_id: String,
    pub analytics: Analytics,
    pub cards: AnalyticsCards,
    /// True when `analytics` is the seeded default rather than live data.
    pub seeded: bool,
    pub plans_href: &'static str,
    pub notices: Vec<Notice>,
}

/// GET /admin: organisation analytics. Any failure renders the seeded
/// default snapshot instead of an error.
pub async fn load_admin(
    backend: &dyn Backend,
    organization_id: &str,
    status: Option<&str>,
) -> AdminView {
    let mut notices = Vec::new();
    if status == Some(CHECKOUT_SUCCESS_STATUS) {
        notices.push(Notice::success(
            "Subscription confirmed. Your new plan is active.",
        ));
    }

    let (analytics, seeded) = match backend.analytics(organization_id).await {
        Ok(analytics) => (analytics, false),
        Err(e) => {
            warn!(%organization_id, error = %e, "unable to load analytics, seeding defaults");
            notices.push(Notice::info(
                "Live analytics are unavailable. Showing a sample snapshot.",
            ));
            (Analytics::seeded(), true)
        }
    };

    AdminView {
        organization_id: organization_id.to_string(),
        cards: AnalyticsCards::from(&analytics),
        analytics,
        seeded,
        plans_href: "/admin/plans",
        notices,
    }
}
