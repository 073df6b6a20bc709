use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api_client::Backend;
use crate::pages::cards::ContentCard;
use crate::pages::notice::Notice;
use crate::pages::stats::{load_stats, StatsView};

pub const INSTITUTIONS: &[&str] = &[
    "PulseLoop Labs",
    "Salesforce",
    "Snowflake",
    "Databricks",
    "CrowdStrike",
    "ServiceNow",
    "Okta",
    "Atlassian",
    "GitLab",
    "HashiCorp",
    "Rippling",
    "Canva",
    "Notion",
];

const MAX_DAILY_OPTIONS: usize = 3;
const OPTION_TAGS: usize = 4;
const ALLOWED_EMAIL_SUFFIXES: &[&str] = &[".com", ".edu"];

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub institution: String,
    pub job_title: String,
}

impl EnrollmentForm {
    /// Returns the names of the fields that block submission.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("password", &self.password),
            ("job_title", &self.job_title),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                invalid.push(name);
            }
        }

        let email = self.email.trim();
        if email.is_empty()
            || !email.contains('@')
            || !ALLOWED_EMAIL_SUFFIXES.iter().any(|s| email.ends_with(s))
        {
            invalid.push("email");
        }

        if !INSTITUTIONS.contains(&self.institution.as_str()) {
            invalid.push("institution");
        }
        invalid
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningView {
    pub greeting: Option<String>,
    pub options: Vec<ContentCard>,
    pub active: Option<ContentCard>,
    pub stats: StatsView,
    pub notices: Vec<Notice>,
}

/// GET /employee/learning: today's article/video/podcast picks plus stats.
/// `active` selects one of the picks by id; the first pick is active otherwise.
pub async fn load_learning(backend: &dyn Backend, active: Option<&str>) -> LearningView {
    let (options, (stats, stats_notice)) =
        tokio::join!(backend.daily_options(), load_stats(backend));

    let mut notices = Vec::new();
    let options: Vec<ContentCard> = match options {
        Ok(options) => options
            .into_items()
            .iter()
            .take(MAX_DAILY_OPTIONS)
            .map(|item| ContentCard::full(item, OPTION_TAGS))
            .collect(),
        Err(e) => {
            warn!(error = %e, "unable to load daily options");
            notices.push(Notice::warning(
                "Today's picks could not be loaded. Please refresh in a moment.",
            ));
            Vec::new()
        }
    };
    notices.extend(stats_notice);

    let active = active
        .and_then(|id| options.iter().find(|c| c.id == id))
        .or_else(|| options.first())
        .cloned();

    LearningView {
        greeting: None,
        options,
        active,
        stats,
        notices,
    }
}
