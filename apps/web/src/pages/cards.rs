use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ContentItem, ContentType};

const PREVIEW_CHARS: usize = 120;

/// Display form of a [`ContentItem`] shared by the feed-style pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentCard {
    pub id: String,
    pub title: String,
    pub kind: ContentType,
    pub url: String,
    pub href: String,
    pub quiz_href: String,
    pub description: Option<String>,
    pub date_label: Option<String>,
    pub tags: Vec<String>,
    pub priority_label: Option<String>,
}

impl ContentCard {
    /// Full description, at most `max_tags` tags.
    pub fn full(item: &ContentItem, max_tags: usize) -> Self {
        Self::build(item, max_tags, item.description.clone())
    }

    /// Description truncated for list previews.
    pub fn preview(item: &ContentItem, max_tags: usize) -> Self {
        let description = item.description.as_deref().map(|d| truncate(d, PREVIEW_CHARS));
        Self::build(item, max_tags, description)
    }

    fn build(item: &ContentItem, max_tags: usize, description: Option<String>) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            kind: item.kind,
            url: item.url.clone(),
            href: format!("/content/{}", item.id),
            quiz_href: format!("/content/{}/quiz", item.id),
            description,
            date_label: item.published_at.as_ref().map(date_label),
            tags: item.tags.iter().take(max_tags).cloned().collect(),
            priority_label: item.priority_score.map(priority_label),
        }
    }
}

/// `0.834` → `"83%"`
pub fn priority_label(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}

/// `2024-03-05T…` → `"Mar 5"`
pub fn date_label(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d").to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
