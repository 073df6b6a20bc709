use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Video,
    Podcast,
}

/// A curated piece of content as served by the PulseLoop API.
/// Read-only from the web tier's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 0.0 – 1.0
    #[serde(default)]
    pub priority_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedEnvelope {
    #[serde(default)]
    pub feed: Vec<ContentItem>,
}

/// `GET /api/feed/daily-options`: the latest item of each type, any of which may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyOptions {
    #[serde(default)]
    pub article: Option<ContentItem>,
    #[serde(default)]
    pub video: Option<ContentItem>,
    #[serde(default)]
    pub podcast: Option<ContentItem>,
}

impl DailyOptions {
    /// Article, video, podcast, in that order, skipping the missing ones.
    pub fn into_items(self) -> Vec<ContentItem> {
        [self.article, self.video, self.podcast]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryboardStep {
    pub step: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatedSummary {
    #[serde(default)]
    pub storyboard: Vec<StoryboardStep>,
    pub audio_url: String,
}

/// The API emits RFC 3339 timestamps, but older documents carry naive ISO
/// timestamps without an offset. Those are read as UTC.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}
