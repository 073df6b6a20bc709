use serde::Serialize;
use tracing::warn;

use crate::api_client::Backend;
use crate::models::{AnimatedSummary, ContentItem, ContentType, StoryboardStep};
use crate::pages::cards::ContentCard;
use crate::pages::notice::Notice;
use crate::pages::stats::{load_stats, StatsView};

/// How the browser should present the content body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    ExternalLink { href: String },
    EmbeddedVideo { src: String },
    Audio { src: String, mime: &'static str },
}

impl Media {
    pub fn for_item(item: &ContentItem) -> Self {
        match item.kind {
            ContentType::Article => Media::ExternalLink {
                href: item.url.clone(),
            },
            ContentType::Video => Media::EmbeddedVideo {
                src: item.url.replacen("watch?v=", "embed/", 1),
            },
            ContentType::Podcast => Media::Audio {
                src: item.url.clone(),
                mime: "audio/mpeg",
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentDetail {
    #[serde(flatten)]
    pub card: ContentCard,
    pub summary: Option<String>,
    pub media: Media,
    pub summary_href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentPageView {
    pub content: Option<ContentDetail>,
    pub not_found: bool,
    pub notices: Vec<Notice>,
}

/// GET /content/:id
pub async fn load_content(backend: &dyn Backend, id: &str) -> ContentPageView {
    match backend.content(id).await {
        Ok(item) => ContentPageView {
            content: Some(ContentDetail {
                card: ContentCard::full(&item, usize::MAX),
                summary: item.summary.clone(),
                media: Media::for_item(&item),
                summary_href: format!("/content/{}/summary", item.id),
            }),
            not_found: false,
            notices: Vec::new(),
        },
        Err(e) if e.is_not_found() => ContentPageView {
            content: None,
            not_found: true,
            notices: vec![Notice::info("Content not found")],
        },
        Err(e) => {
            warn!(content_id = %id, error = %e, "unable to fetch content");
            ContentPageView {
                content: None,
                not_found: false,
                notices: vec![Notice::warning(
                    "This content could not be loaded right now. Please try again shortly.",
                )],
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub steps: Vec<StoryboardStep>,
    pub audio_url: Option<String>,
    pub notices: Vec<Notice>,
}

impl From<AnimatedSummary> for SummaryView {
    fn from(summary: AnimatedSummary) -> Self {
        let mut steps = summary.storyboard;
        steps.sort_by_key(|s| s.step);
        Self {
            steps,
            audio_url: Some(summary.audio_url),
            notices: Vec::new(),
        }
    }
}

/// GET /content/:id/summary: fetched on demand, only when the viewer asks for it.
pub async fn load_summary(backend: &dyn Backend, id: &str) -> SummaryView {
    match backend.animated_summary(id).await {
        Ok(summary) => summary.into(),
        Err(e) => {
            warn!(content_id = %id, error = %e, "unable to fetch animated summary");
            SummaryView {
                steps: Vec::new(),
                audio_url: None,
                notices: vec![Notice::warning(
                    "The animated summary is not ready yet. Try again in a moment.",
                )],
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionView {
    pub content_id: String,
    pub recorded: bool,
    /// Re-fetched after the completion is recorded; `None` if the POST failed.
    pub stats: Option<StatsView>,
    pub notices: Vec<Notice>,
}

/// POST /content/:id/complete: records the side effect, then re-reads the
/// server-owned stats. Counters are never incremented locally.
pub async fn mark_complete(backend: &dyn Backend, id: &str) -> CompletionView {
    if let Err(e) = backend.mark_complete(id).await {
        warn!(content_id = %id, error = %e, "unable to mark content complete");
        return CompletionView {
            content_id: id.to_string(),
            recorded: false,
            stats: None,
            notices: vec![Notice::warning("Unable to mark content as viewed right now.")],
        };
    }

    let (stats, stats_notice) = load_stats(backend).await;
    let mut notices = vec![Notice::success(
        "Marked as viewed. Complete the quiz to boost your streak.",
    )];
    notices.extend(stats_notice);

    CompletionView {
        content_id: id.to_string(),
        recorded: true,
        stats: Some(stats),
        notices,
    }
}
