use serde::Serialize;
use tracing::warn;

use crate::api_client::Backend;
use crate::models::ContentItem;
use crate::pages::cards::ContentCard;
use crate::pages::notice::Notice;
use crate::pages::stats::{load_stats, StatsView};

const SPOTLIGHT_TAGS: usize = 4;
const QUEUE_TAGS: usize = 3;
const QUEUE_PREVIEW: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub stats: StatsView,
    pub spotlight: Option<ContentCard>,
    pub queue: QueueView,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueView {
    /// Everything after the spotlight, not just the previewed items.
    pub total: usize,
    pub items: Vec<ContentCard>,
}

/// GET /dashboard: feed and stats are fetched concurrently and independently;
/// either one failing leaves the other intact.
pub async fn load_dashboard(backend: &dyn Backend) -> DashboardView {
    let (feed, (stats, stats_notice)) = tokio::join!(backend.feed(), load_stats(backend));

    let mut notices = Vec::new();
    let feed = match feed {
        Ok(feed) => feed,
        Err(e) => {
            warn!(error = %e, "unable to fetch feed");
            notices.push(Notice::warning(
                "Your feed could not be loaded. Showing an empty queue for now.",
            ));
            Vec::new()
        }
    };
    notices.extend(stats_notice);

    let (spotlight, queue) = split_feed(&feed);
    if spotlight.is_none() && notices.is_empty() {
        notices.push(Notice::info(
            "No assignment yet. Check back shortly or ask your admin to tag new sources.",
        ));
    }

    DashboardView {
        stats,
        spotlight,
        queue,
        notices,
    }
}

/// The first feed entry is the spotlight; the rest is the queue.
pub fn split_feed(feed: &[ContentItem]) -> (Option<ContentCard>, QueueView) {
    let Some((first, rest)) = feed.split_first() else {
        return (
            None,
            QueueView {
                total: 0,
                items: Vec::new(),
            },
        );
    };

    let queue = QueueView {
        total: rest.len(),
        items: rest
            .iter()
            .take(QUEUE_PREVIEW)
            .map(|item| ContentCard::preview(item, QUEUE_TAGS))
            .collect(),
    };
    (Some(ContentCard::full(first, SPOTLIGHT_TAGS)), queue)
}
