//! PulseLoop API client: the single point of entry for calls to the external backend.
//!
//! No other module builds backend URLs or talks HTTP to the API directly; pages
//! and the quiz flow go through the [`Backend`] trait, which [`ApiClient`]
//! implements. Calls are not retried and responses are not cached. Every page
//! owns its own loading and fallback behaviour.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::content::FeedEnvelope;
use crate::models::{
    Analytics, AnimatedSummary, ContentItem, DailyOptions, Quiz, QuizSubmission,
    QuizSubmitResult, StatsEnvelope,
};

pub mod routes;

pub use routes::ApiRoute;

const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API unreachable: {0}")]
    Network(#[source] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response from {route}: {message}")]
    Decode { route: String, message: String },

    #[error("API base URL cannot carry a path: {0}")]
    BaseUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Typed operations against the PulseLoop API, one per consumed endpoint.
///
/// Carried in `AppState` as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn analytics(&self, organization_id: &str) -> Result<Analytics, ApiError>;
    async fn feed(&self) -> Result<Vec<ContentItem>, ApiError>;
    async fn daily_options(&self) -> Result<DailyOptions, ApiError>;
    async fn content(&self, id: &str) -> Result<ContentItem, ApiError>;
    async fn animated_summary(&self, id: &str) -> Result<AnimatedSummary, ApiError>;
    async fn mark_complete(&self, id: &str) -> Result<(), ApiError>;
    async fn quiz(&self, content_id: &str) -> Result<Quiz, ApiError>;
    async fn retry_quiz(&self, content_id: &str, quiz_id: Option<&str>) -> Result<Quiz, ApiError>;
    async fn submit_quiz(
        &self,
        content_id: &str,
        submission: &QuizSubmission,
    ) -> Result<QuizSubmitResult, ApiError>;
    async fn stats(&self) -> Result<StatsEnvelope, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: Url, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pulseloop-web/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, route: &ApiRoute) -> Result<T, ApiError> {
        let request = self.http.get(self.url_for(route)?);
        let response = self.dispatch(route, request).await?;
        decode(route, response).await
    }

    pub async fn post_json<B, T>(&self, route: &ApiRoute, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url_for(route)?).json(body);
        let response = self.dispatch(route, request).await?;
        decode(route, response).await
    }

    /// POST for side effects only; the response body is not inspected.
    pub async fn post_unit<B>(&self, route: &ApiRoute, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.http.post(self.url_for(route)?).json(body);
        self.dispatch(route, request).await?;
        Ok(())
    }

    fn url_for(&self, route: &ApiRoute) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(route.segments());
        if !route.query().is_empty() {
            url.query_pairs_mut()
                .extend_pairs(route.query().iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn dispatch(
        &self,
        route: &ApiRoute,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let mut request = request.header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!(%route, "calling PulseLoop API");

        let response = request.send().await.map_err(|e| {
            warn!(%route, error = %e, "PulseLoop API unreachable");
            ApiError::Network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = read_limited_text(response).await;
            warn!(%route, status = status.as_u16(), "PulseLoop API returned an error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn analytics(&self, organization_id: &str) -> Result<Analytics, ApiError> {
        self.get_json(&ApiRoute::admin_analytics(organization_id))
            .await
    }

    async fn feed(&self) -> Result<Vec<ContentItem>, ApiError> {
        let envelope: FeedEnvelope = self.get_json(&ApiRoute::feed()).await?;
        Ok(envelope.feed)
    }

    async fn daily_options(&self) -> Result<DailyOptions, ApiError> {
        self.get_json(&ApiRoute::daily_options()).await
    }

    async fn content(&self, id: &str) -> Result<ContentItem, ApiError> {
        self.get_json(&ApiRoute::content(id)).await
    }

    async fn animated_summary(&self, id: &str) -> Result<AnimatedSummary, ApiError> {
        self.get_json(&ApiRoute::content_summary(id)).await
    }

    async fn mark_complete(&self, id: &str) -> Result<(), ApiError> {
        self.post_unit(&ApiRoute::content_complete(id), &json!({}))
            .await
    }

    async fn quiz(&self, content_id: &str) -> Result<Quiz, ApiError> {
        self.get_json(&ApiRoute::quiz(content_id)).await
    }

    async fn retry_quiz(&self, content_id: &str, quiz_id: Option<&str>) -> Result<Quiz, ApiError> {
        self.get_json(&ApiRoute::retry_quiz(content_id, quiz_id))
            .await
    }

    async fn submit_quiz(
        &self,
        content_id: &str,
        submission: &QuizSubmission,
    ) -> Result<QuizSubmitResult, ApiError> {
        self.post_json(&ApiRoute::submit_quiz(content_id), submission)
            .await
    }

    async fn stats(&self) -> Result<StatsEnvelope, ApiError> {
        self.get_json(&ApiRoute::my_stats()).await
    }
}

async fn decode<T: DeserializeOwned>(route: &ApiRoute, response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(ApiError::Network)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        warn!(%route, error = %e, "PulseLoop API response did not match the expected shape");
        ApiError::Decode {
            route: route.to_string(),
            message: e.to_string(),
        }
    })
}

async fn read_limited_text(response: Response) -> String {
    match response.bytes().await {
        Ok(bytes) => {
            let end = bytes.len().min(MAX_ERROR_BODY_BYTES);
            String::from_utf8_lossy(&bytes[..end]).into_owned()
        }
        Err(e) => {
            warn!(error = %e, "failed to read API error body");
            String::new()
        }
    }
}
