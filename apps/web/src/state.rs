use std::sync::Arc;

use crate::api_client::Backend;
use crate::config::Config;
use crate::quiz::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// PulseLoop API. `ApiClient` in production, a fake in tests.
    pub backend: Arc<dyn Backend>,
    pub config: Config,
    pub quiz_sessions: Arc<SessionRegistry>,
}
