use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api_client::Backend;
use crate::lifecycle::Mount;
use crate::quiz::machine::{LoadRequest, QuizAttempt, QuizError, QuizView};

/// One mounted quiz page: the attempt state plus its fetch lifecycle.
///
/// The attempt lock is never held across a backend call. Completions re-take
/// the lock and go through the mount scope, so once [`QuizSession::close`]
/// returns no late response can change the attempt.
///
/// Operations that move the attempt into Loading or Submitting run on their
/// own task together with their completion. A caller that goes away mid-request
/// (client disconnect, timeout) cannot leave the attempt stuck in either phase.
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    attempt: Mutex<QuizAttempt>,
    mount: Mount,
    touched: StdMutex<Instant>,
}

impl QuizSession {
    pub fn new(content_id: &str, retry: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt: Mutex::new(QuizAttempt::new(content_id, retry)),
            mount: Mount::new(),
            touched: StdMutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn idle_for(&self) -> Duration {
        let touched = self.touched.lock().unwrap_or_else(|e| e.into_inner());
        touched.elapsed()
    }

    pub async fn view(&self) -> Result<QuizView, QuizError> {
        let attempt = self.attempt.lock().await;
        self.ensure_open()?;
        Ok(attempt.view())
    }

    /// Fetches the quiz for the current Loading phase, following the
    /// retry-to-original fallback when needed.
    pub async fn load(self: &Arc<Self>, backend: Arc<dyn Backend>) -> Result<QuizView, QuizError> {
        let session = Arc::clone(self);
        detached(async move { session.load_now(backend.as_ref()).await }).await
    }

    pub async fn select(&self, question: usize, option: usize) -> Result<QuizView, QuizError> {
        let mut attempt = self.attempt.lock().await;
        self.ensure_open()?;
        attempt.select(question, option)?;
        self.touch();
        Ok(attempt.view())
    }

    /// Submits all answers as one batch. Rejected without a network call while
    /// any answer is unset or another submission is in flight.
    pub async fn submit(self: &Arc<Self>, backend: Arc<dyn Backend>) -> Result<QuizView, QuizError> {
        let session = Arc::clone(self);
        detached(async move { session.submit_now(backend.as_ref()).await }).await
    }

    /// Resets the attempt and loads the retry quiz of the current chain.
    pub async fn retry(self: &Arc<Self>, backend: Arc<dyn Backend>) -> Result<QuizView, QuizError> {
        let session = Arc::clone(self);
        detached(async move {
            {
                let mut attempt = session.attempt.lock().await;
                session.ensure_open()?;
                attempt.retry()?;
            }
            session.load_now(backend.as_ref()).await
        })
        .await
    }

    /// Unmounts the session. Waits for any state update in progress so no
    /// mutation can land afterwards.
    pub async fn close(&self) {
        let _attempt = self.attempt.lock().await;
        self.mount.unmount();
        debug!(session = %self.id, "quiz session closed");
    }

    async fn load_now(&self, backend: &dyn Backend) -> Result<QuizView, QuizError> {
        let scope = self.mount.scope();
        let (content_id, mut request) = {
            let attempt = self.attempt.lock().await;
            self.ensure_open()?;
            (attempt.content_id().to_string(), attempt.load_request()?)
        };
        self.touch();

        loop {
            let fetched = match &request {
                LoadRequest::Original => backend.quiz(&content_id).await,
                LoadRequest::Retry { quiz_id } => {
                    backend.retry_quiz(&content_id, quiz_id.as_deref()).await
                }
            };

            let mut attempt = self.attempt.lock().await;
            let next = scope
                .apply(|| match fetched {
                    Ok(quiz) => {
                        debug!(session = %self.id, quiz_id = %quiz.id, "quiz loaded");
                        attempt.quiz_loaded(&request, quiz).map(|()| None)
                    }
                    Err(e) => {
                        warn!(session = %self.id, %content_id, error = %e, "quiz fetch failed");
                        attempt.load_failed(&request)
                    }
                })
                .ok_or_else(|| self.discarded("load"))??;

            match next {
                Some(fallback) => request = fallback,
                None => return Ok(attempt.view()),
            }
        }
    }

    async fn submit_now(&self, backend: &dyn Backend) -> Result<QuizView, QuizError> {
        let scope = self.mount.scope();
        let (content_id, submission) = {
            let mut attempt = self.attempt.lock().await;
            self.ensure_open()?;
            (attempt.content_id().to_string(), attempt.begin_submit()?)
        };
        self.touch();

        info!(
            session = %self.id,
            %content_id,
            quiz_id = %submission.quiz_id,
            "submitting quiz answers"
        );
        let outcome = backend.submit_quiz(&content_id, &submission).await;

        let mut attempt = self.attempt.lock().await;
        scope
            .apply(|| match outcome {
                Ok(result) => {
                    info!(session = %self.id, status = ?result.status, correct = result.correct_count, "quiz scored");
                    attempt.submit_succeeded(result)
                }
                Err(e) => {
                    warn!(session = %self.id, error = %e, "quiz submission failed");
                    attempt.submit_failed()
                }
            })
            .ok_or_else(|| self.discarded("submit"))??;

        Ok(attempt.view())
    }

    fn ensure_open(&self) -> Result<(), QuizError> {
        if self.mount.is_mounted() {
            Ok(())
        } else {
            Err(QuizError::Closed)
        }
    }

    fn discarded(&self, op: &str) -> QuizError {
        debug!(session = %self.id, op, "session closed while request in flight; response discarded");
        QuizError::Closed
    }

    fn touch(&self) {
        let mut touched = self.touched.lock().unwrap_or_else(|e| e.into_inner());
        *touched = Instant::now();
    }
}

/// Runs `work` to completion on its own task, even if the caller is dropped.
async fn detached<F>(work: F) -> Result<QuizView, QuizError>
where
    F: Future<Output = Result<QuizView, QuizError>> + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(outcome) => outcome,
        Err(e) => match e.try_into_panic() {
            Ok(panic) => std::panic::resume_unwind(panic),
            // runtime shutting down
            Err(_) => Err(QuizError::Closed),
        },
    }
}
