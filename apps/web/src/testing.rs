//! Test support: fixtures, a scripted in-memory `Backend`, and an in-process
//! stand-in for the PulseLoop API served over real HTTP.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Notify;

use crate::api_client::{ApiError, ApiRoute, Backend};
use crate::models::{
    Analytics, AnimatedSummary, ContentItem, ContentType, DailyOptions, Quiz, QuizQuestion,
    QuizStatus, QuizSubmission, QuizSubmitResult, StatsEnvelope,
};
use crate::models::user::UserStats;

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn quiz_fixture(id: &str, questions: usize) -> Quiz {
    Quiz {
        id: id.to_string(),
        questions: (0..questions)
            .map(|i| QuizQuestion {
                prompt: format!("Question {}", i + 1),
                options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                explanation: Some("Because.".to_string()),
            })
            .collect(),
    }
}

pub fn submit_result(
    status: QuizStatus,
    correct: u32,
    wrong: u32,
    next_quiz_id: Option<&str>,
) -> QuizSubmitResult {
    QuizSubmitResult {
        status,
        correct_count: correct,
        wrong_count: wrong,
        review_hints: None,
        next_quiz_id: next_quiz_id.map(str::to_string),
        tech_score_change: None,
        tech_score: None,
        current_streak: None,
        longest_streak: None,
    }
}

pub fn content_fixture(id: &str, kind: ContentType) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        title: format!("Title {id}"),
        kind,
        url: format!("https://example.com/{id}"),
        description: Some(format!("About {id}")),
        summary: None,
        published_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).single(),
        tags: vec!["rust".to_string(), "ai".to_string()],
        priority_score: Some(0.8),
    }
}

pub fn stats_fixture(tech_score: f64, current: u32, longest: u32) -> StatsEnvelope {
    StatsEnvelope {
        user: UserStats {
            tech_score,
            current_streak: current,
            longest_streak: longest,
        },
        ..StatsEnvelope::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Failure {
    Status(u16),
    Malformed,
}

impl Failure {
    fn into_error(self, route: &ApiRoute) -> ApiError {
        match self {
            Failure::Status(status) => ApiError::Status {
                status,
                body: "scripted failure".to_string(),
            },
            Failure::Malformed => ApiError::Decode {
                route: route.to_string(),
                message: "scripted malformed response".to_string(),
            },
        }
    }
}

pub type Reply<T> = Result<T, Failure>;

/// Replies are consumed in order; the last one repeats.
struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
}

impl<T: Clone> Script<T> {
    fn empty() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }

    fn with(reply: Reply<T>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([reply])),
        }
    }

    fn set(&self, reply: Reply<T>) {
        let mut replies = self.replies.lock().unwrap();
        replies.clear();
        replies.push_back(reply);
    }

    fn push(&self, reply: Reply<T>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn next(&self) -> Reply<T> {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap_or(Err(Failure::Status(503)))
        }
    }
}

/// Parks calls until released, so tests can act while a request is in flight.
#[derive(Default)]
struct Hold {
    gate: Mutex<Option<Arc<Notify>>>,
    started: Notify,
}

impl Hold {
    fn arm(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    async fn pass(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            self.started.notify_one();
            gate.notified().await;
        }
    }
}

pub struct FakeBackend {
    calls: Mutex<Vec<String>>,
    submissions: Mutex<Vec<QuizSubmission>>,
    analytics: Script<Analytics>,
    feed: Script<Vec<ContentItem>>,
    daily: Script<DailyOptions>,
    content: Script<ContentItem>,
    summary: Script<AnimatedSummary>,
    complete: Script<()>,
    quiz: Script<Quiz>,
    retry_quiz: Script<Quiz>,
    submit: Script<QuizSubmitResult>,
    stats: Script<StatsEnvelope>,
    submit_hold: Hold,
    load_hold: Hold,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            analytics: Script::empty(),
            feed: Script::empty(),
            daily: Script::empty(),
            content: Script::empty(),
            summary: Script::empty(),
            complete: Script::with(Ok(())),
            quiz: Script::empty(),
            retry_quiz: Script::empty(),
            submit: Script::empty(),
            stats: Script::empty(),
            submit_hold: Hold::default(),
            load_hold: Hold::default(),
        }
    }
}

impl FakeBackend {
    pub fn set_analytics(&self, reply: Reply<Analytics>) {
        self.analytics.set(reply);
    }

    pub fn set_feed(&self, reply: Reply<Vec<ContentItem>>) {
        self.feed.set(reply);
    }

    pub fn set_daily(&self, reply: Reply<DailyOptions>) {
        self.daily.set(reply);
    }

    pub fn set_content(&self, reply: Reply<ContentItem>) {
        self.content.set(reply);
    }

    pub fn set_summary(&self, reply: Reply<AnimatedSummary>) {
        self.summary.set(reply);
    }

    pub fn set_complete(&self, reply: Reply<()>) {
        self.complete.set(reply);
    }

    pub fn set_quiz(&self, reply: Reply<Quiz>) {
        self.quiz.set(reply);
    }

    pub fn set_retry_quiz(&self, reply: Reply<Quiz>) {
        self.retry_quiz.set(reply);
    }

    pub fn set_submit(&self, reply: Reply<QuizSubmitResult>) {
        self.submit.set(reply);
    }

    pub fn push_stats(&self, reply: Reply<StatsEnvelope>) {
        self.stats.push(reply);
    }

    /// Every call as `"<METHOD> <route>"`, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<QuizSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    /// Parks every following submission until the returned gate is notified.
    pub fn hold_submissions(&self) -> Arc<Notify> {
        self.submit_hold.arm()
    }

    /// Resolves once a held submission has reached the backend.
    pub async fn submission_started(&self) {
        self.submit_hold.started.notified().await;
    }

    /// Parks every following quiz fetch (original or retry) until notified.
    pub fn hold_loads(&self) -> Arc<Notify> {
        self.load_hold.arm()
    }

    pub async fn load_started(&self) {
        self.load_hold.started.notified().await;
    }

    fn answer<T: Clone>(&self, method: &str, route: ApiRoute, script: &Script<T>) -> Result<T, ApiError> {
        self.calls.lock().unwrap().push(format!("{method} {route}"));
        script.next().map_err(|f| f.into_error(&route))
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn analytics(&self, organization_id: &str) -> Result<Analytics, ApiError> {
        self.answer("GET", ApiRoute::admin_analytics(organization_id), &self.analytics)
    }

    async fn feed(&self) -> Result<Vec<ContentItem>, ApiError> {
        self.answer("GET", ApiRoute::feed(), &self.feed)
    }

    async fn daily_options(&self) -> Result<DailyOptions, ApiError> {
        self.answer("GET", ApiRoute::daily_options(), &self.daily)
    }

    async fn content(&self, id: &str) -> Result<ContentItem, ApiError> {
        self.answer("GET", ApiRoute::content(id), &self.content)
    }

    async fn animated_summary(&self, id: &str) -> Result<AnimatedSummary, ApiError> {
        self.answer("GET", ApiRoute::content_summary(id), &self.summary)
    }

    async fn mark_complete(&self, id: &str) -> Result<(), ApiError> {
        self.answer("POST", ApiRoute::content_complete(id), &self.complete)
    }

    async fn quiz(&self, content_id: &str) -> Result<Quiz, ApiError> {
        self.load_hold.pass().await;
        self.answer("GET", ApiRoute::quiz(content_id), &self.quiz)
    }

    async fn retry_quiz(&self, content_id: &str, quiz_id: Option<&str>) -> Result<Quiz, ApiError> {
        self.load_hold.pass().await;
        self.answer(
            "GET",
            ApiRoute::retry_quiz(content_id, quiz_id),
            &self.retry_quiz,
        )
    }

    async fn submit_quiz(
        &self,
        content_id: &str,
        submission: &QuizSubmission,
    ) -> Result<QuizSubmitResult, ApiError> {
        self.submissions.lock().unwrap().push(submission.clone());
        self.submit_hold.pass().await;
        self.answer("POST", ApiRoute::submit_quiz(content_id), &self.submit)
    }

    async fn stats(&self) -> Result<StatsEnvelope, ApiError> {
        self.answer("GET", ApiRoute::my_stats(), &self.stats)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP stand-ins
// ────────────────────────────────────────────────────────────────────────────

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// A local URL with nothing listening behind it.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/")).unwrap()
}

struct StubQuestion {
    prompt: &'static str,
    correct: usize,
    concept: &'static str,
}

/// A minimal PulseLoop API: one content item `c1` with a three-question quiz.
/// Passing requires every answer to be correct; a failed attempt issues a
/// retry quiz and review hints for the missed concepts.
#[derive(Clone)]
struct StubApi {
    quizzes: Arc<HashMap<&'static str, Vec<StubQuestion>>>,
}

#[derive(Deserialize)]
struct RetryQuery {
    quiz_id: Option<String>,
}

#[derive(Deserialize)]
struct SubmitBody {
    answers: Vec<usize>,
    quiz_id: Option<String>,
}

pub fn stub_api() -> Router {
    let questions = || {
        vec![
            StubQuestion {
                prompt: "What does the borrow checker enforce?",
                correct: 0,
                concept: "borrowing",
            },
            StubQuestion {
                prompt: "Which trait enables `?` conversion?",
                correct: 0,
                concept: "error conversion",
            },
            StubQuestion {
                prompt: "What runs futures to completion?",
                correct: 2,
                concept: "async runtimes",
            },
        ]
    };
    let quizzes = HashMap::from([("q1", questions()), ("q1-retry", questions())]);
    let state = StubApi {
        quizzes: Arc::new(quizzes),
    };

    Router::new()
        .route("/api/quiz/content/:id", get(stub_quiz))
        .route("/api/quiz/content/:id/retry", get(stub_retry_quiz))
        .route("/api/quiz/content/:id/submit", post(stub_submit))
        .route(
            "/api/me/stats",
            get(|| async { Json(json!({"user": {"tech_score": 64.0, "current_streak": 2, "longest_streak": 6}})) }),
        )
        .route(
            "/api/feed",
            get(|| async {
                Json(json!({"feed": [
                    {"id": "c1", "title": "Ownership in practice", "type": "article", "url": "https://example.com/c1", "published_at": "2024-03-05T09:00:00Z", "priority_score": 0.91},
                    {"id": "c2", "title": "Async deep dive", "type": "video", "url": "https://www.youtube.com/watch?v=x1"}
                ]}))
            }),
        )
        .route(
            "/api/admin/analytics",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "analytics warming up") }),
        )
        .with_state(state)
}

fn quiz_json(id: &str, questions: &[StubQuestion]) -> serde_json::Value {
    json!({
        "id": id,
        "questions": questions.iter().map(|q| json!({
            "question": q.prompt,
            "options": ["first", "second", "third"],
            "correct_answer": q.correct,
            "explanation": format!("Revisit {}", q.concept),
        })).collect::<Vec<_>>(),
    })
}

async fn stub_quiz(State(api): State<StubApi>, Path(_content): Path<String>) -> Response {
    match api.quizzes.get("q1") {
        Some(questions) => Json(quiz_json("q1", questions)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn stub_retry_quiz(
    State(api): State<StubApi>,
    Path(_content): Path<String>,
    Query(query): Query<RetryQuery>,
) -> Response {
    let id = query.quiz_id.unwrap_or_else(|| "q1-retry".to_string());
    match api.quizzes.get_key_value(id.as_str()) {
        Some((id, questions)) => Json(quiz_json(id, questions)).into_response(),
        None => (StatusCode::NOT_FOUND, r#"{"detail":"Retry quiz not found"}"#).into_response(),
    }
}

async fn stub_submit(
    State(api): State<StubApi>,
    Path(_content): Path<String>,
    Json(body): Json<SubmitBody>,
) -> Response {
    let quiz_id = body.quiz_id.unwrap_or_else(|| "q1".to_string());
    let Some(questions) = api.quizzes.get(quiz_id.as_str()) else {
        return (StatusCode::NOT_FOUND, r#"{"detail":"Quiz not found"}"#).into_response();
    };
    if body.answers.len() != questions.len() {
        return Json(json!({"error": "Invalid number of answers"})).into_response();
    }

    let missed: Vec<&StubQuestion> = questions
        .iter()
        .zip(&body.answers)
        .filter(|(q, a)| q.correct != **a)
        .map(|(q, _)| q)
        .collect();
    let correct = questions.len() - missed.len();

    if missed.is_empty() {
        return Json(json!({
            "status": "passed",
            "correct_count": correct,
            "wrong_count": 0,
            "tech_score_change": 10,
            "tech_score": 74.0,
            "current_streak": 3,
            "longest_streak": 6,
        }))
        .into_response();
    }

    Json(json!({
        "status": "retry",
        "correct_count": correct,
        "wrong_count": missed.len(),
        "review_hints": {
            "timestamps": [],
            "articleHighlights": [{"paragraphIndex": 3}],
            "concepts": missed.iter().map(|q| q.concept).collect::<Vec<_>>(),
        },
        "next_quiz_id": "q1-retry",
        "tech_score_change": -2,
    }))
    .into_response()
}
