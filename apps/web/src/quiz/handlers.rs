//! Axum route handlers for quiz sessions.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::quiz::machine::QuizView;
use crate::quiz::session::QuizSession;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OpenQuizQuery {
    #[serde(default)]
    pub retry: bool,
}

#[derive(Debug, Deserialize)]
pub struct SelectAnswerRequest {
    pub option: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub quiz: QuizView,
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<QuizSession>, AppError> {
    state
        .quiz_sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Quiz session {id} not found")))
}

fn respond(session: &QuizSession, quiz: QuizView) -> Json<SessionResponse> {
    Json(SessionResponse {
        session_id: session.id(),
        quiz,
    })
}

/// POST /content/:id/quiz?retry=<bool>
///
/// Mounts a quiz page: registers the session first so it can be closed while
/// the initial fetch is still running, then loads the quiz.
pub async fn handle_open_quiz(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
    Query(params): Query<OpenQuizQuery>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = Arc::new(QuizSession::new(&content_id, params.retry));
    state.quiz_sessions.insert(Arc::clone(&session)).await;
    let open_sessions = state.quiz_sessions.len().await;
    debug!(
        session = %session.id(),
        %content_id,
        retry = params.retry,
        open_sessions,
        "quiz session opened"
    );

    let view = session.load(Arc::clone(&state.backend)).await?;
    Ok((StatusCode::CREATED, respond(&session, view)))
}

/// GET /quiz/sessions/:sid
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, sid).await?;
    let view = session.view().await?;
    Ok(respond(&session, view))
}

/// PUT /quiz/sessions/:sid/answers/:question
pub async fn handle_select_answer(
    State(state): State<AppState>,
    Path((sid, question)): Path<(Uuid, usize)>,
    Json(request): Json<SelectAnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, sid).await?;
    let view = session.select(question, request.option).await?;
    Ok(respond(&session, view))
}

/// POST /quiz/sessions/:sid/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, sid).await?;
    let view = session.submit(Arc::clone(&state.backend)).await?;
    Ok(respond(&session, view))
}

/// POST /quiz/sessions/:sid/retry
pub async fn handle_retry(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, sid).await?;
    let view = session.retry(Arc::clone(&state.backend)).await?;
    Ok(respond(&session, view))
}

/// DELETE /quiz/sessions/:sid
pub async fn handle_close(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.quiz_sessions.close(sid).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Quiz session {sid} not found")))
    }
}
