//! Axum route handlers for the page view-models.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::pages::admin::{load_admin, AdminView};
use crate::pages::checkout::{
    checkout_view, confirm_checkout, plan_options, CheckoutConfirm, CheckoutView, PlanOption,
};
use crate::pages::content::{
    load_content, load_summary, mark_complete, CompletionView, ContentPageView, SummaryView,
};
use crate::pages::dashboard::{load_dashboard, DashboardView};
use crate::pages::employee::{load_learning, EnrollmentForm, LearningView, INSTITUTIONS};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub plan: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LearningQuery {
    pub active: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InstitutionsResponse {
    pub institutions: &'static [&'static str],
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(load_dashboard(state.backend.as_ref()).await)
}

/// GET /employee/institutions
pub async fn handle_institutions() -> Json<InstitutionsResponse> {
    Json(InstitutionsResponse {
        institutions: INSTITUTIONS,
    })
}

/// POST /employee/enroll
///
/// Validates the enrollment form and moves straight to the learning view.
pub async fn handle_enroll(
    State(state): State<AppState>,
    Json(form): Json<EnrollmentForm>,
) -> Result<Json<LearningView>, AppError> {
    let invalid = form.invalid_fields();
    if !invalid.is_empty() {
        return Err(AppError::Validation(format!(
            "Please fix: {}",
            invalid.join(", ")
        )));
    }

    let mut view = load_learning(state.backend.as_ref(), None).await;
    view.greeting = Some(format!("Welcome, {}", form.first_name.trim()));
    Ok(Json(view))
}

/// GET /employee/learning
pub async fn handle_learning(
    State(state): State<AppState>,
    Query(params): Query<LearningQuery>,
) -> Json<LearningView> {
    Json(load_learning(state.backend.as_ref(), params.active.as_deref()).await)
}

/// GET /content/:id
pub async fn handle_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ContentPageView> {
    Json(load_content(state.backend.as_ref(), &id).await)
}

/// GET /content/:id/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<SummaryView> {
    Json(load_summary(state.backend.as_ref(), &id).await)
}

/// POST /content/:id/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<CompletionView> {
    Json(mark_complete(state.backend.as_ref(), &id).await)
}

/// GET /admin
pub async fn handle_admin(
    State(state): State<AppState>,
    Query(params): Query<AdminQuery>,
) -> Json<AdminView> {
    Json(
        load_admin(
            state.backend.as_ref(),
            &state.config.organization_id,
            params.status.as_deref(),
        )
        .await,
    )
}

/// GET /admin/plans
pub async fn handle_plans() -> Json<Vec<PlanOption>> {
    Json(plan_options())
}

/// GET /admin/checkout?plan=<slug>
pub async fn handle_checkout(Query(params): Query<CheckoutQuery>) -> Json<CheckoutView> {
    Json(checkout_view(params.plan.as_deref()))
}

/// POST /admin/checkout
pub async fn handle_checkout_confirm(
    Form(request): Form<CheckoutConfirm>,
) -> Result<Redirect, AppError> {
    let location = confirm_checkout(&request)?;
    Ok(Redirect::to(&location))
}
