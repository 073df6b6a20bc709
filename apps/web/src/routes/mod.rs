pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::pages::handlers as pages;
use crate::quiz::handlers as quiz;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Learner pages
        .route("/dashboard", get(pages::handle_dashboard))
        .route("/employee/institutions", get(pages::handle_institutions))
        .route("/employee/enroll", post(pages::handle_enroll))
        .route("/employee/learning", get(pages::handle_learning))
        .route("/content/:id", get(pages::handle_content))
        .route("/content/:id/summary", get(pages::handle_summary))
        .route("/content/:id/complete", post(pages::handle_complete))
        // Quiz sessions
        .route("/content/:id/quiz", post(quiz::handle_open_quiz))
        .route(
            "/quiz/sessions/:sid",
            get(quiz::handle_get_session).delete(quiz::handle_close),
        )
        .route(
            "/quiz/sessions/:sid/answers/:question",
            put(quiz::handle_select_answer),
        )
        .route("/quiz/sessions/:sid/submit", post(quiz::handle_submit))
        .route("/quiz/sessions/:sid/retry", post(quiz::handle_retry))
        // Admin console
        .route("/admin", get(pages::handle_admin))
        .route("/admin/plans", get(pages::handle_plans))
        .route(
            "/admin/checkout",
            get(pages::handle_checkout).post(pages::handle_checkout_confirm),
        )
        .with_state(state)
}
