pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/api/v1/resume/analyze", post(handlers::handle_analyze_resume))
        .route(
            "/api/v1/resume/analyze-text",
            post(handlers::handle_analyze_resume_text),
        )
        .route("/api/v1/resume/generate", post(handlers::handle_generate))
        // Competitiveness API
        .route(
            "/api/v1/competitiveness/analyze",
            post(handlers::handle_analyze_competitiveness),
        )
        .route(
            "/api/v1/competitiveness/quantize",
            post(handlers::handle_quantize),
        )
        // Roadmap API
        .route("/api/v1/roadmap", post(handlers::handle_roadmap))
        // Career exploration API
        .route(
            "/api/v1/career/questions",
            post(handlers::handle_career_questions),
        )
        .route(
            "/api/v1/career/experiment",
            post(handlers::handle_analyze_experiment),
        )
        .route("/api/v1/career/plan", post(handlers::handle_career_plan))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
