pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::form::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/draft",
            get(handlers::handle_get_draft).delete(handlers::handle_clear_draft),
        )
        .route(
            "/api/v1/draft/fields/:field",
            patch(handlers::handle_update_field),
        )
        .route("/api/v1/draft/skills", post(handlers::handle_add_skill))
        .route(
            "/api/v1/draft/skills/:skill",
            delete(handlers::handle_remove_skill),
        )
        .route(
            "/api/v1/draft/validate",
            post(handlers::handle_validate_form),
        )
        .route("/api/v1/draft/submit", post(handlers::handle_submit))
        .route(
            "/api/v1/validate/field",
            post(handlers::handle_validate_field),
        )
        .with_state(state)
}
