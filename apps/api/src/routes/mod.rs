pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::builder::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        // Builder sessions
        .route(
            "/api/v1/builder/sessions",
            post(handlers::handle_create_session),
        )
        .route(
            "/api/v1/builder/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_discard_session),
        )
        .route(
            "/api/v1/builder/sessions/:id/personal",
            put(handlers::handle_set_personal),
        )
        .route(
            "/api/v1/builder/sessions/:id/skills",
            put(handlers::handle_set_skills),
        )
        .route(
            "/api/v1/builder/sessions/:id/template",
            put(handlers::handle_select_template),
        )
        .route(
            "/api/v1/builder/sessions/:id/advance",
            post(handlers::handle_advance),
        )
        .route(
            "/api/v1/builder/sessions/:id/retreat",
            post(handlers::handle_retreat),
        )
        .route(
            "/api/v1/builder/sessions/:id/preview",
            get(handlers::handle_preview),
        )
        .route(
            "/api/v1/builder/sessions/:id/export",
            post(handlers::handle_export),
        )
        // Repeatable sections: education | experience | projects
        .route(
            "/api/v1/builder/sessions/:id/:section",
            post(handlers::handle_add_entry),
        )
        .route(
            "/api/v1/builder/sessions/:id/:section/:key",
            patch(handlers::handle_update_entry).delete(handlers::handle_remove_entry),
        )
        .with_state(state)
}
