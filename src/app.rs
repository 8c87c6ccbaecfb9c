use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/routines/:id/toggle", post(handlers::toggle_form))
        .route("/reset", post(handlers::reset_form))
        .route("/api/sessions", post(handlers::create_session))
        .route("/api/routines", get(handlers::get_routines))
        .route("/api/toggle", post(handlers::toggle))
        .route("/api/reset", post(handlers::reset))
        .route("/api/sections/:category", get(handlers::get_section))
        .with_state(state)
}
