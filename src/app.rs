use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/intake/add", post(handlers::add_intake_form))
        .route("/api/state", get(handlers::get_state))
        .route("/api/intake", post(handlers::add_intake))
        .route("/api/settings", post(handlers::update_settings))
        .route("/api/settings/recommended", post(handlers::recommended_goal))
        .route("/api/reset-today", post(handlers::reset_today))
        .route("/api/permission", post(handlers::set_permission))
        .route("/api/notifications", get(handlers::take_notifications))
        .with_state(state)
}
