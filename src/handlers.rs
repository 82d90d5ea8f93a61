use crate::errors::AppError;
use crate::models::{
    DashboardResponse, IntakeForm, IntakeRequest, NotificationsResponse, PermissionRequest,
    SettingsPatch,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    Form, Json,
    extract::State,
    response::{Html, Redirect},
};
use serde_json::Value;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let tracker = state.tracker.lock().await;
    Html(render_index(&tracker.dashboard()))
}

pub async fn get_state(State(state): State<AppState>) -> Json<DashboardResponse> {
    let tracker = state.tracker.lock().await;
    Json(tracker.dashboard())
}

pub async fn add_intake(
    State(state): State<AppState>,
    Json(payload): Json<IntakeRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.add_intake_value(&payload.amount)?;
    Ok(Json(tracker.dashboard()))
}

pub async fn add_intake_form(
    State(state): State<AppState>,
    Form(form): Form<IntakeForm>,
) -> Result<Redirect, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.add_intake_value(&Value::String(form.amount))?;
    Ok(Redirect::to("/"))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<DashboardResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.update_settings(&patch)?;
    Ok(Json(tracker.dashboard()))
}

pub async fn recommended_goal(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.apply_recommended_goal()?;
    Ok(Json(tracker.dashboard()))
}

pub async fn reset_today(State(state): State<AppState>) -> Result<Json<DashboardResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.reset_today()?;
    Ok(Json(tracker.dashboard()))
}

pub async fn set_permission(
    State(state): State<AppState>,
    Json(payload): Json<PermissionRequest>,
) -> Json<DashboardResponse> {
    let mut tracker = state.tracker.lock().await;
    tracker.set_permission(payload.permission);
    Json(tracker.dashboard())
}

pub async fn take_notifications(State(state): State<AppState>) -> Json<NotificationsResponse> {
    Json(NotificationsResponse {
        notifications: state.outbox.drain(),
    })
}
