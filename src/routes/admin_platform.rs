use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::{
        admin_dto::{SendTemplatePayload, SentEmailResponse, UpdateTemplatePayload},
        catalog_dto::ContactSubmissionResponse,
    },
    error::Result,
    AppState,
};

#[axum::debug_handler]
pub async fn dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state
        .stats_service
        .admin_stats(&state.enrollment_service)
        .await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn list_email_templates(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let templates = state.email_service.list().await?;
    Ok(Json(templates))
}

#[axum::debug_handler]
pub async fn update_email_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<UpdateTemplatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let template = state
        .email_service
        .update(&name, &payload.subject, &payload.body)
        .await?;
    Ok(Json(template))
}

#[axum::debug_handler]
pub async fn send_email_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<SendTemplatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let rendered = state
        .email_service
        .send(&name, &payload.recipient, &payload.variables)
        .await?;
    Ok(Json(SentEmailResponse {
        recipient: payload.recipient,
        subject: rendered.subject,
        body: rendered.body,
    }))
}

#[axum::debug_handler]
pub async fn list_contact_submissions(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let submissions: Vec<ContactSubmissionResponse> = state
        .contact_service
        .list(100)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(submissions))
}
