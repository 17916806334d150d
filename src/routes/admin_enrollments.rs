use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::admin_dto::{
        EnrollmentListQuery, EnrollmentListResponse, EnrollmentResponse, ProvisionPayload,
        ProvisionResponse,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn list_enrollments(
    State(state): State<AppState>,
    Query(query): Query<EnrollmentListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.enrollment_service.list(query).await?;
    Ok(Json(EnrollmentListResponse::from(result)))
}

#[axum::debug_handler]
pub async fn provision_access(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProvisionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let granted = state
        .enrollment_service
        .provision(
            claims.user_id()?,
            payload.user_id,
            payload.course_id,
            payload.amount,
            payload.notes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ProvisionResponse::from(granted))))
}

#[axum::debug_handler]
pub async fn revoke_enrollment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let enrollment = state.enrollment_service.revoke(id).await?;
    Ok(Json(EnrollmentResponse::from(enrollment)))
}

#[axum::debug_handler]
pub async fn restore_enrollment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let enrollment = state.enrollment_service.restore(id).await?;
    Ok(Json(EnrollmentResponse::from(enrollment)))
}

/// Deletes the certificate and clears the pair's completion stamps, returning
/// the user to the "not yet certified" state.
#[axum::debug_handler]
pub async fn revoke_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.certificate_service.revoke(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
