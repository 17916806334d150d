use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        admin_dto::{
            CreateUserPayload, OverrideResponse, ToggleLessonPayload, UpdateUserPayload,
            UserDetailResponse, UserListQuery, UserListResponse,
        },
        auth_dto::UserResponse,
        learning_dto::ProgressResponse,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.user_service.list(query).await?;
    Ok(Json(UserListResponse::from(result)))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_id(id).await?;
    let enrollments = state
        .enrollment_service
        .enrollments_for_user(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let certificates = state
        .certificate_service
        .list_for_user(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let orders = state
        .enrollment_service
        .orders_for_user(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(UserDetailResponse {
        user: user.into(),
        enrollments,
        certificates,
        orders,
    }))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.update(id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Force-completes the course for the user: every gate is bypassed. Strictly
/// a manual data-correction tool.
#[axum::debug_handler]
pub async fn override_complete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((user_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .certificate_service
        .override_complete(claims.user_id()?, user_id, course_id, &state.attempt_service)
        .await?;
    Ok(Json(OverrideResponse::from_outcome(outcome)))
}

#[axum::debug_handler]
pub async fn toggle_lesson(
    State(state): State<AppState>,
    Path((user_id, lesson_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ToggleLessonPayload>,
) -> Result<impl IntoResponse> {
    state
        .progress_service
        .set_complete(user_id, lesson_id, payload.complete)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn user_course_progress(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let progress = state
        .progress_service
        .course_progress(user_id, course_id)
        .await?;
    Ok(Json(ProgressResponse::from(progress)))
}
