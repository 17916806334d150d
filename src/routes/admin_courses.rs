use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::course_dto::{
        CourseListQuery, CourseListResponse, CourseOutlineResponse, CourseResponse,
        CreateCoursePayload, CreateLessonPayload, CreateModulePayload, LessonResponse,
        ModuleResponse, QuizResponse, ReorderPayload, UpdateCoursePayload, UpdateLessonPayload,
        UpdateModulePayload, UpsertQuizPayload,
    },
    error::Result,
    AppState,
};

#[axum::debug_handler]
pub async fn create_course(
    State(state): State<AppState>,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let course = state.course_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(CourseResponse::from(course))))
}

#[axum::debug_handler]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCoursePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let course = state.course_service.update(id, payload).await?;
    Ok(Json(CourseResponse::from(course)))
}

#[axum::debug_handler]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.course_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.course_service.list(query).await?;
    Ok(Json(CourseListResponse::from(result)))
}

/// Full outline including question answers and explanations; the admin
/// surface is the only place these leave the database.
#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_by_id(id).await?;
    let outline = state.course_service.outline(course).await?;
    Ok(Json(CourseOutlineResponse::from(outline)))
}

#[axum::debug_handler]
pub async fn create_module(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateModulePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let module = state.course_service.create_module(course_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ModuleResponse::from(module))))
}

#[axum::debug_handler]
pub async fn update_module(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<UpdateModulePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let module = state.course_service.update_module(module_id, payload).await?;
    Ok(Json(ModuleResponse::from(module)))
}

#[axum::debug_handler]
pub async fn delete_module(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.course_service.delete_module(module_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn reorder_modules(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<ReorderPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let modules = state
        .course_service
        .reorder_modules(course_id, &payload.ids)
        .await?;
    let responses: Vec<ModuleResponse> = modules.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

#[axum::debug_handler]
pub async fn create_lesson(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<CreateLessonPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let lesson = state.course_service.create_lesson(module_id, payload).await?;
    Ok((StatusCode::CREATED, Json(LessonResponse::from(lesson))))
}

#[axum::debug_handler]
pub async fn update_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(payload): Json<UpdateLessonPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let lesson = state.course_service.update_lesson(lesson_id, payload).await?;
    Ok(Json(LessonResponse::from(lesson)))
}

#[axum::debug_handler]
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.course_service.delete_lesson(lesson_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn reorder_lessons(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<ReorderPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let lessons = state
        .course_service
        .reorder_lessons(module_id, &payload.ids)
        .await?;
    let responses: Vec<LessonResponse> = lessons.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

#[axum::debug_handler]
pub async fn upsert_quiz(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<UpsertQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.course_service.upsert_quiz(module_id, payload).await?;
    Ok(Json(QuizResponse::from(quiz)))
}

#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.course_service.delete_quiz(module_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
