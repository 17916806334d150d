use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::{
        catalog_dto::{
            ContactPayload, PublicCourseDetail, PublicCourseListResponse, PublicCourseQuery,
            PublicStatsResponse,
        },
        course_dto::CourseListQuery,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/public/courses",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("level" = Option<String>, Query, description = "Filter by level"),
        ("featured" = Option<bool>, Query, description = "Featured courses only"),
        ("search" = Option<String>, Query, description = "Search query")
    ),
    responses(
        (status = 200, description = "Published course catalogue")
    )
)]
#[axum::debug_handler]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<PublicCourseQuery>,
) -> Result<impl IntoResponse> {
    let result = state
        .course_service
        .list(CourseListQuery {
            page: query.page,
            per_page: query.per_page,
            published: Some(true),
            featured: query.featured,
            level: query.level,
            search: query.search,
        })
        .await?;
    Ok(Json(PublicCourseListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/public/courses/{slug}",
    params(
        ("slug" = String, Path, description = "Course slug")
    ),
    responses(
        (status = 200, description = "Course curriculum outline"),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_by_slug(&slug, true).await?;
    let outline = state.course_service.outline(course).await?;
    Ok(Json(PublicCourseDetail::from(outline)))
}

#[utoipa::path(
    get,
    path = "/api/public/stats",
    responses(
        (status = 200, description = "Platform headline numbers")
    )
)]
#[axum::debug_handler]
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.stats_service.public_stats().await?;
    Ok(Json(PublicStatsResponse {
        courses: stats.courses,
        students: stats.students,
        certificates: stats.certificates,
    }))
}

#[utoipa::path(
    post,
    path = "/api/public/contact",
    request_body = ContactPayload,
    responses(
        (status = 201, description = "Submission stored"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.contact_service.submit(payload).await?;
    Ok(StatusCode::CREATED)
}
