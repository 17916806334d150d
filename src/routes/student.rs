use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        auth_dto::{ChangePasswordPayload, UpdateProfilePayload, UserResponse},
        learning_dto::{
            CertificateResponse, EnrolledCourseResponse, NotePayload, NoteResponse,
            OrderResponse, ProgressResponse, QuizAttemptResponse, QuizAttemptSummary,
            QuizForTaking, StudentCourseDetail, StudentDashboardResponse, StudentLesson,
            StudentModuleOutline, StudentQuizSummary, SubmitQuizPayload,
        },
    },
    error::{Error, Result},
    middleware::auth::Claims,
    services::grading_service::SubmittedAnswer,
    AppState,
};

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_id(claims.user_id()?).await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .update_profile(claims.user_id()?, payload)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .user_service
        .change_password(
            claims.user_id()?,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;

    let mut courses = Vec::new();
    for (enrollment, course) in state.enrollment_service.enrolled_courses(user_id).await? {
        let progress = state
            .progress_service
            .course_progress(user_id, course.id)
            .await?;
        courses.push(EnrolledCourseResponse::from_parts(
            enrollment, course, progress,
        ));
    }

    let certificates = state
        .certificate_service
        .list_for_user(user_id)
        .await?
        .into_iter()
        .map(CertificateResponse::from)
        .collect();

    let recent_attempts = state
        .attempt_service
        .recent_attempts_for_user(user_id, 10)
        .await?
        .into_iter()
        .map(QuizAttemptSummary::from)
        .collect();

    Ok(Json(StudentDashboardResponse {
        courses,
        certificates,
        recent_attempts,
    }))
}

#[axum::debug_handler]
pub async fn list_courses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let mut courses = Vec::new();
    for (enrollment, course) in state.enrollment_service.enrolled_courses(user_id).await? {
        let progress = state
            .progress_service
            .course_progress(user_id, course.id)
            .await?;
        courses.push(EnrolledCourseResponse::from_parts(
            enrollment, course, progress,
        ));
    }
    Ok(Json(courses))
}

#[utoipa::path(
    get,
    path = "/api/me/courses/{slug}",
    params(
        ("slug" = String, Path, description = "Course slug")
    ),
    responses(
        (status = 200, description = "Course content with per-lesson completion"),
        (status = 403, description = "No active enrollment"),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler]
pub async fn course_detail(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let course = state.course_service.get_by_slug(&slug, false).await?;
    state
        .enrollment_service
        .require_active(user_id, course.id)
        .await?;

    let outline = state.course_service.outline(course).await?;
    let lesson_ids: Vec<Uuid> = outline
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter().map(|l| l.id))
        .collect();
    let completed = state
        .progress_service
        .completed_lesson_ids(user_id, &lesson_ids)
        .await?;

    let mut modules = Vec::with_capacity(outline.modules.len());
    for module in outline.modules {
        let quiz = match module.quiz {
            Some(quiz_outline) => {
                let latest = state
                    .attempt_service
                    .latest_attempt(user_id, quiz_outline.quiz.id)
                    .await?;
                Some(StudentQuizSummary {
                    id: quiz_outline.quiz.id,
                    title: quiz_outline.quiz.title,
                    question_count: quiz_outline.questions.len(),
                    latest_attempt: latest.map(Into::into),
                })
            }
            None => None,
        };

        modules.push(StudentModuleOutline {
            id: module.module.id,
            title: module.module.title,
            position: module.module.position,
            lessons: module
                .lessons
                .into_iter()
                .map(|l| StudentLesson {
                    completed: completed.contains(&l.id),
                    id: l.id,
                    module_id: l.module_id,
                    title: l.title,
                    content: l.content,
                    position: l.position,
                })
                .collect(),
            quiz,
        });
    }

    let progress = state
        .progress_service
        .course_progress(user_id, outline.course.id)
        .await?;

    Ok(Json(StudentCourseDetail {
        id: outline.course.id,
        title: outline.course.title,
        slug: outline.course.slug,
        short_description: outline.course.short_description,
        full_description: outline.course.full_description,
        level: outline.course.level,
        estimated_duration: outline.course.estimated_duration,
        tags: outline.course.tags,
        thumbnail: outline.course.thumbnail,
        progress: progress.into(),
        modules,
    }))
}

#[utoipa::path(
    post,
    path = "/api/me/lessons/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Lesson ID")
    ),
    responses(
        (status = 200, description = "Lesson marked complete"),
        (status = 403, description = "No active enrollment"),
        (status = 404, description = "Lesson not found")
    )
)]
#[axum::debug_handler]
pub async fn complete_lesson(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let course_id = state.progress_service.course_of_lesson(lesson_id).await?;
    state
        .enrollment_service
        .require_active(user_id, course_id)
        .await?;

    state
        .progress_service
        .mark_complete(user_id, lesson_id)
        .await?;
    let progress = state
        .progress_service
        .course_progress(user_id, course_id)
        .await?;
    Ok(Json(ProgressResponse::from(progress)))
}

#[utoipa::path(
    get,
    path = "/api/me/progress/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Completion percentage for the course")
    )
)]
#[axum::debug_handler]
pub async fn course_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let progress = state
        .progress_service
        .course_progress(claims.user_id()?, course_id)
        .await?;
    Ok(Json(ProgressResponse::from(progress)))
}

#[utoipa::path(
    get,
    path = "/api/me/quizzes/{id}",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Quiz questions without the answer key"),
        (status = 403, description = "No active enrollment"),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let course_id = state.attempt_service.course_of_quiz(quiz_id).await?;
    state
        .enrollment_service
        .require_active(user_id, course_id)
        .await?;

    let quiz = state.attempt_service.quiz_by_id(quiz_id).await?;
    let questions = state.attempt_service.quiz_questions(quiz_id).await?;

    Ok(Json(QuizForTaking {
        id: quiz.id,
        module_id: quiz.module_id,
        title: quiz.title,
        questions: questions.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/me/quizzes/{id}/attempts",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    request_body = SubmitQuizPayload,
    responses(
        (status = 201, description = "Graded attempt with per-question detail"),
        (status = 403, description = "No active enrollment"),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<SubmitQuizPayload>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let course_id = state.attempt_service.course_of_quiz(quiz_id).await?;
    state
        .enrollment_service
        .require_active(user_id, course_id)
        .await?;

    let answers: Vec<SubmittedAnswer> = payload
        .answers
        .into_iter()
        .map(|a| SubmittedAnswer {
            question_id: a.question_id,
            selected_answer: a.selected_answer,
        })
        .collect();

    let outcome = state
        .attempt_service
        .submit(user_id, quiz_id, answers)
        .await?;

    // A pass may be the last missing gate; the issue call is a no-op when the
    // other gates are still open or a certificate already exists.
    if outcome.attempt.passed {
        state
            .certificate_service
            .check_and_issue(user_id, outcome.course_id)
            .await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(QuizAttemptResponse::from_parts(
            outcome.attempt,
            outcome.answers,
        )),
    ))
}

#[axum::debug_handler]
pub async fn quiz_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let attempts = state
        .attempt_service
        .attempts_for_quiz(claims.user_id()?, quiz_id)
        .await?;
    let summaries: Vec<QuizAttemptSummary> = attempts.into_iter().map(Into::into).collect();
    Ok(Json(summaries))
}

#[axum::debug_handler]
pub async fn latest_quiz_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let attempt = state
        .attempt_service
        .latest_attempt(user_id, quiz_id)
        .await?
        .ok_or_else(|| Error::NotFound("No attempts for this quiz".to_string()))?;
    let answers = state.attempt_service.answers_for_attempt(attempt.id).await?;
    Ok(Json(QuizAttemptResponse::from_parts(attempt, answers)))
}

#[axum::debug_handler]
pub async fn get_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    state
        .enrollment_service
        .require_active(user_id, course_id)
        .await?;
    let note = state
        .note_service
        .get(user_id, course_id)
        .await?
        .ok_or_else(|| Error::NotFound("No note for this course".to_string()))?;
    Ok(Json(NoteResponse::from(note)))
}

#[axum::debug_handler]
pub async fn put_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<NotePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    state
        .enrollment_service
        .require_active(user_id, course_id)
        .await?;
    let note = state
        .note_service
        .upsert(user_id, course_id, &payload.content)
        .await?;
    Ok(Json(NoteResponse::from(note)))
}

#[axum::debug_handler]
pub async fn certificates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let certificates: Vec<CertificateResponse> = state
        .certificate_service
        .list_for_user(claims.user_id()?)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(certificates))
}

#[axum::debug_handler]
pub async fn orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let orders: Vec<OrderResponse> = state
        .enrollment_service
        .orders_for_user(claims.user_id()?)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(orders))
}
