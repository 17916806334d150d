use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::attempt::{AttemptAnswer, QuizAttempt};
use crate::models::course::Course;
use crate::models::enrollment::Enrollment;
use crate::models::note::Note;
use crate::models::order::Order;
use crate::models::question::Question;
use crate::services::certificate_service::CertificateWithCourse;
use crate::services::progress_service::CourseProgress;

use super::catalog_dto::PublicCourseSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAnswerPayload {
    pub question_id: Uuid,
    #[serde(default)]
    pub selected_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizPayload {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswerPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptAnswerResponse {
    pub question_id: Uuid,
    pub selected_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttemptResponse {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub grade: String,
    pub passed: bool,
    pub is_override: bool,
    pub created_at: DateTime<Utc>,
    pub answers: Vec<AttemptAnswerResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttemptSummary {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub grade: String,
    pub passed: bool,
    pub is_override: bool,
    pub created_at: DateTime<Utc>,
}

/// Question as shown to a student taking the quiz: no answer key, no
/// explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentQuestion {
    pub id: Uuid,
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizForTaking {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub questions: Vec<StudentQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub completed: i64,
    pub total: i64,
    pub percentage: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentLesson {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub content: String,
    pub position: i32,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentQuizSummary {
    pub id: Uuid,
    pub title: String,
    pub question_count: usize,
    pub latest_attempt: Option<QuizAttemptSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentModuleOutline {
    pub id: Uuid,
    pub title: String,
    pub position: i32,
    pub lessons: Vec<StudentLesson>,
    pub quiz: Option<StudentQuizSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentCourseDetail {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub level: String,
    pub estimated_duration: Option<String>,
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
    pub progress: ProgressResponse,
    pub modules: Vec<StudentModuleOutline>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolledCourseResponse {
    pub enrollment_id: Uuid,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub enrolled_at: DateTime<Utc>,
    pub course: PublicCourseSummary,
    pub progress: ProgressResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotePayload {
    #[validate(length(max = 20000))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub course_slug: String,
    pub certificate_number: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub amount: i32,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDashboardResponse {
    pub courses: Vec<EnrolledCourseResponse>,
    pub certificates: Vec<CertificateResponse>,
    pub recent_attempts: Vec<QuizAttemptSummary>,
}

impl From<AttemptAnswer> for AttemptAnswerResponse {
    fn from(value: AttemptAnswer) -> Self {
        Self {
            question_id: value.question_id,
            selected_answer: value.selected_answer,
            is_correct: value.is_correct,
        }
    }
}

impl QuizAttemptResponse {
    pub fn from_parts(attempt: QuizAttempt, answers: Vec<AttemptAnswer>) -> Self {
        Self {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            score: attempt.score,
            grade: attempt.grade,
            passed: attempt.passed,
            is_override: attempt.is_override,
            created_at: attempt.created_at,
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<QuizAttempt> for QuizAttemptSummary {
    fn from(value: QuizAttempt) -> Self {
        Self {
            id: value.id,
            quiz_id: value.quiz_id,
            score: value.score,
            grade: value.grade,
            passed: value.passed,
            is_override: value.is_override,
            created_at: value.created_at,
        }
    }
}

impl From<Question> for StudentQuestion {
    fn from(value: Question) -> Self {
        Self {
            id: value.id,
            text: value.text,
            option_a: value.option_a,
            option_b: value.option_b,
            option_c: value.option_c,
            option_d: value.option_d,
            position: value.position,
        }
    }
}

impl From<CourseProgress> for ProgressResponse {
    fn from(value: CourseProgress) -> Self {
        Self {
            completed: value.completed,
            total: value.total,
            percentage: value.percentage,
        }
    }
}

impl EnrolledCourseResponse {
    pub fn from_parts(enrollment: Enrollment, course: Course, progress: CourseProgress) -> Self {
        Self {
            enrollment_id: enrollment.id,
            status: enrollment.status,
            completed_at: enrollment.completed_at,
            enrolled_at: enrollment.created_at,
            course: course.into(),
            progress: progress.into(),
        }
    }
}

impl From<Note> for NoteResponse {
    fn from(value: Note) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            content: value.content,
            updated_at: value.updated_at,
        }
    }
}

impl From<CertificateWithCourse> for CertificateResponse {
    fn from(value: CertificateWithCourse) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            course_title: value.course_title,
            course_slug: value.course_slug,
            certificate_number: value.certificate_number,
            issued_at: value.issued_at,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(value: Order) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            amount: value.amount,
            status: value.status,
            notes: value.notes,
            created_at: value.created_at,
        }
    }
}
