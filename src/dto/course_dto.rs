use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::trim_optional_string;
use crate::models::course::Course;
use crate::models::lesson::Lesson;
use crate::models::module::CourseModule;
use crate::models::question::Question;
use crate::services::course_service::{CourseList, CourseOutline, ModuleOutline, QuizOutline};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCoursePayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub slug: String,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub full_description: Option<String>,
    pub price: Option<i32>,
    pub level: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub estimated_duration: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCoursePayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub full_description: Option<String>,
    pub price: Option<i32>,
    pub level: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub estimated_duration: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub thumbnail: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub level: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub price: i32,
    pub level: String,
    pub estimated_duration: Option<String>,
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseListResponse {
    pub items: Vec<CourseResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateModulePayload {
    #[validate(length(min = 1))]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateModulePayload {
    #[validate(length(min = 1))]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReorderPayload {
    #[validate(length(min = 1))]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLessonPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateLessonPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertQuizPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonResponse {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub content: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub questions: Vec<QuestionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOutlineResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
    pub lessons: Vec<LessonResponse>,
    pub quiz: Option<QuizResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOutlineResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub modules: Vec<ModuleOutlineResponse>,
}

impl From<Course> for CourseResponse {
    fn from(value: Course) -> Self {
        Self {
            id: value.id,
            title: value.title,
            slug: value.slug,
            short_description: value.short_description,
            full_description: value.full_description,
            price: value.price,
            level: value.level,
            estimated_duration: value.estimated_duration,
            tags: value.tags,
            thumbnail: value.thumbnail,
            published: value.published,
            featured: value.featured,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<CourseList> for CourseListResponse {
    fn from(value: CourseList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

impl From<CourseModule> for ModuleResponse {
    fn from(value: CourseModule) -> Self {
        Self {
            id: value.id,
            course_id: value.course_id,
            title: value.title,
            position: value.position,
        }
    }
}

impl From<Lesson> for LessonResponse {
    fn from(value: Lesson) -> Self {
        Self {
            id: value.id,
            module_id: value.module_id,
            title: value.title,
            content: value.content,
            position: value.position,
        }
    }
}

impl From<Question> for QuestionResponse {
    fn from(value: Question) -> Self {
        Self {
            id: value.id,
            quiz_id: value.quiz_id,
            text: value.text,
            option_a: value.option_a,
            option_b: value.option_b,
            option_c: value.option_c,
            option_d: value.option_d,
            correct_answer: value.correct_answer,
            explanation: value.explanation,
            position: value.position,
        }
    }
}

impl From<QuizOutline> for QuizResponse {
    fn from(value: QuizOutline) -> Self {
        Self {
            id: value.quiz.id,
            module_id: value.quiz.module_id,
            title: value.quiz.title,
            questions: value.questions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ModuleOutline> for ModuleOutlineResponse {
    fn from(value: ModuleOutline) -> Self {
        Self {
            id: value.module.id,
            course_id: value.module.course_id,
            title: value.module.title,
            position: value.module.position,
            lessons: value.lessons.into_iter().map(Into::into).collect(),
            quiz: value.quiz.map(Into::into),
        }
    }
}

impl From<CourseOutline> for CourseOutlineResponse {
    fn from(value: CourseOutline) -> Self {
        Self {
            course: value.course.into(),
            modules: value.modules.into_iter().map(Into::into).collect(),
        }
    }
}
