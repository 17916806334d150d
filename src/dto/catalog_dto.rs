use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::course::Course;
use crate::services::course_service::{CourseList, CourseOutline};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PublicCourseQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub level: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicCourseSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub price: i32,
    pub level: String,
    pub estimated_duration: Option<String>,
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
    pub featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicCourseListResponse {
    pub items: Vec<PublicCourseSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicLessonSummary {
    pub id: Uuid,
    pub title: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicModuleOutline {
    pub id: Uuid,
    pub title: String,
    pub position: i32,
    pub lessons: Vec<PublicLessonSummary>,
    pub has_quiz: bool,
}

/// Catalogue detail: curriculum shape only, never lesson content or
/// question data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicCourseDetail {
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
    pub featured: bool,
    pub modules: Vec<PublicModuleOutline>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicStatsResponse {
    pub courses: i64,
    pub students: i64,
    pub certificates: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactPayload {
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3))]
    pub subject: String,
    #[validate(length(min = 10))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmissionResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for PublicCourseSummary {
    fn from(value: Course) -> Self {
        Self {
            id: value.id,
            title: value.title,
            slug: value.slug,
            short_description: value.short_description,
            price: value.price,
            level: value.level,
            estimated_duration: value.estimated_duration,
            tags: value.tags,
            thumbnail: value.thumbnail,
            featured: value.featured,
        }
    }
}

impl From<CourseList> for PublicCourseListResponse {
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

impl From<CourseOutline> for PublicCourseDetail {
    fn from(value: CourseOutline) -> Self {
        let modules = value
            .modules
            .into_iter()
            .map(|m| PublicModuleOutline {
                id: m.module.id,
                title: m.module.title,
                position: m.module.position,
                lessons: m
                    .lessons
                    .into_iter()
                    .map(|l| PublicLessonSummary {
                        id: l.id,
                        title: l.title,
                        position: l.position,
                    })
                    .collect(),
                has_quiz: m.quiz.is_some(),
            })
            .collect();

        Self {
            id: value.course.id,
            title: value.course.title,
            slug: value.course.slug,
            short_description: value.course.short_description,
            full_description: value.course.full_description,
            price: value.course.price,
            level: value.course.level,
            estimated_duration: value.course.estimated_duration,
            tags: value.course.tags,
            thumbnail: value.course.thumbnail,
            featured: value.course.featured,
            modules,
        }
    }
}

impl From<crate::models::contact::ContactSubmission> for ContactSubmissionResponse {
    fn from(value: crate::models::contact::ContactSubmission) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            subject: value.subject,
            message: value.message,
            created_at: value.created_at,
        }
    }
}
