use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::auth_dto::UserResponse;
use super::learning_dto::{CertificateResponse, OrderResponse};
use crate::models::certificate::Certificate;
use crate::models::enrollment::Enrollment;
use crate::models::order::Order;
use crate::services::certificate_service::OverrideOutcome;
use crate::services::enrollment_service::{EnrollmentList, EnrollmentWithDetails};
use crate::services::user_service::UserList;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(length(min = 3, max = 20))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(length(min = 2))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub role: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub items: Vec<UserResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub enrollments: Vec<EnrollmentDetailResponse>,
    pub certificates: Vec<CertificateResponse>,
    pub orders: Vec<OrderResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProvisionPayload {
    pub user_id: Uuid,
    pub course_id: Uuid,
    #[serde(default)]
    pub amount: i32,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionResponse {
    pub enrollment: EnrollmentResponse,
    pub order: OrderResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub granted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EnrollmentListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub course_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentDetailResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_username: String,
    pub course_title: String,
    pub course_slug: String,
    pub granted_by_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentListResponse {
    pub items: Vec<EnrollmentDetailResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTemplatePayload {
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendTemplatePayload {
    #[validate(email)]
    pub recipient: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentEmailResponse {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToggleLessonPayload {
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverrideResponse {
    pub lessons_completed: u64,
    pub quizzes_passed: usize,
    pub certificate_id: Uuid,
    pub certificate_number: String,
    pub issued_at: DateTime<Utc>,
}

impl From<UserList> for UserListResponse {
    fn from(value: UserList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(value: Enrollment) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            course_id: value.course_id,
            status: value.status,
            completed_at: value.completed_at,
            granted_by: value.granted_by,
            created_at: value.created_at,
        }
    }
}

impl From<(Enrollment, Order)> for ProvisionResponse {
    fn from((enrollment, order): (Enrollment, Order)) -> Self {
        Self {
            enrollment: enrollment.into(),
            order: order.into(),
        }
    }
}

impl From<EnrollmentWithDetails> for EnrollmentDetailResponse {
    fn from(value: EnrollmentWithDetails) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            course_id: value.course_id,
            status: value.status,
            completed_at: value.completed_at,
            created_at: value.created_at,
            user_name: value.user_name,
            user_username: value.user_username,
            course_title: value.course_title,
            course_slug: value.course_slug,
            granted_by_name: value.granted_by_name,
        }
    }
}

impl From<EnrollmentList> for EnrollmentListResponse {
    fn from(value: EnrollmentList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

impl OverrideResponse {
    pub fn from_outcome(value: OverrideOutcome) -> Self {
        let Certificate {
            id,
            certificate_number,
            issued_at,
            ..
        } = value.certificate;
        Self {
            lessons_completed: value.lessons_completed,
            quizzes_passed: value.quizzes_passed,
            certificate_id: id,
            certificate_number,
            issued_at,
        }
    }
}
