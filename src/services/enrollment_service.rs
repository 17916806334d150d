use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::dto::admin_dto::EnrollmentListQuery;
use crate::error::{Error, Result};
use crate::models::course::Course;
use crate::models::enrollment::{Enrollment, STATUS_ACTIVE, STATUS_REVOKED};
use crate::models::order::Order;

#[derive(Clone)]
pub struct EnrollmentService {
    pool: PgPool,
}

/// Enrollment row joined with the student, course, and granting admin for
/// back-office display.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EnrollmentWithDetails {
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

pub struct EnrollmentList {
    pub items: Vec<EnrollmentWithDetails>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

const ENROLLMENT_COLUMNS: &str =
    "id, user_id, course_id, status, completed_at, granted_by, created_at, updated_at";

const DETAIL_SELECT: &str = "SELECT e.id, e.user_id, e.course_id, e.status, e.completed_at, e.created_at,
            u.name AS user_name, u.username AS user_username,
            c.title AS course_title, c.slug AS course_slug,
            g.name AS granted_by_name
     FROM enrollments e
     JOIN users u ON u.id = e.user_id
     JOIN courses c ON c.id = e.course_id
     LEFT JOIN users g ON g.id = e.granted_by";

impl EnrollmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grants course access: reactivates a revoked enrollment or creates a new
    /// one, and records the provisioning as an Order. An already-active
    /// enrollment is an error.
    pub async fn provision(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        course_id: Uuid,
        amount: i32,
        notes: Option<String>,
    ) -> Result<(Enrollment, Order)> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Course not found".to_string()))?;

        let existing = sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2"
        ))
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        let enrollment = match existing {
            Some(enrollment) if enrollment.status == STATUS_ACTIVE => {
                return Err(Error::BadRequest(
                    "Student already has active access to this course".to_string(),
                ));
            }
            Some(enrollment) => {
                sqlx::query_as::<_, Enrollment>(&format!(
                    "UPDATE enrollments
                     SET status = $2, granted_by = $3, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {ENROLLMENT_COLUMNS}"
                ))
                .bind(enrollment.id)
                .bind(STATUS_ACTIVE)
                .bind(admin_id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Enrollment>(&format!(
                    "INSERT INTO enrollments (user_id, course_id, status, granted_by)
                     VALUES ($1, $2, $3, $4)
                     RETURNING {ENROLLMENT_COLUMNS}"
                ))
                .bind(user_id)
                .bind(course_id)
                .bind(STATUS_ACTIVE)
                .bind(admin_id)
                .fetch_one(&self.pool)
                .await?
            }
        };

        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (user_id, course_id, amount, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, course_id, amount, status, notes, created_at",
        )
        .bind(user_id)
        .bind(course_id)
        .bind(amount)
        .bind(&notes)
        .fetch_one(&self.pool)
        .await?;

        info!(
            admin_id = %admin_id,
            user_id = %user_id,
            course_id = %course_id,
            amount,
            "course access provisioned"
        );

        Ok((enrollment, order))
    }

    pub async fn revoke(&self, id: Uuid) -> Result<Enrollment> {
        self.set_status(id, STATUS_REVOKED).await
    }

    pub async fn restore(&self, id: Uuid) -> Result<Enrollment> {
        self.set_status(id, STATUS_ACTIVE).await
    }

    async fn set_status(&self, id: Uuid, status: &str) -> Result<Enrollment> {
        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "UPDATE enrollments SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        info!(enrollment_id = %id, status, "enrollment status changed");
        Ok(enrollment)
    }

    pub async fn list(&self, query: EnrollmentListQuery) -> Result<EnrollmentList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(course_id) = query.course_id {
            filters.push(format!("e.course_id::text = ${}", args.len() + 1));
            args.push(course_id.to_string());
        }
        if let Some(status) = query.status {
            filters.push(format!("e.status = ${}", args.len() + 1));
            args.push(status);
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let items_query = format!(
            "{DETAIL_SELECT}
             {}
             ORDER BY e.created_at DESC
             LIMIT ${} OFFSET ${}",
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM enrollments e {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, EnrollmentWithDetails>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        items_statement = items_statement.bind(per_page).bind(offset);
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i64;

        Ok(EnrollmentList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<EnrollmentWithDetails>> {
        let limit = if limit <= 0 { 10 } else { limit.min(50) };
        let items = sqlx::query_as::<_, EnrollmentWithDetails>(&format!(
            "{DETAIL_SELECT}
             ORDER BY e.created_at DESC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn active_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS}
             FROM enrollments
             WHERE user_id = $1 AND course_id = $2 AND status = 'ACTIVE'"
        ))
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enrollment)
    }

    /// Gate in front of every student content operation: reading course
    /// content, marking lessons, submitting quizzes, notes.
    pub async fn require_active(&self, user_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
        self.active_enrollment(user_id, course_id)
            .await?
            .ok_or_else(|| Error::Forbidden("No active access to this course".to_string()))
    }

    pub async fn enrolled_courses(&self, user_id: Uuid) -> Result<Vec<(Enrollment, Course)>> {
        let rows = sqlx::query_as::<_, EnrolledCourseRow>(
            "SELECT e.id AS enrollment_id, e.user_id, e.course_id, e.status, e.completed_at,
                    e.granted_by, e.created_at AS enrolled_at, e.updated_at AS enrollment_updated_at,
                    c.id, c.title, c.slug, c.short_description, c.full_description, c.price,
                    c.level, c.estimated_duration, c.tags, c.thumbnail, c.published, c.featured,
                    c.created_at, c.updated_at
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             WHERE e.user_id = $1
             ORDER BY e.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EnrolledCourseRow::into_pair).collect())
    }

    pub async fn enrollments_for_user(&self, user_id: Uuid) -> Result<Vec<EnrollmentWithDetails>> {
        let items = sqlx::query_as::<_, EnrollmentWithDetails>(&format!(
            "{DETAIL_SELECT}
             WHERE e.user_id = $1
             ORDER BY e.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT id, user_id, course_id, amount, status, notes, created_at
             FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}

#[derive(FromRow)]
struct EnrolledCourseRow {
    enrollment_id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    status: String,
    completed_at: Option<DateTime<Utc>>,
    granted_by: Option<Uuid>,
    enrolled_at: DateTime<Utc>,
    enrollment_updated_at: DateTime<Utc>,
    id: Uuid,
    title: String,
    slug: String,
    short_description: Option<String>,
    full_description: Option<String>,
    price: i32,
    level: String,
    estimated_duration: Option<String>,
    tags: Vec<String>,
    thumbnail: Option<String>,
    published: bool,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EnrolledCourseRow {
    fn into_pair(self) -> (Enrollment, Course) {
        (
            Enrollment {
                id: self.enrollment_id,
                user_id: self.user_id,
                course_id: self.course_id,
                status: self.status,
                completed_at: self.completed_at,
                granted_by: self.granted_by,
                created_at: self.enrolled_at,
                updated_at: self.enrollment_updated_at,
            },
            Course {
                id: self.id,
                title: self.title,
                slug: self.slug,
                short_description: self.short_description,
                full_description: self.full_description,
                price: self.price,
                level: self.level,
                estimated_duration: self.estimated_duration,
                tags: self.tags,
                thumbnail: self.thumbnail,
                published: self.published,
                featured: self.featured,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        )
    }
}
