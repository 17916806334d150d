use sqlx::PgPool;
use tracing::info;

use crate::dto::catalog_dto::ContactPayload;
use crate::error::Result;
use crate::models::contact::ContactSubmission;

#[derive(Clone)]
pub struct ContactService {
    pool: PgPool,
}

impl ContactService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn submit(&self, payload: ContactPayload) -> Result<ContactSubmission> {
        let submission = sqlx::query_as::<_, ContactSubmission>(
            "INSERT INTO contact_submissions (name, email, subject, message)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, subject, message, created_at",
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.subject)
        .bind(&payload.message)
        .fetch_one(&self.pool)
        .await?;

        info!(submission_id = %submission.id, "contact form submitted");
        Ok(submission)
    }

    pub async fn list(&self, limit: i64) -> Result<Vec<ContactSubmission>> {
        let limit = if limit <= 0 { 100 } else { limit.min(500) };
        let submissions = sqlx::query_as::<_, ContactSubmission>(
            "SELECT id, name, email, subject, message, created_at
             FROM contact_submissions
             ORDER BY created_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }
}
