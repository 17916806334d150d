use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::certificate::Certificate;
use crate::services::attempt_service::AttemptService;
use crate::utils::certificate::generate_certificate_number;

#[derive(Clone)]
pub struct CertificateService {
    pool: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CertificateWithCourse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub certificate_number: String,
    pub issued_at: DateTime<Utc>,
    pub course_title: String,
    pub course_slug: String,
}

#[derive(Debug, Clone)]
pub struct OverrideOutcome {
    pub lessons_completed: u64,
    pub quizzes_passed: usize,
    pub certificate: Certificate,
}

impl CertificateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issues a certificate once every completion gate holds. A gate that does
    /// not hold is a normal "not yet eligible" outcome, never an error.
    pub async fn check_and_issue(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Certificate>> {
        let lesson_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT l.id
             FROM lessons l
             JOIN modules m ON m.id = l.module_id
             WHERE m.course_id = $1",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        if !lesson_ids.is_empty() {
            let completed = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM lesson_progress WHERE user_id = $1 AND lesson_id = ANY($2)",
            )
            .bind(user_id)
            .bind(&lesson_ids)
            .fetch_one(&self.pool)
            .await?;

            if completed < lesson_ids.len() as i64 {
                return Ok(None);
            }
        }

        let quiz_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT q.id
             FROM quizzes q
             JOIN modules m ON m.id = q.module_id
             WHERE m.course_id = $1",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        // Only the most recent attempt counts: a failing retake after an
        // earlier pass revokes eligibility until passed again.
        for quiz_id in quiz_ids {
            let latest_passed = sqlx::query_scalar::<_, bool>(
                "SELECT passed
                 FROM quiz_attempts
                 WHERE user_id = $1 AND quiz_id = $2
                 ORDER BY created_at DESC
                 LIMIT 1",
            )
            .bind(user_id)
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await?;

            if !latest_passed.unwrap_or(false) {
                return Ok(None);
            }
        }

        let number = generate_certificate_number();
        let inserted = sqlx::query_as::<_, Certificate>(
            "INSERT INTO certificates (user_id, course_id, certificate_number)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, course_id) DO NOTHING
             RETURNING id, user_id, course_id, certificate_number, issued_at",
        )
        .bind(user_id)
        .bind(course_id)
        .bind(&number)
        .fetch_optional(&self.pool)
        .await?;

        // No row back means a certificate already existed, possibly written by
        // a racing submission. Either way there is nothing more to do.
        let Some(certificate) = inserted else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE enrollments
             SET completed_at = NOW(), updated_at = NOW()
             WHERE user_id = $1 AND course_id = $2 AND status = 'ACTIVE'",
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        info!(
            user_id = %user_id,
            course_id = %course_id,
            certificate_number = %certificate.certificate_number,
            "certificate issued"
        );

        Ok(Some(certificate))
    }

    /// Admin bypass of every completion gate: marks all lessons done, records
    /// passing override attempts for quizzes that have questions, ensures a
    /// certificate exists, and stamps completion on all enrollments for the
    /// pair regardless of status.
    pub async fn override_complete(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        course_id: Uuid,
        attempts: &AttemptService,
    ) -> Result<OverrideOutcome> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Course not found".to_string()))?;

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        let lessons_completed = sqlx::query(
            "INSERT INTO lesson_progress (user_id, lesson_id)
             SELECT $1, l.id
             FROM lessons l
             JOIN modules m ON m.id = l.module_id
             WHERE m.course_id = $2
             ON CONFLICT (user_id, lesson_id) DO UPDATE SET completed_at = NOW()",
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let quiz_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT q.id
             FROM quizzes q
             JOIN modules m ON m.id = q.module_id
             WHERE m.course_id = $1",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let mut quizzes_passed = 0;
        for quiz_id in quiz_ids {
            let questions = attempts.quiz_questions(quiz_id).await?;
            if questions.is_empty() {
                continue;
            }
            attempts
                .record_override_pass(user_id, quiz_id, &questions)
                .await?;
            quizzes_passed += 1;
        }

        let inserted = sqlx::query_as::<_, Certificate>(
            "INSERT INTO certificates (user_id, course_id, certificate_number)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, course_id) DO NOTHING
             RETURNING id, user_id, course_id, certificate_number, issued_at",
        )
        .bind(user_id)
        .bind(course_id)
        .bind(generate_certificate_number())
        .fetch_optional(&self.pool)
        .await?;

        let certificate = match inserted {
            Some(certificate) => certificate,
            None => {
                sqlx::query_as::<_, Certificate>(
                    "SELECT id, user_id, course_id, certificate_number, issued_at
                     FROM certificates
                     WHERE user_id = $1 AND course_id = $2",
                )
                .bind(user_id)
                .bind(course_id)
                .fetch_one(&self.pool)
                .await?
            }
        };

        sqlx::query(
            "UPDATE enrollments
             SET completed_at = NOW(), updated_at = NOW()
             WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        info!(
            admin_id = %admin_id,
            user_id = %user_id,
            course_id = %course_id,
            lessons = lessons_completed,
            quizzes = quizzes_passed,
            "course force-completed by administrator"
        );

        Ok(OverrideOutcome {
            lessons_completed,
            quizzes_passed,
            certificate,
        })
    }

    pub async fn revoke(&self, certificate_id: Uuid) -> Result<()> {
        let removed = sqlx::query_as::<_, (Uuid, Uuid)>(
            "DELETE FROM certificates WHERE id = $1 RETURNING user_id, course_id",
        )
        .bind(certificate_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((user_id, course_id)) = removed else {
            return Err(Error::NotFound("Certificate not found".to_string()));
        };

        sqlx::query(
            "UPDATE enrollments
             SET completed_at = NULL, updated_at = NOW()
             WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        info!(
            certificate_id = %certificate_id,
            user_id = %user_id,
            course_id = %course_id,
            "certificate revoked"
        );

        Ok(())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CertificateWithCourse>> {
        let certificates = sqlx::query_as::<_, CertificateWithCourse>(
            "SELECT c.id, c.user_id, c.course_id, c.certificate_number, c.issued_at,
                    co.title AS course_title, co.slug AS course_slug
             FROM certificates c
             JOIN courses co ON co.id = c.course_id
             WHERE c.user_id = $1
             ORDER BY c.issued_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(certificates)
    }
}
