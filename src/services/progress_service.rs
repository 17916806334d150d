use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::progress::LessonProgress;

#[derive(Clone)]
pub struct ProgressService {
    pool: PgPool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub completed: i64,
    pub total: i64,
    pub percentage: i32,
}

impl ProgressService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn course_of_lesson(&self, lesson_id: Uuid) -> Result<Uuid> {
        let course_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT m.course_id
             FROM lessons l
             JOIN modules m ON m.id = l.module_id
             WHERE l.id = $1",
        )
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;

        course_id.ok_or_else(|| Error::NotFound("Lesson not found".to_string()))
    }

    /// Idempotent: completing an already-completed lesson refreshes the timestamp.
    pub async fn mark_complete(&self, user_id: Uuid, lesson_id: Uuid) -> Result<LessonProgress> {
        let progress = sqlx::query_as::<_, LessonProgress>(
            "INSERT INTO lesson_progress (user_id, lesson_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, lesson_id) DO UPDATE SET completed_at = NOW()
             RETURNING id, user_id, lesson_id, completed_at",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(progress)
    }

    pub async fn set_complete(&self, user_id: Uuid, lesson_id: Uuid, complete: bool) -> Result<()> {
        if complete {
            self.mark_complete(user_id, lesson_id).await?;
        } else {
            sqlx::query("DELETE FROM lesson_progress WHERE user_id = $1 AND lesson_id = $2")
                .bind(user_id)
                .bind(lesson_id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    pub async fn completed_lesson_ids(
        &self,
        user_id: Uuid,
        lesson_ids: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        if lesson_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT lesson_id FROM lesson_progress WHERE user_id = $1 AND lesson_id = ANY($2)",
        )
        .bind(user_id)
        .bind(lesson_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    pub async fn course_progress(&self, user_id: Uuid, course_id: Uuid) -> Result<CourseProgress> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)
             FROM lessons l
             JOIN modules m ON m.id = l.module_id
             WHERE m.course_id = $1",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        if total == 0 {
            return Ok(CourseProgress {
                completed: 0,
                total: 0,
                percentage: 0,
            });
        }

        let completed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)
             FROM lesson_progress p
             JOIN lessons l ON l.id = p.lesson_id
             JOIN modules m ON m.id = l.module_id
             WHERE p.user_id = $1 AND m.course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(CourseProgress {
            completed,
            total,
            percentage: Self::percentage(completed, total),
        })
    }

    pub fn percentage(completed: i64, total: i64) -> i32 {
        if total == 0 {
            return 0;
        }
        ((completed as f64 / total as f64) * 100.0).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_of_empty_course_is_zero() {
        assert_eq!(ProgressService::percentage(0, 0), 0);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(ProgressService::percentage(1, 3), 33);
        assert_eq!(ProgressService::percentage(2, 3), 67);
        assert_eq!(ProgressService::percentage(5, 5), 100);
        assert_eq!(ProgressService::percentage(0, 8), 0);
    }
}
