use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::note::Note;

/// One free-text note per (student, course), upserted on save.
#[derive(Clone)]
pub struct NoteService {
    pool: PgPool,
}

impl NoteService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT id, user_id, course_id, content, created_at, updated_at
             FROM notes
             WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    pub async fn upsert(&self, user_id: Uuid, course_id: Uuid, content: &str) -> Result<Note> {
        let note = sqlx::query_as::<_, Note>(
            "INSERT INTO notes (user_id, course_id, content)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, course_id)
                 DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()
             RETURNING id, user_id, course_id, content, created_at, updated_at",
        )
        .bind(user_id)
        .bind(course_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }
}
