use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::attempt::{AttemptAnswer, QuizAttempt};
use crate::models::question::Question;
use crate::models::quiz::Quiz;
use crate::services::grading_service::{GradingService, SubmittedAnswer};

#[derive(Clone)]
pub struct AttemptService {
    pool: PgPool,
}

/// A persisted attempt together with its answer rows and the owning course.
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub attempt: QuizAttempt,
    pub answers: Vec<AttemptAnswer>,
    pub course_id: Uuid,
}

impl AttemptService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn course_of_quiz(&self, quiz_id: Uuid) -> Result<Uuid> {
        let course_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT m.course_id
             FROM quizzes q
             JOIN modules m ON m.id = q.module_id
             WHERE q.id = $1",
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        course_id.ok_or_else(|| Error::NotFound("Quiz not found".to_string()))
    }

    pub async fn quiz_by_id(&self, quiz_id: Uuid) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(
            "SELECT id, module_id, title, created_at, updated_at FROM quizzes WHERE id = $1",
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        quiz.ok_or_else(|| Error::NotFound("Quiz not found".to_string()))
    }

    pub async fn quiz_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, quiz_id, text, option_a, option_b, option_c, option_d,
                    correct_answer, explanation, position, created_at
             FROM questions
             WHERE quiz_id = $1
             ORDER BY position ASC",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Grades and records a new attempt. Prior attempts are never mutated, so
    /// the full retake history stays queryable.
    pub async fn submit(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
        answers: Vec<SubmittedAnswer>,
    ) -> Result<AttemptOutcome> {
        let course_id = self.course_of_quiz(quiz_id).await?;
        let questions = self.quiz_questions(quiz_id).await?;

        let graded = GradingService::grade_submission(&questions, &answers);

        // Answers naming questions outside this quiz are graded incorrect but
        // cannot be stored against a foreign key they do not satisfy.
        let storable: Vec<_> = graded
            .answers
            .iter()
            .filter(|a| questions.iter().any(|q| q.id == a.question_id))
            .collect();

        let mut tx = self.pool.begin().await?;

        let attempt = sqlx::query_as::<_, QuizAttempt>(
            "INSERT INTO quiz_attempts (user_id, quiz_id, score, grade, passed, is_override)
             VALUES ($1, $2, $3, $4, $5, FALSE)
             RETURNING id, user_id, quiz_id, score, grade, passed, is_override, created_at",
        )
        .bind(user_id)
        .bind(quiz_id)
        .bind(graded.score)
        .bind(&graded.grade)
        .bind(graded.passed)
        .fetch_one(&mut *tx)
        .await?;

        let mut rows = Vec::with_capacity(storable.len());
        for answer in storable {
            let row = sqlx::query_as::<_, AttemptAnswer>(
                "INSERT INTO attempt_answers (attempt_id, question_id, selected_answer, is_correct)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, attempt_id, question_id, selected_answer, is_correct",
            )
            .bind(attempt.id)
            .bind(answer.question_id)
            .bind(&answer.selected_answer)
            .bind(answer.is_correct)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;

        info!(
            attempt_id = %attempt.id,
            quiz_id = %quiz_id,
            score = attempt.score,
            passed = attempt.passed,
            "quiz attempt recorded"
        );

        Ok(AttemptOutcome {
            attempt,
            answers: rows,
            course_id,
        })
    }

    /// Records a passing attempt on behalf of an administrator. Flagged so the
    /// row is distinguishable from a genuine submission.
    pub async fn record_override_pass(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
        questions: &[Question],
    ) -> Result<QuizAttempt> {
        let mut tx = self.pool.begin().await?;

        let attempt = sqlx::query_as::<_, QuizAttempt>(
            "INSERT INTO quiz_attempts (user_id, quiz_id, score, grade, passed, is_override)
             VALUES ($1, $2, 100, 'A', TRUE, TRUE)
             RETURNING id, user_id, quiz_id, score, grade, passed, is_override, created_at",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_one(&mut *tx)
        .await?;

        for question in questions {
            sqlx::query(
                "INSERT INTO attempt_answers (attempt_id, question_id, selected_answer, is_correct)
                 VALUES ($1, $2, $3, TRUE)",
            )
            .bind(attempt.id)
            .bind(question.id)
            .bind(&question.correct_answer)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(attempt)
    }

    pub async fn latest_attempt(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Option<QuizAttempt>> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            "SELECT id, user_id, quiz_id, score, grade, passed, is_override, created_at
             FROM quiz_attempts
             WHERE user_id = $1 AND quiz_id = $2
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    pub async fn attempts_for_quiz(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Vec<QuizAttempt>> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            "SELECT id, user_id, quiz_id, score, grade, passed, is_override, created_at
             FROM quiz_attempts
             WHERE user_id = $1 AND quiz_id = $2
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    pub async fn answers_for_attempt(&self, attempt_id: Uuid) -> Result<Vec<AttemptAnswer>> {
        let answers = sqlx::query_as::<_, AttemptAnswer>(
            "SELECT a.id, a.attempt_id, a.question_id, a.selected_answer, a.is_correct
             FROM attempt_answers a
             JOIN questions q ON q.id = a.question_id
             WHERE a.attempt_id = $1
             ORDER BY q.position ASC",
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    pub async fn recent_attempts_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<QuizAttempt>> {
        let limit = if limit <= 0 { 10 } else { limit.min(50) };
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            "SELECT id, user_id, quiz_id, score, grade, passed, is_override, created_at
             FROM quiz_attempts
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}
