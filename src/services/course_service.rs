use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::course_dto::{
    CreateCoursePayload, CreateLessonPayload, CreateModulePayload, CourseListQuery,
    UpdateCoursePayload, UpdateLessonPayload, UpdateModulePayload, UpsertQuizPayload,
};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::course::{Course, LEVELS, LEVEL_BEGINNER};
use crate::models::lesson::Lesson;
use crate::models::module::CourseModule;
use crate::models::question::{Question, ANSWER_OPTIONS};
use crate::models::quiz::Quiz;

#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

pub struct CourseList {
    pub items: Vec<Course>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone)]
pub struct QuizOutline {
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone)]
pub struct ModuleOutline {
    pub module: CourseModule,
    pub lessons: Vec<Lesson>,
    pub quiz: Option<QuizOutline>,
}

#[derive(Debug, Clone)]
pub struct CourseOutline {
    pub course: Course,
    pub modules: Vec<ModuleOutline>,
}

const COURSE_COLUMNS: &str = "id, title, slug, short_description, full_description, price, level, \
     estimated_duration, tags, thumbnail, published, featured, created_at, updated_at";

fn validate_level(level: &str) -> Result<()> {
    if LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(Error::BadRequest(format!("Invalid course level: {}", level)))
    }
}

fn validate_correct_answer(answer: &str) -> Result<()> {
    if ANSWER_OPTIONS.contains(&answer) {
        Ok(())
    } else {
        Err(Error::BadRequest(format!(
            "Correct answer must be one of A, B, C, D; got {:?}",
            answer
        )))
    }
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateCoursePayload) -> Result<Course> {
        let level = payload
            .level
            .unwrap_or_else(|| LEVEL_BEGINNER.to_string());
        validate_level(&level)?;

        let result = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (title, slug, short_description, full_description, price, level,
                                  estimated_duration, tags, thumbnail, published, featured)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(&payload.title)
        .bind(&payload.slug)
        .bind(&payload.short_description)
        .bind(&payload.full_description)
        .bind(payload.price.unwrap_or(0))
        .bind(&level)
        .bind(&payload.estimated_duration)
        .bind(&payload.tags)
        .bind(&payload.thumbnail)
        .bind(payload.published)
        .bind(payload.featured)
        .fetch_one(&self.pool)
        .await;

        result.map_err(|e| {
            if is_unique_violation(&e, "courses_slug_key") {
                Error::BadRequest("Slug already in use".to_string())
            } else {
                e.into()
            }
        })
    }

    pub async fn update(&self, id: Uuid, payload: UpdateCoursePayload) -> Result<Course> {
        if let Some(level) = &payload.level {
            validate_level(level)?;
        }

        let result = sqlx::query_as::<_, Course>(&format!(
            "UPDATE courses
             SET title = COALESCE($2, title),
                 slug = COALESCE($3, slug),
                 short_description = COALESCE($4, short_description),
                 full_description = COALESCE($5, full_description),
                 price = COALESCE($6, price),
                 level = COALESCE($7, level),
                 estimated_duration = COALESCE($8, estimated_duration),
                 tags = COALESCE($9, tags),
                 thumbnail = COALESCE($10, thumbnail),
                 published = COALESCE($11, published),
                 featured = COALESCE($12, featured),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.slug)
        .bind(&payload.short_description)
        .bind(&payload.full_description)
        .bind(payload.price)
        .bind(&payload.level)
        .bind(&payload.estimated_duration)
        .bind(&payload.tags)
        .bind(&payload.thumbnail)
        .bind(payload.published)
        .bind(payload.featured)
        .fetch_one(&self.pool)
        .await;

        result.map_err(|e| {
            if is_unique_violation(&e, "courses_slug_key") {
                Error::BadRequest("Slug already in use".to_string())
            } else {
                e.into()
            }
        })
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Course not found".to_string()));
        }
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    pub async fn get_by_slug(&self, slug: &str, published_only: bool) -> Result<Course> {
        let query = if published_only {
            format!("SELECT {COURSE_COLUMNS} FROM courses WHERE slug = $1 AND published = TRUE")
        } else {
            format!("SELECT {COURSE_COLUMNS} FROM courses WHERE slug = $1")
        };
        let course = sqlx::query_as::<_, Course>(&query)
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(course)
    }

    pub async fn list(&self, query: CourseListQuery) -> Result<CourseList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(published) = query.published {
            filters.push(format!("published = {}", published));
        }
        if let Some(featured) = query.featured {
            filters.push(format!("featured = {}", featured));
        }
        if let Some(level) = query.level {
            filters.push(format!("level = ${}", args.len() + 1));
            args.push(level);
        }
        if let Some(search) = query.search {
            let first = args.len() + 1;
            let second = first + 1;
            filters.push(format!(
                "(title ILIKE ${} OR slug ILIKE ${})",
                first, second
            ));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let items_query = format!(
            "SELECT {COURSE_COLUMNS}
             FROM courses
             {}
             ORDER BY created_at DESC
             LIMIT ${} OFFSET ${}",
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM courses {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Course>(&items_query);
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

        Ok(CourseList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Full course structure: modules in position order, each with its lessons
    /// and, where present, the module quiz and its questions.
    pub async fn outline(&self, course: Course) -> Result<CourseOutline> {
        let modules = sqlx::query_as::<_, CourseModule>(
            "SELECT id, course_id, title, position, created_at, updated_at
             FROM modules
             WHERE course_id = $1
             ORDER BY position ASC",
        )
        .bind(course.id)
        .fetch_all(&self.pool)
        .await?;

        let lessons = sqlx::query_as::<_, Lesson>(
            "SELECT l.id, l.module_id, l.title, l.content, l.position, l.created_at, l.updated_at
             FROM lessons l
             JOIN modules m ON m.id = l.module_id
             WHERE m.course_id = $1
             ORDER BY l.position ASC",
        )
        .bind(course.id)
        .fetch_all(&self.pool)
        .await?;

        let quizzes = sqlx::query_as::<_, Quiz>(
            "SELECT q.id, q.module_id, q.title, q.created_at, q.updated_at
             FROM quizzes q
             JOIN modules m ON m.id = q.module_id
             WHERE m.course_id = $1",
        )
        .bind(course.id)
        .fetch_all(&self.pool)
        .await?;

        let questions = sqlx::query_as::<_, Question>(
            "SELECT qu.id, qu.quiz_id, qu.text, qu.option_a, qu.option_b, qu.option_c, qu.option_d,
                    qu.correct_answer, qu.explanation, qu.position, qu.created_at
             FROM questions qu
             JOIN quizzes q ON q.id = qu.quiz_id
             JOIN modules m ON m.id = q.module_id
             WHERE m.course_id = $1
             ORDER BY qu.position ASC",
        )
        .bind(course.id)
        .fetch_all(&self.pool)
        .await?;

        let module_outlines = modules
            .into_iter()
            .map(|module| {
                let module_lessons = lessons
                    .iter()
                    .filter(|l| l.module_id == module.id)
                    .cloned()
                    .collect();
                let quiz = quizzes
                    .iter()
                    .find(|q| q.module_id == module.id)
                    .cloned()
                    .map(|quiz| {
                        let quiz_questions = questions
                            .iter()
                            .filter(|qu| qu.quiz_id == quiz.id)
                            .cloned()
                            .collect();
                        QuizOutline {
                            quiz,
                            questions: quiz_questions,
                        }
                    });
                ModuleOutline {
                    module,
                    lessons: module_lessons,
                    quiz,
                }
            })
            .collect();

        Ok(CourseOutline {
            course,
            modules: module_outlines,
        })
    }

    pub async fn create_module(
        &self,
        course_id: Uuid,
        payload: CreateModulePayload,
    ) -> Result<CourseModule> {
        self.get_by_id(course_id).await?;

        let module = sqlx::query_as::<_, CourseModule>(
            "INSERT INTO modules (course_id, title, position)
             SELECT $1, $2, COALESCE(MAX(position), 0) + 1
             FROM modules WHERE course_id = $1
             RETURNING id, course_id, title, position, created_at, updated_at",
        )
        .bind(course_id)
        .bind(&payload.title)
        .fetch_one(&self.pool)
        .await?;

        Ok(module)
    }

    pub async fn update_module(
        &self,
        module_id: Uuid,
        payload: UpdateModulePayload,
    ) -> Result<CourseModule> {
        let module = sqlx::query_as::<_, CourseModule>(
            "UPDATE modules SET title = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING id, course_id, title, position, created_at, updated_at",
        )
        .bind(module_id)
        .bind(&payload.title)
        .fetch_one(&self.pool)
        .await?;

        Ok(module)
    }

    pub async fn delete_module(&self, module_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(module_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Module not found".to_string()));
        }
        Ok(())
    }

    /// Reassigns module positions contiguously from 1 in the order given.
    /// Every id must name a module of the course.
    pub async fn reorder_modules(&self, course_id: Uuid, ids: &[Uuid]) -> Result<Vec<CourseModule>> {
        let mut tx = self.pool.begin().await?;

        for (index, module_id) in ids.iter().enumerate() {
            let updated = sqlx::query(
                "UPDATE modules SET position = $1, updated_at = NOW()
                 WHERE id = $2 AND course_id = $3",
            )
            .bind((index + 1) as i32)
            .bind(module_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(Error::NotFound(format!(
                    "Module {} does not belong to this course",
                    module_id
                )));
            }
        }

        tx.commit().await?;

        let modules = sqlx::query_as::<_, CourseModule>(
            "SELECT id, course_id, title, position, created_at, updated_at
             FROM modules
             WHERE course_id = $1
             ORDER BY position ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    pub async fn create_lesson(
        &self,
        module_id: Uuid,
        payload: CreateLessonPayload,
    ) -> Result<Lesson> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM modules WHERE id = $1")
            .bind(module_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Module not found".to_string()))?;

        let lesson = sqlx::query_as::<_, Lesson>(
            "INSERT INTO lessons (module_id, title, content, position)
             SELECT $1, $2, $3, COALESCE(MAX(position), 0) + 1
             FROM lessons WHERE module_id = $1
             RETURNING id, module_id, title, content, position, created_at, updated_at",
        )
        .bind(module_id)
        .bind(&payload.title)
        .bind(&payload.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(lesson)
    }

    pub async fn update_lesson(
        &self,
        lesson_id: Uuid,
        payload: UpdateLessonPayload,
    ) -> Result<Lesson> {
        let lesson = sqlx::query_as::<_, Lesson>(
            "UPDATE lessons
             SET title = COALESCE($2, title),
                 content = COALESCE($3, content),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id, module_id, title, content, position, created_at, updated_at",
        )
        .bind(lesson_id)
        .bind(&payload.title)
        .bind(&payload.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(lesson)
    }

    pub async fn delete_lesson(&self, lesson_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Lesson not found".to_string()));
        }
        Ok(())
    }

    pub async fn reorder_lessons(&self, module_id: Uuid, ids: &[Uuid]) -> Result<Vec<Lesson>> {
        let mut tx = self.pool.begin().await?;

        for (index, lesson_id) in ids.iter().enumerate() {
            let updated = sqlx::query(
                "UPDATE lessons SET position = $1, updated_at = NOW()
                 WHERE id = $2 AND module_id = $3",
            )
            .bind((index + 1) as i32)
            .bind(lesson_id)
            .bind(module_id)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(Error::NotFound(format!(
                    "Lesson {} does not belong to this module",
                    lesson_id
                )));
            }
        }

        tx.commit().await?;

        let lessons = sqlx::query_as::<_, Lesson>(
            "SELECT id, module_id, title, content, position, created_at, updated_at
             FROM lessons
             WHERE module_id = $1
             ORDER BY position ASC",
        )
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lessons)
    }

    /// Creates or retitles the module quiz and replaces its question set
    /// wholesale. Positions follow submission order.
    pub async fn upsert_quiz(
        &self,
        module_id: Uuid,
        payload: UpsertQuizPayload,
    ) -> Result<QuizOutline> {
        for question in &payload.questions {
            validate_correct_answer(&question.correct_answer)?;
        }

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM modules WHERE id = $1")
            .bind(module_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Module not found".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let quiz = sqlx::query_as::<_, Quiz>(
            "INSERT INTO quizzes (module_id, title)
             VALUES ($1, $2)
             ON CONFLICT (module_id) DO UPDATE SET title = EXCLUDED.title, updated_at = NOW()
             RETURNING id, module_id, title, created_at, updated_at",
        )
        .bind(module_id)
        .bind(&payload.title)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
            .bind(quiz.id)
            .execute(&mut *tx)
            .await?;

        let mut questions = Vec::with_capacity(payload.questions.len());
        for (index, question) in payload.questions.iter().enumerate() {
            let row = sqlx::query_as::<_, Question>(
                "INSERT INTO questions (quiz_id, text, option_a, option_b, option_c, option_d,
                                        correct_answer, explanation, position)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 RETURNING id, quiz_id, text, option_a, option_b, option_c, option_d,
                           correct_answer, explanation, position, created_at",
            )
            .bind(quiz.id)
            .bind(&question.text)
            .bind(&question.option_a)
            .bind(&question.option_b)
            .bind(&question.option_c)
            .bind(&question.option_d)
            .bind(&question.correct_answer)
            .bind(&question.explanation)
            .bind((index + 1) as i32)
            .fetch_one(&mut *tx)
            .await?;
            questions.push(row);
        }

        tx.commit().await?;

        Ok(QuizOutline { quiz, questions })
    }

    pub async fn delete_quiz(&self, module_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM quizzes WHERE module_id = $1")
            .bind(module_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Module has no quiz".to_string()));
        }
        Ok(())
    }
}
