use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i32,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<i32>,
}

/// Wraps a user supplied term into a `LIKE` pattern matching it anywhere,
/// with `%`, `_` and `\` in the term taken literally.
pub fn substring_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn get_all_questions(pool: &PgPool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_question_by_id(pool: &PgPool, id: i32) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE questions.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &PgPool,
    category_id: i32,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE questions.category = $1
ORDER BY id
        "#,
    )
    .bind(category_id.to_string())
    .fetch_all(pool)
    .await
}

pub async fn search_questions(pool: &PgPool, term: &str) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE questions.question ILIKE $1
ORDER BY id
        "#,
    )
    .bind(substring_pattern(term))
    .fetch_all(pool)
    .await
}

/// Questions not listed in `exclude`, restricted to `category_id` when one is given.
pub async fn get_quiz_candidates(
    pool: &PgPool,
    category_id: Option<i32>,
    exclude: &[i64],
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE ($1::TEXT IS NULL OR questions.category = $1)
  AND NOT (questions.id::BIGINT = ANY($2))
ORDER BY id
        "#,
    )
    .bind(category_id.map(|id| id.to_string()))
    .bind(exclude)
    .fetch_all(pool)
    .await
}

pub async fn create_question(pool: &PgPool, question: NewQuestion) -> sqlx::Result<i32> {
    let mut tx = pool.begin().await?;

    let (id,): (i32,) = sqlx::query_as(
        r#"
INSERT INTO questions (question, answer, category, difficulty) VALUES ($1, $2, $3, $4)
RETURNING id
        "#,
    )
    .bind(question.question)
    .bind(question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}

pub async fn update_question(pool: &PgPool, question: Question) -> sqlx::Result<u64> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
UPDATE questions SET question=$1, answer=$2, category=$3, difficulty=$4 WHERE questions.id = $5
        "#,
    )
    .bind(question.question)
    .bind(question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .bind(question.id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok(updated)
}

pub async fn delete_question(pool: &PgPool, id: i32) -> sqlx::Result<u64> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query(
        r#"
DELETE FROM questions WHERE questions.id = $1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok(deleted)
}

pub async fn import_questions(pool: &PgPool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, category, difficulty) VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (id) DO UPDATE
SET question = EXCLUDED.question, answer = EXCLUDED.answer,
    category = EXCLUDED.category, difficulty = EXCLUDED.difficulty
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    sqlx::query(
        "SELECT setval(pg_get_serial_sequence('questions', 'id'), COALESCE(MAX(id), 0) + 1, false) FROM questions",
    )
    .execute(&mut *tx)
    .await?;
    tx.commit().await
}
