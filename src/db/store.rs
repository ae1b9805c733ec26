use async_trait::async_trait;
use sqlx::PgPool;

use super::queries::{categories, questions};
use super::{Category, NewQuestion, Question};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("question {0} does not exist")]
    QuestionNotFound(i32),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Everything the HTTP layer needs from persistence. Lists come back ordered by id.
#[async_trait]
pub trait TriviaStore: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn category(&self, id: i32) -> Result<Option<Category>, StoreError>;

    async fn questions(&self) -> Result<Vec<Question>, StoreError>;

    async fn questions_in_category(&self, category_id: i32) -> Result<Vec<Question>, StoreError>;

    /// Case-insensitive substring match on the question text.
    async fn search_questions(&self, term: &str) -> Result<Vec<Question>, StoreError>;

    async fn question(&self, id: i32) -> Result<Option<Question>, StoreError>;

    /// `None` means every category.
    async fn quiz_candidates(
        &self,
        category_id: Option<i32>,
        exclude: &[i64],
    ) -> Result<Vec<Question>, StoreError>;

    async fn insert_question(&self, question: NewQuestion) -> Result<i32, StoreError>;

    async fn update_question(&self, question: Question) -> Result<(), StoreError>;

    async fn delete_question(&self, id: i32) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts rows keeping their ids, categories first.
    pub async fn import(
        &self,
        category_rows: Vec<Category>,
        question_rows: Vec<Question>,
    ) -> Result<(), StoreError> {
        categories::import_categories(&self.pool, category_rows).await?;
        questions::import_questions(&self.pool, question_rows).await?;
        Ok(())
    }
}

#[async_trait]
impl TriviaStore for PgStore {
    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(categories::get_all_categories(&self.pool).await?)
    }

    async fn category(&self, id: i32) -> Result<Option<Category>, StoreError> {
        Ok(categories::get_category(&self.pool, id).await?)
    }

    async fn questions(&self) -> Result<Vec<Question>, StoreError> {
        Ok(questions::get_all_questions(&self.pool).await?)
    }

    async fn questions_in_category(&self, category_id: i32) -> Result<Vec<Question>, StoreError> {
        Ok(questions::get_questions_for_category(&self.pool, category_id).await?)
    }

    async fn search_questions(&self, term: &str) -> Result<Vec<Question>, StoreError> {
        Ok(questions::search_questions(&self.pool, term).await?)
    }

    async fn question(&self, id: i32) -> Result<Option<Question>, StoreError> {
        Ok(questions::get_question_by_id(&self.pool, id).await?)
    }

    async fn quiz_candidates(
        &self,
        category_id: Option<i32>,
        exclude: &[i64],
    ) -> Result<Vec<Question>, StoreError> {
        Ok(questions::get_quiz_candidates(&self.pool, category_id, exclude).await?)
    }

    async fn insert_question(&self, question: NewQuestion) -> Result<i32, StoreError> {
        Ok(questions::create_question(&self.pool, question).await?)
    }

    async fn update_question(&self, question: Question) -> Result<(), StoreError> {
        let id = question.id;
        match questions::update_question(&self.pool, question).await? {
            0 => Err(StoreError::QuestionNotFound(id)),
            _ => Ok(()),
        }
    }

    async fn delete_question(&self, id: i32) -> Result<(), StoreError> {
        match questions::delete_question(&self.pool, id).await? {
            0 => Err(StoreError::QuestionNotFound(id)),
            _ => Ok(()),
        }
    }
}
