use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::{
    db::{NewQuestion, Question, StoreError},
    server::{
        app::{AppState, SharedStore},
        deserializers::deserialize_option_string_from_number,
        error::{ApiError, ApiResponse, JsonBody},
        pagination::{paginate, PageQuery},
    },
    telemetry::record_mutation,
};

use super::categories::category_map;

#[derive(Deserialize)]
struct NewQuestionBody {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_string_from_number")]
    category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i32>,
}

#[derive(Deserialize)]
struct SearchBody {
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<BTreeMap<i32, Option<String>>>,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i32,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i32,
}

async fn list_questions(
    State(store): State<SharedStore>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPage>> {
    let Query(PageQuery { page }) = query?;

    let questions = store.questions().await?;
    let current = paginate(page, &questions);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }
    let categories = store.categories().await?;

    Ok(Json(QuestionsPage {
        success: true,
        questions: current.to_vec(),
        total_questions: questions.len(),
        categories: Some(category_map(categories)),
        current_category: None,
    }))
}

async fn create_question(
    State(store): State<SharedStore>,
    JsonBody(body): JsonBody<NewQuestionBody>,
) -> ApiResponse<Json<Created>> {
    let question = match body.question {
        Some(q) if !q.is_empty() => q,
        _ => return Err(ApiError::BadRequest),
    };
    let new_question = NewQuestion {
        question,
        answer: body.answer,
        category: body.category,
        difficulty: body.difficulty,
    };

    match store.insert_question(new_question).await {
        Ok(id) => {
            record_mutation("create", true);
            tracing::info!("Created question {id}");
            Ok(Json(Created {
                success: true,
                created: id,
            }))
        }
        Err(e) => {
            record_mutation("create", false);
            tracing::warn!("Failed to create question: {e}");
            Err(ApiError::Unprocessable)
        }
    }
}

async fn delete_question(
    State(store): State<SharedStore>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResponse<Json<Deleted>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    store.question(id).await?.ok_or(ApiError::NotFound)?;

    match store.delete_question(id).await {
        Ok(()) => {
            record_mutation("delete", true);
            tracing::info!("Deleted question {id}");
            Ok(Json(Deleted {
                success: true,
                deleted: id,
            }))
        }
        Err(StoreError::QuestionNotFound(_)) => Err(ApiError::NotFound),
        Err(e) => {
            record_mutation("delete", false);
            tracing::warn!("Failed to delete question {id}: {e}");
            Err(ApiError::Unprocessable)
        }
    }
}

async fn search_questions(
    State(store): State<SharedStore>,
    query: Result<Query<PageQuery>, QueryRejection>,
    JsonBody(body): JsonBody<SearchBody>,
) -> ApiResponse<Json<QuestionsPage>> {
    let Query(PageQuery { page }) = query?;
    let term = body.search_term.ok_or(ApiError::BadRequest)?;

    let questions = store.search_questions(&term).await?;
    let current = paginate(page, &questions);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(QuestionsPage {
        success: true,
        questions: current.to_vec(),
        total_questions: questions.len(),
        categories: None,
        current_category: None,
    }))
}

pub fn questions_router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/questions/search", post(search_questions))
}
