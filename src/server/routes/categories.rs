use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    db::{Category, Question},
    server::{
        app::{AppState, SharedStore},
        error::{ApiError, ApiResponse},
        pagination::{paginate, PageQuery},
    },
};

#[derive(Serialize)]
struct CategoriesBody {
    success: bool,
    categories: BTreeMap<i32, Option<String>>,
    total_categories: usize,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<String>,
}

/// `{id: type}` as served by the listing endpoints.
pub fn category_map(categories: Vec<Category>) -> BTreeMap<i32, Option<String>> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

async fn get_categories(State(store): State<SharedStore>) -> ApiResponse<Json<CategoriesBody>> {
    let categories = store.categories().await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoriesBody {
        success: true,
        total_categories: categories.len(),
        categories: category_map(categories),
    }))
}

async fn questions_for_category(
    State(store): State<SharedStore>,
    id: Result<Path<i32>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<CategoryQuestionsBody>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let Query(PageQuery { page }) = query?;

    let category = store.category(id).await?.ok_or(ApiError::NotFound)?;
    let questions = store.questions_in_category(category.id).await?;
    let current = paginate(page, &questions);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoryQuestionsBody {
        success: true,
        questions: current.to_vec(),
        total_questions: questions.len(),
        current_category: category.kind,
    }))
}

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
}
