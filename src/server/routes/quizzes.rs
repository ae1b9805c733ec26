use axum::{extract::State, routing::post, Json, Router};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::{
    db::Question,
    server::{
        app::{AppState, SharedStore},
        error::{ApiError, ApiResponse, JsonBody},
    },
    telemetry::QUIZ_QUESTIONS_SERVED,
};

/// Category id that stands for every category.
pub const ALL_CATEGORIES: i32 = 0;

#[derive(Deserialize)]
struct QuizBody {
    // ids outside the question id range just exclude nothing
    previous_questions: Option<Vec<i64>>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    id: Option<i32>,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    question: Option<Question>,
}

pub fn pick_question<R: Rng + ?Sized>(candidates: &[Question], rng: &mut R) -> Option<Question> {
    candidates.choose(rng).cloned()
}

async fn next_question(
    State(store): State<SharedStore>,
    JsonBody(body): JsonBody<QuizBody>,
) -> ApiResponse<Json<QuizQuestion>> {
    let (Some(previous), Some(category)) = (body.previous_questions, body.quiz_category) else {
        return Err(ApiError::BadRequest);
    };
    let category_id = category.id.ok_or(ApiError::BadRequest)?;
    let scope = (category_id != ALL_CATEGORIES).then_some(category_id);

    let candidates = store.quiz_candidates(scope, &previous).await?;
    let question = pick_question(&candidates, &mut rand::thread_rng());
    if question.is_some() {
        QUIZ_QUESTIONS_SERVED.inc();
    }
    tracing::debug!(
        "Quiz draw from {} candidates, {} already seen",
        candidates.len(),
        previous.len()
    );

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router() -> Router<AppState> {
    Router::new().route("/quizzes", post(next_question))
}
