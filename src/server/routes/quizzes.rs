use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, Question},
    server::{app::AppState, error::ApiError},
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::ApiResponse;

/// `quiz_category.id` meaning "every category".
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizRequest {
    quiz_category: QuizCategory,
    #[serde(default)]
    previous_questions: Vec<i64>,
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Serialize)]
struct QuizQuestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    question: Option<Question>,
}

fn pick_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &[i64],
    rng: &mut R,
) -> Option<Question> {
    let asked: HashSet<i64> = previous.iter().copied().collect();
    let remaining: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !asked.contains(&q.id))
        .collect();
    remaining.choose(rng).cloned()
}

async fn next_question(
    State(pool): State<SqlitePool>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<Json<QuizQuestion>> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected quiz request: {rejection}");
        ApiError::Unprocessable
    })?;

    let category = request.quiz_category.id;
    let candidates = if category == ALL_CATEGORIES {
        questions::get_all_questions(&pool).await
    } else {
        questions::get_questions_by_category(&pool, category).await
    }
    .map_err(ApiError::unprocessable)?;

    let question = {
        let mut rng = rand::thread_rng();
        pick_question(candidates, &request.previous_questions, &mut rng)
    };
    let Some(question) = question else {
        return Ok(Json(QuizQuestion {
            success: None,
            question: None,
        }));
    };
    QUIZ_QUESTIONS_SERVED
        .with_label_values(&[question.category.to_string().as_str()])
        .inc();

    Ok(Json(QuizQuestion {
        success: Some(true),
        question: Some(question),
    }))
}

pub fn quizzes_router() -> Router<AppState> {
    Router::new().route("/quizzes", post(next_question))
}
