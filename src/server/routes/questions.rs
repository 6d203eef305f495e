use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Question,
    },
    server::{
        app::AppState,
        deserializers::deserialize_optional_i64,
        error::ApiError,
        pagination::{PageQuery, Pagination},
    },
};

use super::{category_map, ApiResponse, AppJson, AppQuery, CategoryMap, IdPath};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewQuestion {
    question: Option<String>,
    answer: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_i64")]
    category: Option<i64>,
    #[serde(deserialize_with = "deserialize_optional_i64")]
    difficulty: Option<i64>,
}

#[derive(Debug, PartialEq, Eq)]
struct ValidQuestion {
    question: String,
    answer: String,
    category: i64,
    difficulty: i64,
}

impl NewQuestion {
    // empty strings and zeroes count as missing
    fn validate(self) -> Result<ValidQuestion, ApiError> {
        let text = |v: Option<String>| v.filter(|s| !s.is_empty()).ok_or(ApiError::BadRequest);
        let number = |v: Option<i64>| v.filter(|n| *n != 0).ok_or(ApiError::BadRequest);
        Ok(ValidQuestion {
            question: text(self.question)?,
            answer: text(self.answer)?,
            category: number(self.category)?,
            difficulty: number(self.difficulty)?,
        })
    }
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(rename = "searchTerm")]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: CategoryMap,
    categories: CategoryMap,
}

#[derive(Serialize)]
struct QuestionId {
    success: bool,
    question_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<String>,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    State(pagination): State<Pagination>,
    AppQuery(PageQuery { page }): AppQuery<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let questions = questions::get_all_questions(&pool).await?;
    let total_questions = questions.len();
    let current = pagination.page(questions, page);
    if current.is_empty() {
        return Err(ApiError::ResourceNotFound);
    }
    let categories = category_map(categories::get_all_categories(&pool).await?);

    Ok(Json(QuestionsPage {
        success: true,
        questions: current,
        total_questions,
        current_category: categories.clone(),
        categories,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    AppJson(new_question): AppJson<NewQuestion>,
) -> ApiResponse<(StatusCode, Json<QuestionId>)> {
    let new_question = new_question.validate()?;

    let id = questions::create_question(
        &pool,
        &new_question.question,
        &new_question.answer,
        new_question.category,
        new_question.difficulty,
    )
    .await
    .map_err(ApiError::unprocessable)?;
    tracing::info!(question_id = id, "Question created");

    Ok((
        StatusCode::CREATED,
        Json(QuestionId {
            success: true,
            question_id: id,
        }),
    ))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    IdPath(id): IdPath<i64>,
) -> ApiResponse<Json<QuestionId>> {
    questions::delete_question(&pool, id)
        .await
        .map_err(ApiError::unprocessable)?;
    tracing::info!(question_id = id, "Question deleted");

    Ok(Json(QuestionId {
        success: true,
        question_id: id,
    }))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    AppJson(request): AppJson<SearchRequest>,
) -> ApiResponse<Json<SearchResults>> {
    let found = questions::search_questions(&pool, &request.search_term).await?;
    let Some(first) = found.first() else {
        return Err(ApiError::NoSearchResults);
    };
    // only the first match's category is reported
    let current_category = categories::get_category(&pool, first.category)
        .await?
        .map(|c| c.kind);

    Ok(Json(SearchResults {
        success: true,
        total_questions: found.len(),
        questions: found,
        current_category,
    }))
}

pub fn questions_router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/searchquestions", post(search_questions))
}
