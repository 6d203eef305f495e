use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Question,
    },
    server::{
        app::AppState,
        error::ApiError,
        pagination::{PageQuery, Pagination},
    },
};

use super::{category_map, ApiResponse, AppQuery, CategoryMap, IdPath};

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: CategoryMap,
}

#[derive(Serialize)]
struct CategoryQuestions {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesResponse>> {
    let categories = categories::get_all_categories(&pool).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(categories),
    }))
}

async fn get_category_questions(
    State(pool): State<SqlitePool>,
    State(pagination): State<Pagination>,
    IdPath(id): IdPath<i64>,
    AppQuery(PageQuery { page }): AppQuery<PageQuery>,
) -> ApiResponse<Json<CategoryQuestions>> {
    let category = categories::get_category(&pool, id)
        .await?
        .ok_or(ApiError::ResourceNotFound)?;
    let questions = questions::get_questions_by_category(&pool, id).await?;
    let total_questions = questions.len();

    Ok(Json(CategoryQuestions {
        success: true,
        questions: pagination.page(questions, page),
        total_questions,
        current_category: category.kind,
    }))
}

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_category_questions))
}
