use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, AUTHORIZATION, CONTENT_TYPE,
};
use axum::http::{HeaderValue, Method};
use axum::response::Response;
use axum::{extract::FromRef, http::StatusCode, routing::get, Router};
use routes::{category_router, questions_router, quizzes_router};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use super::error::{handle_panic, ApiError};
use super::pagination::Pagination;
use super::routes::{self, ApiResponse};
use crate::settings::Settings;
use crate::telemetry::{http_trace_layer, render_metrics, METRICS_CONTENT_TYPE};

/// Everything a handler may need, built once at start-up.
#[derive(FromRef, Clone)]
pub struct AppState {
    pool: SqlitePool,
    pagination: Pagination,
}

impl AppState {
    pub fn new(pool: SqlitePool, pagination: Pagination) -> Self {
        Self { pool, pagination }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/metrics", get(metrics))
        .merge(category_router())
        .merge(questions_router())
        .merge(quizzes_router())
        .fallback(|| async {
            tracing::info!("Fallback");
            ApiError::ResourceNotFound
        })
        .method_not_allowed_fallback(|| async { ApiError::MethodNotAllowed })
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(http_trace_layer())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization, true"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        ))
        .with_state(state)
}

pub async fn run_server(settings: &Settings, pool: SqlitePool) -> anyhow::Result<()> {
    let addr = settings.server.address();
    let state = AppState::new(
        pool,
        Pagination {
            per_page: settings.api.questions_per_page,
        },
    );

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics() -> ApiResponse<Response> {
    let buf = render_metrics().map_err(|err| {
        tracing::error!("Failed to encode metrics: {err}");
        ApiError::InternalServerError
    })?;
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, METRICS_CONTENT_TYPE)
        .body(Body::from(buf))
        .map_err(|_| ApiError::InternalServerError)
}
