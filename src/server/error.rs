//! JSON error envelopes returned by every failing endpoint.

use std::any::Any;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request")]
    BadRequest,
    #[error("Requested resource not found")]
    ResourceNotFound,
    #[error("No Result for searched question!")]
    NoSearchResults,
    #[error("Method not allowed for requested url")]
    MethodNotAllowed,
    #[error("Request can not be processed")]
    Unprocessable,
    #[error("internal server error")]
    InternalServerError,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound | ApiError::NoSearchResults => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error mapping for the write paths and the quiz endpoint.
    ///
    /// A missing record is a 404. Any other store failure collapses into 422.
    pub fn unprocessable(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::ResourceNotFound,
            StoreError::Persistence(error) => {
                tracing::warn!("Store rejected the operation: {error}");
                ApiError::Unprocessable
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub error: u16,
}

impl From<ApiError> for ErrorBody {
    fn from(err: ApiError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            error: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::from(self))).into_response()
    }
}

// read paths: a failing store is a server fault
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::ResourceNotFound,
            StoreError::Persistence(error) => {
                tracing::error!("Store query failed: {error}");
                ApiError::InternalServerError
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {rejection}");
        ApiError::BadRequest
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Rejected query string: {rejection}");
        ApiError::BadRequest
    }
}

// mirrors an `<int:id>` route that simply doesn't match
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path: {rejection}");
        ApiError::ResourceNotFound
    }
}

pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Handler panicked: {details}");
    ApiError::InternalServerError.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_code_and_message() {
        let body = serde_json::to_value(ErrorBody::from(ApiError::Unprocessable)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "message": "Request can not be processed",
                "error": 422
            })
        );
    }

    #[test]
    fn every_kind_has_its_status() {
        let cases = [
            (ApiError::BadRequest, 400),
            (ApiError::ResourceNotFound, 404),
            (ApiError::NoSearchResults, 404),
            (ApiError::MethodNotAllowed, 405),
            (ApiError::Unprocessable, 422),
            (ApiError::InternalServerError, 500),
        ];
        for (err, code) in cases {
            assert_eq!(err.into_response().status().as_u16(), code);
        }
    }

    #[test]
    fn store_errors_map_per_path() {
        assert_eq!(ApiError::from(StoreError::NotFound), ApiError::ResourceNotFound);
        assert_eq!(
            ApiError::from(StoreError::Persistence(sqlx::Error::PoolClosed)),
            ApiError::InternalServerError
        );
        assert_eq!(
            ApiError::unprocessable(StoreError::Persistence(sqlx::Error::PoolClosed)),
            ApiError::Unprocessable
        );
        assert_eq!(
            ApiError::unprocessable(StoreError::NotFound),
            ApiError::ResourceNotFound
        );
    }

    #[test]
    fn panic_becomes_internal_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
