use aide::{
    OperationOutput,
    generate::GenContext,
    openapi::{Operation, Response as OpenApiResponse},
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleetme_core::store::StoreError;

pub enum ApiError {
    BadRequest(String),
    InternalServerError(String),
    NotFound(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::InternalServerError(error.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => ApiError::NotFound(error.to_string()),
            StoreError::UniqueViolation { .. }
            | StoreError::ForeignKeyViolation
            | StoreError::Capacity(_) => ApiError::BadRequest(error.to_string()),
            StoreError::Database(_) => {
                tracing::error!(%error, "storage failure");
                ApiError::InternalServerError(String::from("storage unavailable"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InternalServerError(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
        }
    }
}

// Error bodies are plain text.
impl OperationOutput for ApiError {
    type Inner = Self;

    fn operation_response(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        String::operation_response(ctx, operation)
    }
}
