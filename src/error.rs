use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::{ApiResponse, FieldError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation errors")]
    Validation(Vec<FieldError>),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::OrmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.to_string();
        let errors = match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        };

        let body = ApiResponse::<serde_json::Value>::failure(message, errors);
        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
