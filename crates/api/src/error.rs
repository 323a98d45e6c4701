//! API-level error type and its HTTP mapping.
//!
//! Every failure is rendered as
//! `{"error": {"message": "...", "status": <code>}}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// A gate denied the request. Same response for "not logged in" and
    /// "logged in as someone else".
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid username/password")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    /// Details are logged, never sent to the client.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(%detail, "request failed");
        }
        let status = self.status();
        let body = json!({
            "error": {
                "message": self.to_string(),
                "status": status.as_u16(),
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<db::DbError> for ApiError {
    fn from(err: db::DbError) -> Self {
        use db::DbError;
        match err {
            DbError::NotFound(_) => Self::NotFound(err.to_string()),
            DbError::Duplicate(_) | DbError::Constraint(_) => Self::BadRequest(err.to_string()),
            // The builder only sees what handlers hand it; reaching here is a bug.
            DbError::InvalidArgument(_) | DbError::Sqlx(_) | DbError::Migration(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<auth::AuthError> for ApiError {
    fn from(err: auth::AuthError) -> Self {
        use auth::AuthError;
        match err {
            AuthError::Unauthorized | AuthError::Token(_) => Self::Unauthorized,
            AuthError::Password(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
