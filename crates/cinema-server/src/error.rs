use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use cinema_shared::protocol::ErrorBody;
use cinema_shared::MovieId;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Movie {0} not found")]
    MovieNotFound(MovieId),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::MovieNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServerError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (self.status(), axum::Json(ErrorBody::new(message))).into_response()
    }
}
