use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure kinds shared by the repository, service and HTTP layers.
///
/// Every failure is classified where it is first detected and travels
/// unchanged up to the handler, which is the only place a kind becomes a
/// status code.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Identifier or payload cannot be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// No row matches the requested id.
    #[error("person not found: {0}")]
    NotFound(String),
    /// A write targeted an id that does not exist (zero rows affected).
    #[error("no person affected: {0}")]
    NoContent(String),
    /// Statement or pool checkout ran past its deadline.
    #[error("storage operation timed out")]
    Timeout,
    #[error("storage error")]
    Unclassified(#[source] sqlx::Error),
}

impl RepoError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn no_content(id: impl Into<String>) -> Self {
        Self::NoContent(id.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::NoContent(_) => StatusCode::NOT_FOUND,
            Self::Timeout | Self::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::Timeout,
            other => Self::Unclassified(other),
        }
    }
}

impl From<tokio::time::error::Elapsed> for RepoError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}

impl IntoResponse for RepoError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            match &self {
                Self::Unclassified(source) => error!(error = %source, "storage failure"),
                other => error!(error = %other, "request failed"),
            }
        }

        // Error responses never carry a body.
        status.into_response()
    }
}
