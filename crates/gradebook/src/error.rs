use crate::auth::AuthError;
use crate::characters::CharacterServiceError;
use crate::config::ConfigError;
use crate::grading::{EvaluationImportError, GradeServiceError};
use crate::products::ProductServiceError;
use crate::repository::RepositoryError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Failures that abort a command or server startup.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Auth(AuthError),
    Storage(RepositoryError),
    Import(EvaluationImportError),
    Grading(GradeServiceError),
    Characters(CharacterServiceError),
    Products(ProductServiceError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Grading(GradeServiceError::InvalidStudent(_) | GradeServiceError::Grade(_))
            | AppError::Characters(CharacterServiceError::Invalid(_))
            | AppError::Products(ProductServiceError::Invalid(_)) => StatusCode::BAD_REQUEST,
            AppError::Grading(GradeServiceError::StudentNotFound(_))
            | AppError::Products(ProductServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Characters(CharacterServiceError::CharacterNotFound(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Storage(RepositoryError::Conflict)
            | AppError::Grading(GradeServiceError::Repository(RepositoryError::Conflict))
            | AppError::Characters(CharacterServiceError::Repository(RepositoryError::Conflict))
            | AppError::Products(ProductServiceError::Repository(RepositoryError::Conflict)) => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Auth(err) => write!(f, "auth error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Grading(err) => write!(f, "grading error: {}", err),
            AppError::Characters(err) => write!(f, "character error: {}", err),
            AppError::Products(err) => write!(f, "product error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Auth(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Grading(err) => Some(err),
            AppError::Characters(err) => Some(err),
            AppError::Products(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Storage(value)
    }
}

impl From<EvaluationImportError> for AppError {
    fn from(value: EvaluationImportError) -> Self {
        Self::Import(value)
    }
}

impl From<GradeServiceError> for AppError {
    fn from(value: GradeServiceError) -> Self {
        Self::Grading(value)
    }
}

impl From<CharacterServiceError> for AppError {
    fn from(value: CharacterServiceError) -> Self {
        Self::Characters(value)
    }
}

impl From<ProductServiceError> for AppError {
    fn from(value: ProductServiceError) -> Self {
        Self::Products(value)
    }
}
