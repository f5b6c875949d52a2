//! Store failures, their user-facing messages, and errors raised through the
//! request pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Failures produced by the user store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint on `field` was violated.
    #[error("{field} already exists")]
    Duplicate { field: String },

    /// The input was rejected by the record schema.
    #[error("{0}")]
    Validation(String),

    #[error("record not found")]
    NotFound,

    #[error("could not hash password: {0}")]
    Hashing(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let table = db.table().unwrap_or(USERS_TABLE);
                let field = db
                    .constraint()
                    .and_then(|constraint| unique_field(table, constraint))
                    .unwrap_or_else(|| "field".to_string());
                StoreError::Duplicate { field }
            }
            other => StoreError::Database(other),
        }
    }
}

/// Table assumed when the driver does not report one.
pub const USERS_TABLE: &str = "users";

/// Extracts the column name from a Postgres unique constraint named
/// `<table>_<column>_key`. The table prefix is stripped whole, so table and
/// column names may both contain underscores.
pub fn unique_field(table: &str, constraint: &str) -> Option<String> {
    let field = constraint
        .strip_suffix("_key")?
        .strip_prefix(table)?
        .strip_prefix('_')?;
    if field.is_empty() {
        return None;
    }
    Some(field.to_string())
}

/// Turns a store failure into the single message shown to API clients.
pub fn error_message(err: &StoreError) -> String {
    match err {
        StoreError::Duplicate { field } => format!("{} already exists", capitalize(field)),
        other => {
            let message = other.to_string();
            if message.trim().is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                message
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// JSON body of every API error: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Marker left on a response by a stage that raised an error instead of
/// answering. The terminal interceptor turns it into the final response.
#[derive(Debug, Clone)]
pub struct RaisedError {
    pub name: &'static str,
    pub message: String,
}

pub const UNAUTHORIZED_ERROR: &str = "UnauthorizedError";

/// Error returned from handlers and extractors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Answered directly with `400 {"error": ...}`.
    #[error("{0}")]
    BadRequest(String),

    /// Raised for the interceptor, which answers 401.
    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn name(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BadRequestError",
            AppError::Unauthorized(_) => UNAUTHORIZED_ERROR,
            AppError::Internal(_) => "InternalError",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::BadRequest(error_message(&err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(message) => {
                return (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message.as_str())))
                    .into_response();
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let raised = RaisedError {
            name: self.name(),
            message: self.to_string(),
        };
        let mut res = status.into_response();
        res.extensions_mut().insert(raised);
        res
    }
}

pub type ApiResult<T> = Result<T, AppError>;
