//! Request body parsing.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Upper bound on accepted request bodies.
pub const BODY_LIMIT: usize = 100 * 1024;

/// Body parsed from JSON or URL-encoded form input, chosen by content type.
/// Requests with any other (or no) content type parse as an empty object.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Payload(value));
        }
        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Payload(value));
        }

        let value = serde_json::from_value(serde_json::Value::Object(Default::default()))
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(Payload(value))
    }
}
