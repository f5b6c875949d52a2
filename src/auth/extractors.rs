use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use tracing::warn;
use uuid::Uuid;

use super::{
    claims::TokenKind,
    jwt::{rejection_message, JwtKeys},
};
use crate::errors::AppError;

/// Cookie that carries the access token for browser clients.
pub const TOKEN_COOKIE: &str = "t";

/// Validates the caller's access token and yields the user ID. Failures are
/// raised as `UnauthorizedError`.
pub struct AuthUser(pub Uuid);

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(|t| t.trim().to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(TOKEN_COOKIE).map(|c| c.value().to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("No authorization token was found".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "token rejected");
            AppError::Unauthorized(rejection_message(&e).into())
        })?;

        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized("access token required".into()));
        }

        Ok(AuthUser(claims.sub))
    }
}
