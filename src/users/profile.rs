use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::{errors::ErrorBody, state::AppState, users::repo_types::User};

pub const USER_NOT_FOUND: &str = "User not found";

/// The user named by the `:userId` path segment, resolved for this request.
#[derive(Debug, Clone)]
pub struct Profile(pub User);

/// Loads the user named in the path and attaches it as a [`Profile`]
/// extension. Answers `400 {"error":"User not found"}` without running the
/// rest of the chain when the user cannot be loaded.
pub async fn resolve_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    mut req: Request,
    next: Next,
) -> Response {
    match state.users.find_by_id(&user_id).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(Profile(user));
            next.run(req).await
        }
        Ok(None) => {
            warn!(%user_id, "user not found");
            not_found()
        }
        Err(e) => {
            error!(error = %e, %user_id, "user lookup failed");
            not_found()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(USER_NOT_FOUND))).into_response()
}
