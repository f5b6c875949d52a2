use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::{cookie::Cookie, CookieJar};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::{AuthUser, TOKEN_COOKIE},
    errors::{ApiResult, AppError},
    state::AppState,
    users::dto::{MessageResponse, PublicUser},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(get_me))
        .route("/auth/signout", get(signout))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .users
        .find_by_id(&user_id.to_string())
        .await?
        .ok_or_else(|| {
            warn!(%user_id, "token subject has no user");
            AppError::Unauthorized("User not found".into())
        })?;
    Ok(Json(PublicUser::from(user)))
}

/// Drops the token cookie.
#[instrument(skip_all)]
pub async fn signout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    info!("signed out");
    let mut cookie = Cookie::new(TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    (jar.add(cookie), Json(MessageResponse::new("signed out")))
}
