use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::get,
    Extension, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    errors::{ApiResult, AppError, StoreError},
    extract::Payload,
    state::AppState,
    users::{
        dto::{MessageResponse, PublicUser},
        profile::{resolve_profile, Profile},
        repo_types::{NewUser, UserPatch},
    },
};

pub fn collection_routes() -> Router<AppState> {
    Router::new().route("/api/users", get(list).post(create))
}

/// Routes addressing one user; the profile is resolved before any handler runs.
pub fn member_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users/:userId", get(read).put(update).delete(remove))
        .route_layer(from_fn_with_state(state, resolve_profile))
}

fn rejected(op: &'static str) -> impl Fn(StoreError) -> AppError {
    move |e| {
        warn!(error = %e, op, "user store rejected request");
        AppError::from(e)
    }
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    Payload(payload): Payload<NewUser>,
) -> ApiResult<Json<MessageResponse>> {
    let user = state
        .users
        .create(payload)
        .await
        .map_err(rejected("create"))?;
    info!(user_id = %user.id, "user signed up");
    Ok(Json(MessageResponse::new("Successfully signed up!")))
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = state.users.list_all().await.map_err(rejected("list"))?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip_all)]
pub async fn read(Extension(Profile(user)): Extension<Profile>) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}

#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    Extension(Profile(user)): Extension<Profile>,
    Payload(patch): Payload<UserPatch>,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .users
        .update(user, patch)
        .await
        .map_err(rejected("update"))?;
    info!(user_id = %user.id, "user updated");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    Extension(Profile(user)): Extension<Profile>,
) -> ApiResult<Json<PublicUser>> {
    let deleted = state.users.remove(user).await.map_err(rejected("remove"))?;
    info!(user_id = %deleted.id, "user deleted");
    Ok(Json(PublicUser::from(deleted)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{users::memory::MemoryUserRepository, users::repo::UserRepository};

    use super::*;

    fn app(state: AppState) -> Router {
        Router::new()
            .merge(collection_routes())
            .merge(member_routes(state.clone()))
            .with_state(state)
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn seeded() -> (AppState, Arc<MemoryUserRepository>, Uuid) {
        let (state, repo) = AppState::fake();
        let user = repo
            .create(NewUser {
                name: Some("Ada".into()),
                email: Some("ada@example.com".into()),
                password: Some("secret1".into()),
            })
            .await
            .unwrap();
        (state, repo, user.id)
    }

    fn assert_redacted(v: &Value) {
        let obj = v.as_object().expect("object body");
        assert!(!obj.contains_key("hashed_password"));
        assert!(!obj.contains_key("salt"));
        assert!(!obj.contains_key("password"));
    }

    #[tokio::test]
    async fn create_returns_only_a_message() {
        let (state, _) = AppState::fake();
        let (status, body) = send(
            app(state),
            Method::POST,
            "/api/users",
            Some(json!({"name": "A", "email": "a@x.com", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Successfully signed up!"}));
    }

    #[tokio::test]
    async fn create_with_taken_email_is_rejected() {
        let (state, _, _) = seeded().await;
        let (status, body) = send(
            app(state),
            Method::POST,
            "/api/users",
            Some(json!({"name": "B", "email": "ada@example.com", "password": "secret2"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Email already exists"}));
    }

    #[tokio::test]
    async fn create_with_one_letter_password_signs_up() {
        let (state, _) = AppState::fake();
        let (status, body) = send(
            app(state),
            Method::POST,
            "/api/users",
            Some(json!({"name": "A", "email": "a@x.com", "password": "p"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Successfully signed up!"}));
    }

    #[tokio::test]
    async fn list_is_projected_and_stable() {
        let (state, _, id) = seeded().await;
        let (status, first) = send(app(state.clone()), Method::GET, "/api/users", None).await;
        assert_eq!(status, StatusCode::OK);
        let items = first.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["_id"], id.to_string());
        assert_eq!(items[0]["name"], "Ada");
        assert_redacted(&items[0]);

        let (_, second) = send(app(state), Method::GET, "/api/users", None).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn read_is_redacted_but_store_keeps_secrets() {
        let (state, repo, id) = seeded().await;
        let (status, body) = send(app(state), Method::GET, &format!("/api/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ada@example.com");
        assert_redacted(&body);

        let stored = repo.stored(id).await.unwrap();
        assert!(!stored.hashed_password.is_empty());
        assert!(!stored.salt.is_empty());
    }

    #[tokio::test]
    async fn read_unknown_user() {
        let (state, _) = AppState::fake();
        let (status, body) = send(
            app(state),
            Method::GET,
            &format!("/api/users/{}", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn update_merges_patch_and_advances_timestamp() {
        let (state, repo, id) = seeded().await;
        let uri = format!("/api/users/{id}");

        let (status, first) = send(app(state.clone()), Method::PUT, &uri, Some(json!({"name": "Grace"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["name"], "Grace");
        assert_eq!(first["email"], "ada@example.com");
        assert_redacted(&first);
        let after_first = repo.stored(id).await.unwrap().updated.unwrap();

        let (status, second) = send(
            app(state),
            Method::PUT,
            &uri,
            Some(json!({"email": "grace@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["name"], "Grace");
        assert_eq!(second["email"], "grace@example.com");
        let after_second = repo.stored(id).await.unwrap().updated.unwrap();
        assert!(after_second > after_first);
    }

    #[tokio::test]
    async fn update_with_invalid_email_is_rejected() {
        let (state, repo, id) = seeded().await;
        let (status, body) = send(
            app(state),
            Method::PUT,
            &format!("/api/users/{id}"),
            Some(json!({"email": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Please fill a valid email address"}));
        assert_eq!(repo.stored(id).await.unwrap().email, "ada@example.com");
    }

    #[tokio::test]
    async fn remove_returns_redacted_snapshot() {
        let (state, repo, id) = seeded().await;
        let uri = format!("/api/users/{id}");
        let (status, body) = send(app(state.clone()), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["_id"], id.to_string());
        assert_redacted(&body);
        assert!(repo.stored(id).await.is_none());

        let (status, body) = send(app(state), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "User not found"}));
    }
}
