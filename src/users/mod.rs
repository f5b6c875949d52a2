use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod profile;
pub mod repo;
pub mod repo_types;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(handlers::collection_routes())
        .merge(handlers::member_routes(state))
}
