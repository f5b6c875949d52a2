use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::{get, MethodRouter},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::{
    auth,
    errors::ErrorBody,
    extract::BODY_LIMIT,
    middleware::{intercept_errors, raise_panic, security_headers},
    render::render_page,
    state::AppState,
    users,
};

fn domain_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(|| async { "ok" }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

/// Assembles the pipeline. Outermost first: tracing, body limit, compression,
/// security headers, CORS, the error interceptor, then routing. Static mounts
/// fall through to the server renderer, which only sees requests no route or
/// file matched. Unmatched requests with any other method than GET answer 404.
pub fn build_app(state: AppState) -> Router {
    let dirs = state.config.static_dirs.clone();
    let catch_all: MethodRouter = get(render_page)
        .fallback(not_found)
        .with_state(state.clone());
    let static_dir = |dir: &str| {
        ServeDir::new(dir)
            .call_fallback_on_method_not_allowed(true)
            .fallback(catch_all.clone())
    };

    let router = Router::new()
        .merge(users::router(state.clone()))
        .merge(auth::router())
        .merge(domain_routes())
        .nest_service("/dist", static_dir(dirs.dist.as_str()))
        .nest_service("/assets", static_dir(dirs.assets.as_str()))
        .fallback_service(static_dir(dirs.sw.as_str()))
        .with_state(state)
        .layer(CatchPanicLayer::custom(raise_panic))
        .layer(from_fn(intercept_errors))
        .layer(CorsLayer::permissive());

    security_headers(router)
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
