//! Cross-cutting stages of the pipeline: security headers and the terminal
//! error interceptor.

use std::any::Any;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, warn};

use crate::errors::{ErrorBody, RaisedError, UNAUTHORIZED_ERROR};

/// Headers set on every response unless a handler already chose a value.
pub const SECURITY_HEADERS: [(&str, &str); 7] = [
    ("x-dns-prefetch-control", "off"),
    ("x-frame-options", "SAMEORIGIN"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-download-options", "noopen"),
    ("x-content-type-options", "nosniff"),
    ("x-xss-protection", "0"),
    ("referrer-policy", "no-referrer"),
];

pub fn security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

/// Last error stage. `UnauthorizedError` becomes
/// `401 {"error":"UnauthorizedError: <message>"}`; anything else raised
/// becomes a generic 500.
pub async fn intercept_errors(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    let Some(raised) = res.extensions().get::<RaisedError>().cloned() else {
        return res;
    };

    if raised.name == UNAUTHORIZED_ERROR {
        warn!(message = %raised.message, "unauthorized");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new(format!("{}: {}", raised.name, raised.message))),
        )
            .into_response();
    }

    error!(name = raised.name, message = %raised.message, "unhandled error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal server error")),
    )
        .into_response()
}

/// Panic response for `CatchPanicLayer`; raised so the interceptor answers.
pub fn raise_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "panic".to_string()
    };
    let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();
    res.extensions_mut().insert(RaisedError {
        name: "Panic",
        message,
    });
    res
}
