//! Request identification and the request-scoped diagnostic context.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the client sent none
//! - Echo the ID back on the response
//! - Hand each handler a [`RequestContext`] it passes explicitly to the
//!   resolver, translator and store calls for its debug tracing
//!
//! # Design Decisions
//! - Request ID added as early as possible (outermost layer) for tracing
//! - The context is plain owned data, created per request and dropped with it

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderName, Method, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that assigns an `x-request-id` to requests missing one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

fn request_id_of(headers: &axum::http::HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Span for the HTTP trace layer, tagged with the request ID.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id_of(request.headers()),
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Per-request diagnostic context.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            method,
            path: path.into(),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            request_id: request_id_of(&parts.headers),
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_from_parts() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("http://localhost/v1/resources/objectschemas/abc?raw=true")
            .header(X_REQUEST_ID, "req-1")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.request_id, "req-1");
        assert_eq!(ctx.method, Method::DELETE);
        assert_eq!(ctx.path, "/v1/resources/objectschemas/abc");
    }

    #[tokio::test]
    async fn test_missing_request_id() {
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.request_id, "unknown");
    }
}
