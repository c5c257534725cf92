//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the collection's handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Serve on a listener until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::resource::{routes, ResourceState};
use crate::store::ObjectSchemaStore;

/// HTTP server for the ObjectSchemas collection.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server over the given store.
    pub fn new<S: ObjectSchemaStore>(config: ServiceConfig, store: Arc<S>) -> Self {
        let state = ResourceState::new(store, &config.resource);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    /// The last layer added is the outermost.
    #[allow(deprecated)]
    fn build_router<S: ObjectSchemaStore>(config: &ServiceConfig, state: ResourceState<S>) -> Router {
        routes(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a message arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            default_limit = self.config.resource.default_limit,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::http::request::X_REQUEST_ID;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let store = Arc::new(MemoryStore::new(&StoreConfig::default()));
        HttpServer::new(ServiceConfig::default(), store)
    }

    #[tokio::test]
    async fn test_request_id_generated_and_echoed() {
        let response = server()
            .router()
            .oneshot(Request::get("/v1/resources/objectschemas").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
        assert_eq!(id.len(), 36);
    }

    #[tokio::test]
    async fn test_client_request_id_kept() {
        let response = server()
            .router()
            .oneshot(
                Request::get("/v1/resources/objectschemas/count")
                    .header(X_REQUEST_ID, "client-chosen")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "client-chosen");
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut config = ServiceConfig::default();
        config.security.max_body_size = 64;
        let store = Arc::new(MemoryStore::new(&StoreConfig::default()));
        let server = HttpServer::new(config, store);

        let body = format!("{{\"namespace\":\"ns://x\",\"version\":\"1.0.0\",\"description\":\"{}\"}}", "x".repeat(200));
        let response = server
            .router()
            .oneshot(
                Request::post("/v1/resources/objectschemas")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
