//! Route handlers of the ObjectSchemas collection.
//!
//! Each handler opens an envelope, runs a linear async sequence that returns
//! either a success status or a [`ResourceError`], and hands both to
//! [`reply`], the single terminal point that stops the timer, records metrics
//! and writes the response.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::config::ResourceConfig;
use crate::http::request::RequestContext;
use crate::model::ObjectSchema;
use crate::observability::metrics;
use crate::store::ObjectSchemaStore;

use super::envelope::{ResponseEnvelope, SearchResultMeta};
use super::errors::{ResourceError, ResourceResult};
use super::hypermedia::{Hypermedia, COLLECTION_PATH, COUNT_PATH};
use super::params::{
    parse_query, validate_query, EntityParameters, ListParameters, ParamSpec, QueryPairs,
    COUNT_PARAMS, DELETE_PARAMS, LIST_PARAMS, READ_PARAMS, WRITE_PARAMS,
};
use super::projection::{project_entity, project_search, raw};
use super::search::to_search_options;

/// Shared, read-only state of the collection handlers.
pub struct ResourceState<S> {
    pub store: Arc<S>,
    pub hypermedia: Arc<Hypermedia>,
    pub list_defaults: ListParameters,
    pub strict_query_validation: bool,
}

impl<S> Clone for ResourceState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hypermedia: Arc::clone(&self.hypermedia),
            list_defaults: self.list_defaults.clone(),
            strict_query_validation: self.strict_query_validation,
        }
    }
}

impl<S: ObjectSchemaStore> ResourceState<S> {
    pub fn new(store: Arc<S>, config: &ResourceConfig) -> Self {
        Self {
            store,
            hypermedia: Arc::new(Hypermedia::new(config.auth_schemes.iter().cloned())),
            list_defaults: ListParameters::with_default_limit(config.default_limit),
            strict_query_validation: config.strict_query_validation,
        }
    }

    /// Decode the query and, in strict mode, type-check recognized params.
    fn query(&self, specs: &[ParamSpec], raw: Option<&str>) -> ResourceResult<QueryPairs> {
        let query = parse_query(raw);
        if self.strict_query_validation {
            validate_query(specs, &query)?;
        }
        Ok(query)
    }
}

/// Routes of the collection. Unknown paths get an envelope 404 and
/// unsupported methods on known paths an envelope 405.
pub fn routes<S: ObjectSchemaStore>(state: ResourceState<S>) -> Router {
    let entity = format!("{}/{{id}}", COLLECTION_PATH);
    let versioned_entity = format!("{}/{{id}}/{{version}}", COLLECTION_PATH);

    Router::new()
        .route(COLLECTION_PATH, get(list_schemas::<S>).post(create_schema::<S>))
        .route(COUNT_PATH, get(count_schemas::<S>))
        .route(&entity, get(get_schema::<S>).delete(delete_schema::<S>))
        .route(&versioned_entity, put(replace_schema::<S>))
        .method_not_allowed_fallback(unsupported_method)
        .fallback(unknown_route)
        .with_state(state)
}

/// Terminal step of every request.
fn reply(
    ctx: &RequestContext,
    operation: &'static str,
    mut envelope: ResponseEnvelope,
    outcome: ResourceResult<StatusCode>,
) -> Response {
    let status = match outcome {
        Ok(status) => status,
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                tracing::error!(request_id = %ctx.request_id, operation, error = %err, "request failed");
            } else {
                tracing::warn!(request_id = %ctx.request_id, operation, status = status.as_u16(), error = %err, "request rejected");
            }
            envelope.fail(&err);
            status
        }
    };
    envelope.meta.stop_timer();
    metrics::record_request(ctx.method.as_str(), operation, status.as_u16(), envelope.meta.elapsed());
    (status, Json(envelope)).into_response()
}

fn parse_body(body: &Bytes) -> ResourceResult<Value> {
    serde_json::from_slice(body).map_err(|e| ResourceError::MalformedBody(e.to_string()))
}

// ============================================================================
// List
// ============================================================================

async fn list_schemas<S: ObjectSchemaStore>(
    State(state): State<ResourceState<S>>,
    ctx: RequestContext,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let mut envelope = ResponseEnvelope::for_request(&ctx);
    let outcome = list(&state, &ctx, raw_query.as_deref(), &mut envelope).await;
    reply(&ctx, "list", envelope, outcome)
}

async fn list<S: ObjectSchemaStore>(
    state: &ResourceState<S>,
    ctx: &RequestContext,
    raw_query: Option<&str>,
    envelope: &mut ResponseEnvelope,
) -> ResourceResult<StatusCode> {
    let query = state.query(LIST_PARAMS, raw_query)?;
    let params = ListParameters::resolve(&state.list_defaults, &query, ctx);
    let options = to_search_options(&params, ctx);

    let response = state.store.search(&options).await?;

    let page = SearchResultMeta {
        limit: params.limit,
        offset: params.offset,
        total: response.hits.total,
        count: response.hits.hits.len() as u64,
    };
    envelope.meta.search_result = Some(page);
    envelope.set_data(project_search(&response, params.projection())?);
    if params.wants_actions() {
        envelope.actions = Some(state.hypermedia.collection_actions());
    }
    if params.wants_links() {
        envelope.links = Some(state.hypermedia.page_links(&query, &page));
    }
    Ok(StatusCode::OK)
}

// ============================================================================
// Count
// ============================================================================

async fn count_schemas<S: ObjectSchemaStore>(
    State(state): State<ResourceState<S>>,
    ctx: RequestContext,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let mut envelope = ResponseEnvelope::for_request(&ctx);
    let outcome = count(&state, &ctx, raw_query.as_deref(), &mut envelope).await;
    reply(&ctx, "count", envelope, outcome)
}

async fn count<S: ObjectSchemaStore>(
    state: &ResourceState<S>,
    ctx: &RequestContext,
    raw_query: Option<&str>,
    envelope: &mut ResponseEnvelope,
) -> ResourceResult<StatusCode> {
    let query = state.query(COUNT_PARAMS, raw_query)?;
    let params = EntityParameters::resolve(COUNT_PARAMS, &query, ctx);

    let total = state.store.count(params.timeout).await?;

    envelope.set_data(json!({ "count": total }));
    if params.wants_links() {
        envelope.links = Some(state.hypermedia.count_links(&query));
    }
    Ok(StatusCode::OK)
}

// ============================================================================
// Create
// ============================================================================

async fn create_schema<S: ObjectSchemaStore>(
    State(state): State<ResourceState<S>>,
    ctx: RequestContext,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Response {
    let mut envelope = ResponseEnvelope::for_request(&ctx);
    let outcome = create(&state, &ctx, raw_query.as_deref(), &body, &mut envelope).await;
    reply(&ctx, "create", envelope, outcome)
}

async fn create<S: ObjectSchemaStore>(
    state: &ResourceState<S>,
    ctx: &RequestContext,
    raw_query: Option<&str>,
    body: &Bytes,
    envelope: &mut ResponseEnvelope,
) -> ResourceResult<StatusCode> {
    let query = state.query(WRITE_PARAMS, raw_query)?;
    let params = EntityParameters::resolve(WRITE_PARAMS, &query, ctx);
    let schema = ObjectSchema::from_payload(parse_body(body)?)?;

    // Not atomic with the create below; concurrent requests can both pass.
    let existing = state
        .store
        .find_by_namespace_version(&schema.namespace, &schema.version)
        .await?;
    if existing.hits.total > 0 {
        return Err(ResourceError::Duplicate {
            namespace: schema.namespace,
            version: schema.version,
        });
    }

    let result = state.store.create(&schema).await?;
    tracing::info!(request_id = %ctx.request_id, id = %result.id, namespace = %schema.namespace, version = %schema.version, "object schema created");

    if params.projection().is_raw() {
        envelope.set_data(raw(&result)?);
    } else {
        envelope.set_data(json!({ "id": result.id }));
    }
    if params.wants_actions() {
        envelope.actions = Some(state.hypermedia.entity_actions(&result.id, result.version));
    }
    if params.wants_links() {
        envelope.links = Some(state.hypermedia.entity_links(&result.id));
    }
    Ok(StatusCode::CREATED)
}

// ============================================================================
// Replace
// ============================================================================

async fn replace_schema<S: ObjectSchemaStore>(
    State(state): State<ResourceState<S>>,
    ctx: RequestContext,
    Path((id, version)): Path<(String, String)>,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Response {
    let mut envelope = ResponseEnvelope::for_request(&ctx);
    let outcome = replace(&state, &ctx, &id, &version, raw_query.as_deref(), &body, &mut envelope).await;
    reply(&ctx, "replace", envelope, outcome)
}

fn parse_path_version(version: &str) -> ResourceResult<u64> {
    match version.parse::<u64>() {
        Ok(v) if v >= 1 => Ok(v),
        _ => Err(ResourceError::InvalidPathVersion(version.to_string())),
    }
}

async fn replace<S: ObjectSchemaStore>(
    state: &ResourceState<S>,
    ctx: &RequestContext,
    id: &str,
    path_version: &str,
    raw_query: Option<&str>,
    body: &Bytes,
    envelope: &mut ResponseEnvelope,
) -> ResourceResult<StatusCode> {
    let query = state.query(WRITE_PARAMS, raw_query)?;
    let params = EntityParameters::resolve(WRITE_PARAMS, &query, ctx);
    let expected_version = parse_path_version(path_version)?;

    let payload = parse_body(body)?;
    if let Some(payload_id) = payload.get("id").and_then(Value::as_str).map(str::trim) {
        if payload_id != id {
            return Err(ResourceError::IdMismatch {
                payload_id: payload_id.to_string(),
                path_id: id.to_string(),
            });
        }
    }
    let mut schema = ObjectSchema::from_payload(payload)?;
    schema.id = id.to_string();

    let current = state.store.get_by_id(id, params.timeout).await?;
    if let Some(created_on) = current
        .source
        .get("createdOn")
        .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v.clone()).ok())
    {
        schema.created_on = created_on;
    }

    let result = state.store.replace(&schema, expected_version).await?;
    tracing::info!(request_id = %ctx.request_id, id = %result.id, version = result.version, "object schema replaced");

    if params.projection().is_raw() {
        envelope.set_data(raw(&result)?);
    } else {
        envelope.set_data(json!({ "id": result.id, "version": result.version }));
    }
    if params.wants_actions() {
        envelope.actions = Some(state.hypermedia.entity_actions(&result.id, result.version));
    }
    if params.wants_links() {
        envelope.links = Some(state.hypermedia.entity_links(&result.id));
    }
    Ok(StatusCode::OK)
}

// ============================================================================
// Get
// ============================================================================

async fn get_schema<S: ObjectSchemaStore>(
    State(state): State<ResourceState<S>>,
    ctx: RequestContext,
    Path(id): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let mut envelope = ResponseEnvelope::for_request(&ctx);
    let outcome = fetch(&state, &ctx, &id, raw_query.as_deref(), &mut envelope).await;
    reply(&ctx, "get", envelope, outcome)
}

async fn fetch<S: ObjectSchemaStore>(
    state: &ResourceState<S>,
    ctx: &RequestContext,
    id: &str,
    raw_query: Option<&str>,
    envelope: &mut ResponseEnvelope,
) -> ResourceResult<StatusCode> {
    let query = state.query(READ_PARAMS, raw_query)?;
    let params = EntityParameters::resolve(READ_PARAMS, &query, ctx);

    let result = state.store.get_by_id(id, params.timeout).await?;

    envelope.set_data(project_entity(&result, params.projection())?);
    if params.wants_actions() {
        envelope.actions = Some(state.hypermedia.entity_actions(&result.id, result.version));
    }
    if params.wants_links() {
        envelope.links = Some(state.hypermedia.entity_links(&result.id));
    }
    Ok(StatusCode::OK)
}

// ============================================================================
// Delete
// ============================================================================

async fn delete_schema<S: ObjectSchemaStore>(
    State(state): State<ResourceState<S>>,
    ctx: RequestContext,
    Path(id): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let mut envelope = ResponseEnvelope::for_request(&ctx);
    let outcome = delete(&state, &ctx, &id, raw_query.as_deref(), &mut envelope).await;
    reply(&ctx, "delete", envelope, outcome)
}

async fn delete<S: ObjectSchemaStore>(
    state: &ResourceState<S>,
    ctx: &RequestContext,
    id: &str,
    raw_query: Option<&str>,
    envelope: &mut ResponseEnvelope,
) -> ResourceResult<StatusCode> {
    let query = state.query(DELETE_PARAMS, raw_query)?;
    let params = EntityParameters::resolve(DELETE_PARAMS, &query, ctx);

    let result = state.store.delete_by_id(id, true, params.timeout).await?;
    if result.found {
        tracing::info!(request_id = %ctx.request_id, id = %result.id, "object schema deleted");
    }

    if params.projection().is_raw() {
        envelope.set_data(raw(&result)?);
    } else {
        envelope.set_data(json!({
            "found": result.found,
            "id": result.id,
            "version": result.version,
        }));
    }
    if params.wants_actions() {
        envelope.actions = Some(state.hypermedia.collection_actions());
    }
    if params.wants_links() {
        envelope.links = Some(state.hypermedia.collection_links());
    }

    Ok(if result.found {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    })
}

// ============================================================================
// Fallback
// ============================================================================

async fn unknown_route(ctx: RequestContext) -> Response {
    let envelope = ResponseEnvelope::for_request(&ctx);
    let err = ResourceError::UnknownRoute(ctx.path.clone());
    reply(&ctx, "unknown", envelope, Err(err))
}

async fn unsupported_method(ctx: RequestContext) -> Response {
    let envelope = ResponseEnvelope::for_request(&ctx);
    let err = ResourceError::MethodNotAllowed {
        method: ctx.method.to_string(),
        path: ctx.path.clone(),
    };
    reply(&ctx, "unsupported", envelope, Err(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResourceConfig, StoreConfig};
    use crate::store::{DeleteResult, GetResult, IndexResult, MemoryStore, SearchOptions, SearchResponse, StoreResult};
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    fn app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(&StoreConfig::default()));
        let state = ResourceState::new(Arc::clone(&store), &ResourceConfig::default());
        (routes(state), store)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_parse_path_version() {
        assert_eq!(parse_path_version("3").unwrap(), 3);
        assert!(parse_path_version("0").is_err());
        assert!(parse_path_version("-1").is_err());
        assert!(parse_path_version("one").is_err());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (app, _) = app();
        let (status, body) = call(
            &app,
            Method::POST,
            COLLECTION_PATH,
            Some(json!({"namespace": "ns://x", "version": "1.0.0", "description": "first"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert_eq!(body["actions"][0]["name"], "delete");
        assert_eq!(body["links"][0]["relation"], "self");
        assert!(body["meta"]["processingTimeMs"].is_u64());

        let (status, body) = call(&app, Method::GET, &format!("{}/{}", COLLECTION_PATH, id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["namespace"], "ns://x");
        assert_eq!(body["data"]["description"], "first");
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_store() {
        let (app, store) = app();
        let (status, body) = call(&app, Method::POST, COLLECTION_PATH, Some(json!({"version": "1.0.0"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["userMessage"]["bad_data"], "Invalid Object Schema.");
        assert!(body.get("data").is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (app, _) = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri(COLLECTION_PATH)
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_strict_query_validation() {
        let (app, _) = app();
        let (status, body) = call(&app, Method::GET, &format!("{}?limit=ten", COLLECTION_PATH), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["userMessage"]["bad_query"].is_string());

        let (status, _) = call(&app, Method::GET, &format!("{}?unknown=ten", COLLECTION_PATH), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_lenient_query_falls_back() {
        let store = Arc::new(MemoryStore::new(&StoreConfig::default()));
        let config = ResourceConfig {
            strict_query_validation: false,
            ..ResourceConfig::default()
        };
        let app = routes(ResourceState::new(store, &config));
        let (status, body) = call(&app, Method::GET, &format!("{}?limit=ten", COLLECTION_PATH), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["searchResult"]["limit"], 10);
    }

    #[tokio::test]
    async fn test_replace_keeps_created_on() {
        let (app, _) = app();
        let (_, created) = call(
            &app,
            Method::POST,
            COLLECTION_PATH,
            Some(json!({"namespace": "ns://x", "version": "1.0.0", "createdOn": "2020-01-01T00:00:00Z"})),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("{}/{}/1", COLLECTION_PATH, id),
            Some(json!({"namespace": "ns://x", "version": "1.0.1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"id": id, "version": 2}));

        let (_, fetched) = call(&app, Method::GET, &format!("{}/{}?version=true", COLLECTION_PATH, id), None).await;
        assert_eq!(fetched["data"]["version"], 2);
        assert_eq!(fetched["data"]["data"]["version"], "1.0.1");
        assert_eq!(fetched["data"]["data"]["createdOn"], "2020-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_replace_stale_version_conflicts() {
        let (app, _) = app();
        let (_, created) = call(
            &app,
            Method::POST,
            COLLECTION_PATH,
            Some(json!({"namespace": "ns://x", "version": "1.0.0"})),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();
        let uri = format!("{}/{}/1", COLLECTION_PATH, id);
        let payload = json!({"namespace": "ns://x", "version": "1.0.0"});

        let (status, _) = call(&app, Method::PUT, &uri, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&app, Method::PUT, &uri, Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], 409);
    }

    #[tokio::test]
    async fn test_replace_missing_entity() {
        let (app, _) = app();
        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("{}/nope/1", COLLECTION_PATH),
            Some(json!({"namespace": "ns://x", "version": "1.0.0"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_count_and_unknown_route() {
        let (app, _) = app();
        for v in ["1.0.0", "1.0.1"] {
            call(&app, Method::POST, COLLECTION_PATH, Some(json!({"namespace": "ns://x", "version": v}))).await;
        }
        let (status, body) = call(&app, Method::GET, COUNT_PATH, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 2);
        assert_eq!(body["links"][0]["href"], COUNT_PATH);

        let (status, body) = call(&app, Method::GET, "/v2/elsewhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 404);
        assert_eq!(body["meta"]["path"], "/v2/elsewhere");
    }

    #[tokio::test]
    async fn test_unsupported_method_gets_envelope() {
        let (app, _) = app();
        let (status, body) = call(&app, Method::DELETE, COUNT_PATH, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"]["code"], 405);
        assert!(body["error"]["userMessage"]["not_allowed"].is_string());
        assert_eq!(body["meta"]["path"], COUNT_PATH);

        let (status, body) = call(&app, Method::PATCH, COLLECTION_PATH, Some(json!({}))).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["meta"]["method"], "PATCH");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_unsafe_ids_rejected() {
        let (app, store) = app();
        for id in ["a/b", "count", "a b", ".."] {
            let (status, body) = call(
                &app,
                Method::POST,
                COLLECTION_PATH,
                Some(json!({"id": id, "namespace": "ns://x", "version": "1.0.0"})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "id {id:?}");
            assert!(body["error"]["userMessage"]["bad_data"].is_string());
        }
        assert!(store.is_empty());

        let (status, _) = call(
            &app,
            Method::POST,
            COLLECTION_PATH,
            Some(json!({"id": "schema-1.a_b~c", "namespace": "ns://x", "version": "1.0.0"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = call(&app, Method::GET, &format!("{}/schema-1.a_b~c", COLLECTION_PATH), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_replace_payload_id_is_trimmed() {
        let (app, _) = app();
        call(
            &app,
            Method::POST,
            COLLECTION_PATH,
            Some(json!({"id": "abc", "namespace": "ns://x", "version": "1.0.0"})),
        )
        .await;

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("{}/abc/1", COLLECTION_PATH),
            Some(json!({"id": " abc ", "namespace": "ns://x", "version": "1.0.1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"id": "abc", "version": 2}));

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("{}/abc/2", COLLECTION_PATH),
            Some(json!({"id": " other", "namespace": "ns://x", "version": "1.0.1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["developerMessage"].as_str().unwrap().contains("other"));
    }

    #[tokio::test]
    async fn test_delete_links_to_collection() {
        let (app, _) = app();
        call(
            &app,
            Method::POST,
            COLLECTION_PATH,
            Some(json!({"id": "abc", "namespace": "ns://x", "version": "1.0.0"})),
        )
        .await;

        let (status, body) = call(&app, Method::DELETE, &format!("{}/abc", COLLECTION_PATH), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["links"][0]["relation"], "self");
        assert_eq!(body["links"][0]["href"], COLLECTION_PATH);

        let (status, body) = call(&app, Method::DELETE, &format!("{}/abc?links=false", COLLECTION_PATH), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.get("links").is_none());
    }

    /// Records the timeout hint each id-addressed call receives.
    struct TimeoutRecorder {
        inner: MemoryStore,
        seen: std::sync::Mutex<Vec<(&'static str, Option<u64>)>>,
    }

    impl TimeoutRecorder {
        fn record(&self, op: &'static str, timeout: Option<u64>) {
            self.seen.lock().unwrap().push((op, timeout));
        }
    }

    impl ObjectSchemaStore for TimeoutRecorder {
        async fn search(&self, options: &SearchOptions) -> StoreResult<SearchResponse> {
            self.record("search", options.timeout);
            self.inner.search(options).await
        }

        async fn count(&self, timeout: Option<u64>) -> StoreResult<u64> {
            self.record("count", timeout);
            self.inner.count(timeout).await
        }

        async fn find_by_namespace_version(&self, namespace: &str, version: &str) -> StoreResult<SearchResponse> {
            self.inner.find_by_namespace_version(namespace, version).await
        }

        async fn create(&self, schema: &ObjectSchema) -> StoreResult<IndexResult> {
            self.inner.create(schema).await
        }

        async fn get_by_id(&self, id: &str, timeout: Option<u64>) -> StoreResult<GetResult> {
            self.record("get", timeout);
            self.inner.get_by_id(id, timeout).await
        }

        async fn replace(&self, schema: &ObjectSchema, expected_version: u64) -> StoreResult<IndexResult> {
            self.inner.replace(schema, expected_version).await
        }

        async fn delete_by_id(&self, id: &str, refresh: bool, timeout: Option<u64>) -> StoreResult<DeleteResult> {
            self.record("delete", timeout);
            self.inner.delete_by_id(id, refresh, timeout).await
        }
    }

    #[tokio::test]
    async fn test_timeout_reaches_store() {
        let store = Arc::new(TimeoutRecorder {
            inner: MemoryStore::new(&StoreConfig::default()),
            seen: std::sync::Mutex::new(Vec::new()),
        });
        let app = routes(ResourceState::new(Arc::clone(&store), &ResourceConfig::default()));
        call(
            &app,
            Method::POST,
            COLLECTION_PATH,
            Some(json!({"id": "abc", "namespace": "ns://x", "version": "1.0.0"})),
        )
        .await;

        call(&app, Method::GET, &format!("{}?timeout=250", COUNT_PATH), None).await;
        call(&app, Method::GET, &format!("{}/abc?timeout=250", COLLECTION_PATH), None).await;
        call(&app, Method::GET, &format!("{}/abc", COLLECTION_PATH), None).await;
        let (status, _) = call(&app, Method::DELETE, &format!("{}/abc?timeout=250", COLLECTION_PATH), None).await;
        assert_eq!(status, StatusCode::OK);

        let seen = store.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![("count", Some(250)), ("get", Some(250)), ("get", None), ("delete", Some(250))]
        );
    }

    #[tokio::test]
    async fn test_data_only_drops_hypermedia() {
        let (app, _) = app();
        let (_, body) = call(&app, Method::GET, &format!("{}?dataOnly=true", COLLECTION_PATH), None).await;
        assert!(body.get("actions").is_none());
        assert!(body.get("links").is_none());
        assert!(body["data"]["hits"].is_array());
    }
}
