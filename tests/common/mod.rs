//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use objectschema_registry::config::{ServiceConfig, StoreConfig};
use objectschema_registry::http::HttpServer;
use objectschema_registry::lifecycle::Shutdown;
use objectschema_registry::model::ObjectSchema;
use objectschema_registry::store::{
    DeleteResult, GetResult, IndexResult, ObjectSchemaStore, SearchOptions, SearchResponse,
    StoreError, StoreResult,
};
use objectschema_registry::MemoryStore;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const COLLECTION: &str = "/v1/resources/objectschemas";

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub async fn get(&self, path_and_query: &str) -> (u16, Value) {
        let res = self.client.get(self.url(path_and_query)).send().await.expect("server unreachable");
        (res.status().as_u16(), res.json().await.expect("envelope"))
    }

    pub async fn post(&self, path_and_query: &str, body: &Value) -> (u16, Value) {
        let res = self
            .client
            .post(self.url(path_and_query))
            .json(body)
            .send()
            .await
            .expect("server unreachable");
        (res.status().as_u16(), res.json().await.expect("envelope"))
    }

    pub async fn put(&self, path_and_query: &str, body: &Value) -> (u16, Value) {
        let res = self
            .client
            .put(self.url(path_and_query))
            .json(body)
            .send()
            .await
            .expect("server unreachable");
        (res.status().as_u16(), res.json().await.expect("envelope"))
    }

    pub async fn delete(&self, path_and_query: &str) -> (u16, Value) {
        let res = self.client.delete(self.url(path_and_query)).send().await.expect("server unreachable");
        (res.status().as_u16(), res.json().await.expect("envelope"))
    }

    /// Create a schema and return its id.
    pub async fn create(&self, namespace: &str, version: &str) -> String {
        let (status, body) = self
            .post(COLLECTION, &json!({"namespace": namespace, "version": version}))
            .await;
        assert_eq!(status, 201, "create failed: {}", body);
        body["data"]["id"].as_str().expect("id").to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the server over `store` with `config`.
pub async fn start_server_with<S: ObjectSchemaStore>(config: ServiceConfig, store: Arc<S>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    TestServer { addr, shutdown, client }
}

/// Start the server over a fresh in-memory store.
#[allow(dead_code)]
pub async fn start_server() -> (TestServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new(&StoreConfig::default()));
    let server = start_server_with(ServiceConfig::default(), Arc::clone(&store)).await;
    (server, store)
}

/// A store whose every call fails, counting the calls it receives.
#[allow(dead_code)]
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicU32,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> StoreResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable(
            "connection refused by search node 10.1.2.3:9200".into(),
        ))
    }
}

impl ObjectSchemaStore for FailingStore {
    async fn search(&self, _options: &SearchOptions) -> StoreResult<SearchResponse> {
        self.fail()
    }

    async fn count(&self, _timeout: Option<u64>) -> StoreResult<u64> {
        self.fail()
    }

    async fn find_by_namespace_version(&self, _namespace: &str, _version: &str) -> StoreResult<SearchResponse> {
        self.fail()
    }

    async fn create(&self, _schema: &ObjectSchema) -> StoreResult<IndexResult> {
        self.fail()
    }

    async fn get_by_id(&self, _id: &str, _timeout: Option<u64>) -> StoreResult<GetResult> {
        self.fail()
    }

    async fn replace(&self, _schema: &ObjectSchema, _expected_version: u64) -> StoreResult<IndexResult> {
        self.fail()
    }

    async fn delete_by_id(
        &self,
        _id: &str,
        _refresh: bool,
        _timeout: Option<u64>,
    ) -> StoreResult<DeleteResult> {
        self.fail()
    }
}
