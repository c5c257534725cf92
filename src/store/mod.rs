//! Storage collaborator subsystem.
//!
//! # Data Flow
//! ```text
//! resource handlers
//!     → ObjectSchemaStore (trait, async)
//!     → engine implementation (memory.rs)
//!     → native result types (types.rs) or StoreError (errors.rs)
//! ```
//!
//! # Design Decisions
//! - Handlers are generic over the trait; no trait objects on the hot path
//! - Results keep the engine's native shape so `raw=true` can pass them through
//! - Durability, ranking and conflict resolution belong to the engine

use std::future::Future;

pub mod errors;
pub mod memory;
pub mod types;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use types::{
    DeleteResult, GetResult, IndexResult, SearchHit, SearchHits, SearchOptions, SearchResponse,
    SortField,
};

use crate::model::ObjectSchema;

/// The search/persistence engine holding ObjectSchemas.
///
/// Every operation is asynchronous and may fail with an engine-specific
/// [`StoreError`].
pub trait ObjectSchemaStore: Send + Sync + 'static {
    /// Run a paged search.
    fn search(
        &self,
        options: &SearchOptions,
    ) -> impl Future<Output = StoreResult<SearchResponse>> + Send;

    /// Number of documents in the collection. `timeout` is an engine-side
    /// hint in milliseconds, as on [`SearchOptions`].
    fn count(&self, timeout: Option<u64>) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Look up documents by their uniqueness key.
    fn find_by_namespace_version(
        &self,
        namespace: &str,
        version: &str,
    ) -> impl Future<Output = StoreResult<SearchResponse>> + Send;

    /// Index a new document; fails if the id is taken.
    fn create(
        &self,
        schema: &ObjectSchema,
    ) -> impl Future<Output = StoreResult<IndexResult>> + Send;

    /// Fetch a document by id.
    fn get_by_id(
        &self,
        id: &str,
        timeout: Option<u64>,
    ) -> impl Future<Output = StoreResult<GetResult>> + Send;

    /// Replace a document, provided its current version is `expected_version`.
    fn replace(
        &self,
        schema: &ObjectSchema,
        expected_version: u64,
    ) -> impl Future<Output = StoreResult<IndexResult>> + Send;

    /// Delete a document by id. `refresh` asks the engine to make the delete
    /// visible to searches immediately.
    fn delete_by_id(
        &self,
        id: &str,
        refresh: bool,
        timeout: Option<u64>,
    ) -> impl Future<Output = StoreResult<DeleteResult>> + Send;
}
