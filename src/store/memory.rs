//! In-process search engine.
//!
//! # Responsibilities
//! - Hold ObjectSchema documents with per-document versions
//! - Answer paged, sorted, field-projected searches
//! - Enforce create-if-absent and optimistic-concurrency replace
//!
//! # Design Decisions
//! - `DashMap` gives per-shard locking; no global lock across operations
//! - Versions start at 1 and increase on every replace and delete
//! - Searches work on a snapshot, so a page is consistent with its `total`

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use chrono::DateTime;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::config::StoreConfig;
use crate::model::ObjectSchema;
use crate::observability::metrics;

use super::errors::{StoreError, StoreResult};
use super::types::{
    DeleteResult, GetResult, IndexResult, SearchHit, SearchHits, SearchOptions, SearchResponse,
    SortField,
};
use super::ObjectSchemaStore;

#[derive(Debug, Clone)]
struct StoredDocument {
    version: u64,
    source: Value,
}

/// A thread-safe, in-memory ObjectSchema index.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    index: String,
    doc_type: String,
    documents: Arc<DashMap<String, StoredDocument>>,
}

impl MemoryStore {
    /// Create an empty store for the configured index.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            index: config.index.clone(),
            doc_type: config.doc_type.clone(),
            documents: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn snapshot(&self) -> Vec<(String, StoredDocument)> {
        self.documents
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    fn hit(&self, id: String, doc: StoredDocument, options: &SearchOptions) -> SearchHit {
        let version = options.versioned.then_some(doc.version);
        match &options.return_fields {
            Some(fields) => SearchHit {
                index: self.index.clone(),
                doc_type: self.doc_type.clone(),
                id,
                version,
                source: None,
                fields: Some(project_fields(&doc.source, fields)),
            },
            None => SearchHit {
                index: self.index.clone(),
                doc_type: self.doc_type.clone(),
                id,
                version,
                source: Some(doc.source),
                fields: None,
            },
        }
    }

    fn run_search(
        &self,
        mut matches: Vec<(String, StoredDocument)>,
        options: &SearchOptions,
    ) -> SearchResponse {
        let started = Instant::now();

        let default_sort = [SortField::desc("updatedOn")];
        let sort = options.multi_field_sort.as_deref().unwrap_or(&default_sort);
        matches.sort_by(|(a_id, a), (b_id, b)| {
            sort.iter()
                .map(|term| {
                    let ord = compare_json_values(a.source.get(&term.field), b.source.get(&term.field));
                    if term.descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or_else(|| a_id.cmp(b_id))
        });

        let total = matches.len() as u64;
        let hits = matches
            .into_iter()
            .skip(usize::try_from(options.from).unwrap_or(usize::MAX))
            .take(usize::try_from(options.page_size).unwrap_or(usize::MAX))
            .map(|(id, doc)| self.hit(id, doc, options))
            .collect();

        SearchResponse {
            took: started.elapsed().as_millis() as u64,
            timed_out: false,
            hits: SearchHits { total, hits },
        }
    }
}

impl ObjectSchemaStore for MemoryStore {
    async fn search(&self, options: &SearchOptions) -> StoreResult<SearchResponse> {
        tracing::debug!(index = %self.index, options = ?options, "search");
        let response = self.run_search(self.snapshot(), options);
        metrics::record_store_operation("search", "ok");
        Ok(response)
    }

    async fn count(&self, timeout: Option<u64>) -> StoreResult<u64> {
        tracing::debug!(index = %self.index, timeout_ms = ?timeout, "count");
        metrics::record_store_operation("count", "ok");
        Ok(self.documents.len() as u64)
    }

    async fn find_by_namespace_version(
        &self,
        namespace: &str,
        version: &str,
    ) -> StoreResult<SearchResponse> {
        let matches = self
            .snapshot()
            .into_iter()
            .filter(|(_, doc)| {
                doc.source.get("namespace").and_then(Value::as_str) == Some(namespace)
                    && doc.source.get("version").and_then(Value::as_str) == Some(version)
            })
            .collect();
        let options = SearchOptions {
            page_size: 10,
            from: 0,
            return_fields: None,
            timeout: None,
            versioned: true,
            multi_field_sort: None,
        };
        metrics::record_store_operation("find_by_namespace_version", "ok");
        Ok(self.run_search(matches, &options))
    }

    async fn create(&self, schema: &ObjectSchema) -> StoreResult<IndexResult> {
        let result = match self.documents.entry(schema.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists {
                id: schema.id.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(StoredDocument {
                    version: 1,
                    source: schema.to_document(),
                });
                Ok(IndexResult {
                    index: self.index.clone(),
                    doc_type: self.doc_type.clone(),
                    id: schema.id.clone(),
                    version: 1,
                    created: true,
                })
            }
        };
        observe("create", result)
    }

    async fn get_by_id(&self, id: &str, timeout: Option<u64>) -> StoreResult<GetResult> {
        tracing::debug!(index = %self.index, id = %id, timeout_ms = ?timeout, "get");
        let result = self
            .documents
            .get(id)
            .map(|doc| GetResult {
                index: self.index.clone(),
                doc_type: self.doc_type.clone(),
                id: id.to_string(),
                version: doc.version,
                found: true,
                source: doc.source.clone(),
            })
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() });
        observe("get_by_id", result)
    }

    async fn replace(&self, schema: &ObjectSchema, expected_version: u64) -> StoreResult<IndexResult> {
        let result = match self.documents.get_mut(&schema.id) {
            None => Err(StoreError::NotFound {
                id: schema.id.clone(),
            }),
            Some(doc) if doc.version != expected_version => Err(StoreError::VersionConflict {
                id: schema.id.clone(),
                current: doc.version,
                expected: expected_version,
            }),
            Some(mut doc) => {
                doc.version += 1;
                doc.source = schema.to_document();
                Ok(IndexResult {
                    index: self.index.clone(),
                    doc_type: self.doc_type.clone(),
                    id: schema.id.clone(),
                    version: doc.version,
                    created: false,
                })
            }
        };
        observe("replace", result)
    }

    async fn delete_by_id(
        &self,
        id: &str,
        refresh: bool,
        timeout: Option<u64>,
    ) -> StoreResult<DeleteResult> {
        // Writes are visible to the next snapshot, so refresh is only recorded.
        tracing::debug!(index = %self.index, id = %id, refresh, timeout_ms = ?timeout, "delete");
        let removed = self.documents.remove(id);
        let result = DeleteResult {
            index: self.index.clone(),
            doc_type: self.doc_type.clone(),
            id: id.to_string(),
            version: removed.as_ref().map(|(_, doc)| doc.version + 1),
            found: removed.is_some(),
        };
        metrics::record_store_operation("delete_by_id", if result.found { "ok" } else { "not_found" });
        Ok(result)
    }
}

fn observe<T>(operation: &'static str, result: StoreResult<T>) -> StoreResult<T> {
    match &result {
        Ok(_) => metrics::record_store_operation(operation, "ok"),
        Err(e) => metrics::record_store_operation(operation, e.kind()),
    }
    result
}

/// Keep only the requested top-level fields of a document.
fn project_fields(source: &Value, fields: &[String]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|field| source.get(field).map(|v| (field.clone(), v.clone())))
        .collect()
}

/// RFC 3339 timestamps compare by instant; chrono drops trailing fractional
/// zeros, so their text order is not time order.
fn compare_strings(a: &str, b: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Order two optional JSON values; present values sort before missing ones.
fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&b.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => compare_strings(a, b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
