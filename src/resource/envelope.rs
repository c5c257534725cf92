//! The canonical response envelope.
//!
//! Every response of the collection, success or failure, is a
//! [`ResponseEnvelope`]: `meta` always, then either `data` or `error`,
//! plus optional `actions` and `links`.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::http::request::RequestContext;

use super::errors::ResourceError;
use super::hypermedia::{Action, Link};

/// Paging facts of a search-backed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchResultMeta {
    pub limit: u64,
    pub offset: u64,
    /// Matching entities in storage.
    pub total: u64,
    /// Entities actually returned.
    pub count: u64,
}

/// Per-response metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub path: String,
    pub method: String,
    /// Identifies this response instance for diagnostics; never persisted.
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_result: Option<SearchResultMeta>,
    #[serde(skip)]
    started: Instant,
}

impl ResponseMeta {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            processing_time_ms: None,
            search_result: None,
            started: Instant::now(),
        }
    }

    /// Record the processing time. Only the first call has an effect.
    pub fn stop_timer(&mut self) {
        if self.processing_time_ms.is_none() {
            self.processing_time_ms = Some(self.started.elapsed().as_millis() as u64);
        }
    }

    /// Wall-clock time since the request was received.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Error section of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: u16,
    /// Internal detail for developers.
    pub developer_message: String,
    /// Generic text for end users, keyed by error category.
    pub user_message: BTreeMap<String, String>,
}

impl From<&ResourceError> for ErrorInfo {
    fn from(err: &ResourceError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            developer_message: err.to_string(),
            user_message: BTreeMap::from([(
                err.category().to_string(),
                err.user_message().to_string(),
            )]),
        }
    }
}

/// The uniform response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub meta: ResponseMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl ResponseEnvelope {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            meta: ResponseMeta::new(path, method),
            data: None,
            actions: None,
            links: None,
            error: None,
        }
    }

    /// Envelope for the request described by `ctx`.
    pub fn for_request(ctx: &RequestContext) -> Self {
        Self::new(ctx.path.clone(), ctx.method.as_str())
    }

    pub fn set_data(&mut self, data: Value) {
        self.data = Some(data);
    }

    /// Replace any partial success content with the error block.
    pub fn fail(&mut self, err: &ResourceError) {
        self.data = None;
        self.actions = None;
        self.links = None;
        self.error = Some(ErrorInfo::from(err));
    }
}
