//! The ObjectSchema entity and its construction from client payloads.
//!
//! # Responsibilities
//! - Validate raw JSON payloads into well-formed entities
//! - Normalize fields (trimmed strings, generated id, timestamps)
//!
//! # Design Decisions
//! - Construction is synchronous and side-effect free apart from reading the clock
//! - The uniqueness key is `(namespace, version)`; enforcing it belongs to the caller

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while turning a payload into an [`ObjectSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ObjectSchema payload must be a JSON object")]
    NotAnObject,

    #[error("ObjectSchema payload is malformed: {0}")]
    Malformed(String),

    #[error("ObjectSchema.{0} is required")]
    MissingField(&'static str),

    #[error("ObjectSchema.id must not be blank")]
    BlankId,

    #[error("ObjectSchema.id '{0}' must be a single URL path segment of letters, digits, '-', '_', '.' or '~', and not 'count'")]
    InvalidId(String),

    #[error("ObjectSchema.namespace '{0}' must look like ns://host/path")]
    InvalidNamespace(String),

    #[error("ObjectSchema.version '{0}' must be a semantic version (MAJOR.MINOR.PATCH)")]
    InvalidVersion(String),
}

/// A registered object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    pub id: String,
    pub namespace: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_definitions: Option<Map<String, Value>>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// Loosely typed view of an incoming payload; every field is optional so
/// missing fields produce a precise [`ValidationError`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
    id: Option<String>,
    namespace: Option<String>,
    version: Option<String>,
    description: Option<String>,
    type_definitions: Option<Map<String, Value>>,
    created_on: Option<DateTime<Utc>>,
}

/// Ids are addressed as one path segment under the collection, next to the
/// `count` sub-resource.
const RESERVED_ID: &str = "count";

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_~-][A-Za-z0-9._~-]*$").expect("valid id regex"))
}

fn namespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^ns://[^\s/]+(/\S*)?$").expect("valid namespace regex"))
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid version regex"))
}

impl ObjectSchema {
    /// Build a new schema with a generated id, stamped now.
    pub fn new(namespace: impl Into<String>, version: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            namespace: namespace.into(),
            version: version.into(),
            description: None,
            type_definitions: None,
            created_on: now,
            updated_on: now,
        }
    }

    /// Validate and normalize a raw client payload.
    ///
    /// A missing `id` is generated; `createdOn` is kept when supplied and
    /// `updatedOn` is always stamped with the current time.
    pub fn from_payload(payload: Value) -> Result<Self, ValidationError> {
        if !payload.is_object() {
            return Err(ValidationError::NotAnObject);
        }
        let payload: Payload =
            serde_json::from_value(payload).map_err(|e| ValidationError::Malformed(e.to_string()))?;

        let id = match payload.id {
            Some(id) if id.trim().is_empty() => return Err(ValidationError::BlankId),
            Some(id) => id.trim().to_string(),
            None => Uuid::new_v4().to_string(),
        };
        if id == RESERVED_ID || !id_pattern().is_match(&id) {
            return Err(ValidationError::InvalidId(id));
        }

        let namespace = payload
            .namespace
            .map(|s| s.trim().to_string())
            .ok_or(ValidationError::MissingField("namespace"))?;
        if !namespace_pattern().is_match(&namespace) {
            return Err(ValidationError::InvalidNamespace(namespace));
        }

        let version = payload
            .version
            .map(|s| s.trim().to_string())
            .ok_or(ValidationError::MissingField("version"))?;
        if !version_pattern().is_match(&version) {
            return Err(ValidationError::InvalidVersion(version));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            namespace,
            version,
            description: payload
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            type_definitions: payload.type_definitions,
            created_on: payload.created_on.unwrap_or(now),
            updated_on: now,
        })
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The document form stored in and returned by the search engine.
    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
