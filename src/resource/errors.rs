//! Error taxonomy of the resource layer.

use axum::http::StatusCode;
use thiserror::Error;

use crate::model::ValidationError;
use crate::store::StoreError;

/// Result type for resource operations
pub type ResourceResult<T> = Result<T, ResourceError>;

impl From<serde_json::Error> for ResourceError {
    fn from(err: serde_json::Error) -> Self {
        ResourceError::Encoding(err.to_string())
    }
}

/// Errors a request can end in.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Payload failed entity validation
    #[error(transparent)]
    InvalidPayload(#[from] ValidationError),

    /// Body is not JSON at all
    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(String),

    /// Payload id and path id disagree
    #[error("ObjectSchema.id in the payload does not match the id specified in the URL : {payload_id} !== {path_id}")]
    IdMismatch { payload_id: String, path_id: String },

    /// Path version is not a positive integer
    #[error("Version in the URL must be an integer >= 1, got '{0}'")]
    InvalidPathVersion(String),

    /// Recognized query parameter with a value of the wrong type
    #[error("Query parameter '{name}' expects {expected}, got '{value}'")]
    InvalidQuery {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Uniqueness key already taken
    #[error("An ObjectSchema with namespace '{namespace}' and version '{version}' already exists. Namespace and version must be unique.")]
    Duplicate { namespace: String, version: String },

    /// No route for the request
    #[error("No resource at {0}")]
    UnknownRoute(String),

    /// Route exists but does not support the method
    #[error("{method} is not supported on {path}")]
    MethodNotAllowed { method: String, path: String },

    // ==================
    // Storage collaborator
    // ==================
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Response payload could not be encoded
    #[error("Failed to encode response payload: {0}")]
    Encoding(String),
}

impl ResourceError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResourceError::InvalidPayload(_)
            | ResourceError::MalformedBody(_)
            | ResourceError::IdMismatch { .. }
            | ResourceError::InvalidPathVersion(_)
            | ResourceError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            ResourceError::Duplicate { .. } => StatusCode::CONFLICT,
            ResourceError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            ResourceError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ResourceError::Store(err) => {
                StatusCode::from_u16(err.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ResourceError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Key of the user-facing message.
    pub fn category(&self) -> &'static str {
        match self {
            ResourceError::InvalidQuery { .. } => "bad_query",
            ResourceError::InvalidPayload(_)
            | ResourceError::MalformedBody(_)
            | ResourceError::IdMismatch { .. }
            | ResourceError::InvalidPathVersion(_) => "bad_data",
            ResourceError::Duplicate { .. } => "dup_err",
            ResourceError::UnknownRoute(_) => "not_found",
            ResourceError::MethodNotAllowed { .. } => "not_allowed",
            ResourceError::Encoding(_) => "server_error",
            ResourceError::Store(_) => match self.status_code() {
                StatusCode::NOT_FOUND => "not_found",
                StatusCode::CONFLICT => "conflict",
                _ => "server_error",
            },
        }
    }

    /// Generic text shown to end users; internal detail stays in the
    /// developer message.
    pub fn user_message(&self) -> &'static str {
        match self.category() {
            "bad_query" => "Invalid query parameters.",
            "bad_data" => "Invalid Object Schema.",
            "dup_err" => "An Object Schema with the same namespace and version already exists.",
            "not_found" => "Object Schema not found.",
            "conflict" => "The Object Schema was modified by another request.",
            "not_allowed" => "This operation is not supported on the resource.",
            _ => "Failed to process object schemas because of unexpected server error.",
        }
    }
}
