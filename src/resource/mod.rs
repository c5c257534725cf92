//! The ObjectSchemas resource collection.
//!
//! # Data Flow
//! ```text
//! request
//!     → params.rs (resolve typed, defaulted parameters)
//!     → search.rs (list only: parameters → SearchOptions)
//!     → ObjectSchemaStore (async)
//!     → projection.rs (shape `data`)
//!     → hypermedia.rs (`actions`, `links`)
//!     → envelope.rs (meta/data/actions/links/error)
//!     → handlers.rs reply (stop timer, metrics, JSON)
//! ```
//!
//! # Design Decisions
//! - Per-request state lives in the handler's task and is dropped at reply
//! - Defaults are immutable; resolution returns new values
//! - One projection decision per request instead of per-endpoint branching

pub mod envelope;
pub mod errors;
pub mod handlers;
pub mod hypermedia;
pub mod params;
pub mod projection;
pub mod search;

pub use envelope::{ErrorInfo, ResponseEnvelope, ResponseMeta, SearchResultMeta};
pub use errors::{ResourceError, ResourceResult};
pub use handlers::{routes, ResourceState};
pub use hypermedia::{Action, Hypermedia, Link, Relation};
pub use params::{EntityParameters, ListParameters, SortSpec};
pub use projection::{FieldSelection, Projection, ProjectionMode};
