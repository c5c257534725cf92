//! ObjectSchema registry library.
//!
//! A hypermedia REST collection of ObjectSchemas over a search-backed store.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod resource;
pub mod store;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{MemoryStore, ObjectSchemaStore};
