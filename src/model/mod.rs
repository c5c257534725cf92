//! Domain model.
//!
//! The registry exposes a single entity, the [`ObjectSchema`], identified by
//! a generated id and unique by `(namespace, version)`.

pub mod object_schema;

pub use object_schema::{ObjectSchema, ValidationError};
