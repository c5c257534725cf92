//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, graceful shutdown)
//!     → request.rs (request ID, trace span, RequestContext)
//!     → resource handlers
//!     → JSON envelope to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestContext, X_REQUEST_ID};
pub use server::HttpServer;
