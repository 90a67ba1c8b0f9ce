//! Course feedback backend.
//!
//! Hexagonal layout: [`domain`] holds the record model, validation and use
//! cases; [`outbound`] implements the record store; [`inbound`] exposes the
//! HTTP API; [`server`] wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
