//! SAT document console backend.
//!
//! Hexagonal layout: [`domain`] holds entities, ports and services;
//! [`inbound`] adapts HTTP requests; [`outbound`] talks to PostgreSQL, the
//! remote SAT API and the password hasher.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
