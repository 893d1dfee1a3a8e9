//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **sat_api**: reqwest client for the remote conversion and SAT API
//! - **password**: Argon2id password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod password;
pub mod persistence;
pub mod sat_api;
