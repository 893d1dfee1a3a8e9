//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Connections come from a `bb8` pool through
//! `diesel-async`; multi-row writes run inside one transaction.
//!
//! # Example
//!
//! ```no_run
//! use satisfacture::outbound::persistence::{DbPool, DieselGroupRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/sat")).await?;
//! let groups = DieselGroupRepository::new(pool);
//! # let _ = groups;
//! # Ok(())
//! # }
//! ```

pub(crate) mod diesel_helpers;
mod diesel_document_repository;
mod diesel_group_repository;
mod diesel_taxpayer_repository;
mod diesel_upload_log_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_document_repository::DieselDocumentRepository;
pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_taxpayer_repository::DieselTaxpayerRepository;
pub use diesel_upload_log_repository::DieselUploadLogRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
