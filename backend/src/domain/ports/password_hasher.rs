//! Port for one-way password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed.
        Hash { message } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message } => "stored password hash is malformed: {message}",
    }
}

/// Hash and verify passwords. Implementations are CPU-bound and synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a self-describing hash string for `password`.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against `hash`. A mismatch is `Ok(false)`.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
