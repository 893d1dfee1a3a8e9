//! Port abstraction for console account persistence.
use async_trait::async_trait;

use crate::domain::{UserAccount, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "user repository query failed: {message}",
        /// The username is already taken.
        DuplicateUsername { username } => "username {username} already exists",
    }
}

/// Account together with its stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Account fields.
    pub account: UserAccount,
    /// PHC-format Argon2 hash.
    pub password_hash: String,
}

/// Console account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account; usernames are unique.
    async fn create(
        &self,
        account: &UserAccount,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch an account and its hash by username.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// All accounts ordered by username.
    async fn list(&self) -> Result<Vec<UserAccount>, UserPersistenceError>;
}
