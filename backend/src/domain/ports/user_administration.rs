//! Driving port for console account administration.

use async_trait::async_trait;

use crate::domain::{Error, GroupId, Role, UserAccount};

/// Raw account creation input; validation happens in the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
    /// Console role.
    pub role: Role,
    /// Group, required for client-role users.
    pub group_id: Option<GroupId>,
}

/// Console account management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Validate, hash and store a new account.
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserAccount, Error>;

    /// Accounts ordered by username, without password hashes.
    async fn list_users(&self) -> Result<Vec<UserAccount>, Error>;
}
