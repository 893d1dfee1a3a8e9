//! Console account administration and the start-up admin seed.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::authentication_service::{map_user_persistence_error, on_blocking_pool};
use crate::domain::ports::{
    CreateUserRequest, GroupRepository, GroupRepositoryError, PasswordHasher, UserAdministration,
    UserRepository,
};
use crate::domain::{Error, NewUser, Role, UserAccount, UserId, UserValidationError, Username};

fn map_validation_error(error: UserValidationError) -> Error {
    let (field, code) = match &error {
        UserValidationError::EmptyUsername => ("username", "empty_username"),
        UserValidationError::UsernameTooLong { .. } => ("username", "username_too_long"),
        UserValidationError::EmptyPassword => ("password", "empty_password"),
        UserValidationError::UnknownRole { .. } => ("role", "unknown_role"),
        UserValidationError::MissingGroup => ("groupId", "missing_group"),
        UserValidationError::UnexpectedGroup => ("groupId", "unexpected_group"),
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn map_group_lookup_error(error: GroupRepositoryError) -> Error {
    match error {
        GroupRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        other => Error::internal(format!("group repository error: {other}")),
    }
}

/// Credentials for the admin account seeded at start-up.
#[derive(Clone)]
pub struct BootstrapAdmin {
    username: String,
    password: Option<Zeroizing<String>>,
}

impl BootstrapAdmin {
    /// Seed credentials; a blank password disables seeding.
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password: password
                .filter(|value| !value.trim().is_empty())
                .map(Zeroizing::new),
        }
    }

    /// Login name of the seeded admin.
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Service implementing [`UserAdministration`].
#[derive(Clone)]
pub struct UserAdminService<U, G, H> {
    users: Arc<U>,
    groups: Arc<G>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, G, H> UserAdminService<U, G, H> {
    /// Create the service from its collaborators.
    pub fn new(users: Arc<U>, groups: Arc<G>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            groups,
            hasher,
            clock,
        }
    }
}

impl<U, G, H> UserAdminService<U, G, H>
where
    U: UserRepository,
    G: GroupRepository,
    H: PasswordHasher + 'static,
{
    async fn store(&self, new_user: NewUser) -> Result<UserAccount, Error> {
        if let Some(group_id) = new_user.group_id() {
            let exists = self
                .groups
                .find_by_id(group_id)
                .await
                .map_err(map_group_lookup_error)?
                .is_some();
            if !exists {
                return Err(Error::not_found(format!("group {group_id} not found"))
                    .with_details(json!({ "code": "group_not_found", "groupId": group_id })));
            }
        }

        let password = Zeroizing::new(new_user.password().to_owned());
        let password_hash = on_blocking_pool(&self.hasher, move |hasher| {
            hasher.hash(password.as_str())
        })
        .await?
        .map_err(|error| Error::internal(format!("failed to hash password: {error}")))?;
        let account = UserAccount {
            id: UserId::random(),
            username: new_user.username().clone(),
            role: new_user.role(),
            active: true,
            group_id: new_user.group_id().cloned(),
            created_at: self.clock.utc(),
        };
        self.users
            .create(&account, &password_hash)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %account.id, username = %account.username, role = %account.role, "user created");
        Ok(account)
    }

    /// Create the configured admin when it does not exist yet.
    ///
    /// Returns `true` when an account was created. Without a configured
    /// password nothing is seeded.
    pub async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapAdmin) -> Result<bool, Error> {
        let Some(password) = bootstrap.password.as_ref() else {
            warn!(
                username = bootstrap.username(),
                "no bootstrap admin password configured; skipping admin seed"
            );
            return Ok(false);
        };
        let username = Username::new(bootstrap.username()).map_err(map_validation_error)?;
        let existing = self
            .users
            .find_credentials(&username)
            .await
            .map_err(map_user_persistence_error)?;
        if existing.is_some() {
            return Ok(false);
        }
        let new_user = NewUser::try_new(username.as_ref(), password.as_str(), Role::Admin, None)
            .map_err(map_validation_error)?;
        self.store(new_user).await?;
        info!(username = %username, "bootstrap admin created");
        Ok(true)
    }
}

#[async_trait]
impl<U, G, H> UserAdministration for UserAdminService<U, G, H>
where
    U: UserRepository,
    G: GroupRepository,
    H: PasswordHasher + 'static,
{
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserAccount, Error> {
        let new_user = NewUser::try_new(
            &request.username,
            &request.password,
            request.role,
            request.group_id,
        )
        .map_err(map_validation_error)?;
        self.store(new_user).await
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>, Error> {
        self.users.list().await.map_err(map_user_persistence_error)
    }
}

#[cfg(test)]
#[path = "user_admin_service_tests.rs"]
mod tests;
