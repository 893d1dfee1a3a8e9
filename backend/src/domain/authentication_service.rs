//! Credential verification for console logins.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{LoginService, PasswordHasher, UserPersistenceError, UserRepository};
use crate::domain::{Error, LoginCredentials, UserAccount, Username};

const INVALID_CREDENTIALS: &str = "invalid credentials";

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username {username} already exists")).with_details(
                serde_json::json!({ "code": "duplicate_username", "username": username }),
            )
        }
    }
}

/// Run a CPU-bound hasher call on tokio's blocking pool so Argon2 never
/// stalls a request worker.
pub(crate) async fn on_blocking_pool<H, T, F>(hasher: &Arc<H>, job: F) -> Result<T, Error>
where
    H: PasswordHasher + 'static,
    T: Send + 'static,
    F: FnOnce(&H) -> T + Send + 'static,
{
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || job(hasher.as_ref()))
        .await
        .map_err(|error| Error::internal(format!("password hashing task failed: {error}")))
}

/// Service implementing [`LoginService`] over a user repository and a
/// password hasher.
#[derive(Clone)]
pub struct AuthenticationService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AuthenticationService<U, H> {
    /// Create the service over a user store and password hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<U, H> LoginService for AuthenticationService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserAccount, Error> {
        // A name that cannot be stored cannot match either.
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some(stored) = self
            .users
            .find_credentials(&username)
            .await
            .map_err(map_user_persistence_error)?
        else {
            debug!(%username, "login for unknown user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !stored.account.active {
            debug!(%username, "login for inactive user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        let password = Zeroizing::new(credentials.password().to_owned());
        let hash = stored.password_hash;
        let verified = on_blocking_pool(&self.hasher, move |hasher| {
            hasher.verify(password.as_str(), &hash)
        })
        .await?;
        match verified {
            Ok(true) => Ok(stored.account),
            Ok(false) => Err(Error::unauthorized(INVALID_CREDENTIALS)),
            Err(error) => {
                warn!(%username, %error, "password verification failed");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }
}
