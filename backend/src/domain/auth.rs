//! Login credentials and the authenticated principal kept in the session.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{GroupId, Role, UserAccount, UserId};

/// Validation failures for login payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was empty.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Credentials submitted on the login screen.
///
/// The username is trimmed; the password is kept verbatim and zeroised on
/// drop.
///
/// # Examples
/// ```
/// use satisfacture::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("  admin ", "s3cret").unwrap();
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw username and password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Submitted username, trimmed.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Submitted password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Identity of the signed-in console user.
///
/// Stored inside the cookie session, so it carries only identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Account id.
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    /// Login name.
    pub username: String,
    /// Console role.
    pub role: Role,
    /// Group of a client-role user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub group_id: Option<GroupId>,
}

impl Principal {
    /// Whether the principal holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&UserAccount> for Principal {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.id.clone(),
            username: account.username.as_ref().to_owned(),
            role: account.role,
            group_id: account.group_id.clone(),
        }
    }
}
