//! Console user accounts: usernames, roles, and creation requests.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{GroupId, UserId};

/// Maximum accepted username length in characters.
pub const USERNAME_MAX: usize = 64;

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username was blank.
    EmptyUsername,
    /// Username exceeded the length limit.
    UsernameTooLong {
        /// Allowed length.
        max: usize,
    },
    /// Password was blank.
    EmptyPassword,
    /// Role was neither `admin` nor `client`.
    UnknownRole {
        /// Role received.
        value: String,
    },
    /// Client-role users need a group.
    MissingGroup,
    /// Admins cannot belong to a group.
    UnexpectedGroup,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::UnknownRole { value } => {
                write!(f, "role must be admin or client, got '{value}'")
            }
            Self::MissingGroup => write!(f, "client users must belong to a group"),
            Self::UnexpectedGroup => write!(f, "admin users cannot belong to a group"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Trimmed, non-empty login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and trim `raw`.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Console role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages groups, users, clients and SAT workflows.
    Admin,
    /// Uploads e.firma material on behalf of one group.
    Client,
}

impl Role {
    /// Stored role name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "client" | "cliente" => Ok(Self::Client),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored account without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Account id.
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    /// Login name.
    #[schema(value_type = String)]
    pub username: Username,
    /// Console role.
    pub role: Role,
    /// Whether the account may sign in.
    pub active: bool,
    /// Group of a client-role user.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub group_id: Option<GroupId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Validated request to create a console user.
///
/// ## Invariants
/// - `username` and `password` are trimmed and non-empty.
/// - `role == Client` implies `group_id.is_some()`; admins carry no group.
///
/// # Examples
/// ```
/// use satisfacture::domain::{NewUser, Role, UserValidationError};
///
/// let err = NewUser::try_new("ana", "pw", Role::Client, None).unwrap_err();
/// assert_eq!(err, UserValidationError::MissingGroup);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    username: Username,
    password: Zeroizing<String>,
    role: Role,
    group_id: Option<GroupId>,
}

impl NewUser {
    /// Validate a creation request.
    pub fn try_new(
        username: &str,
        password: &str,
        role: Role,
        group_id: Option<GroupId>,
    ) -> Result<Self, UserValidationError> {
        let username = Username::new(username)?;
        let password = password.trim();
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        match (role, &group_id) {
            (Role::Client, None) => return Err(UserValidationError::MissingGroup),
            (Role::Admin, Some(_)) => return Err(UserValidationError::UnexpectedGroup),
            _ => {}
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
            role,
            group_id,
        })
    }

    /// Login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plain-text password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Requested group.
    pub fn group_id(&self) -> Option<&GroupId> {
        self.group_id.as_ref()
    }
}
