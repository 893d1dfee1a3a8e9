//! Client groups and their denormalised member lists.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ClientId, GroupId, derive_slug};

/// Maximum accepted group name length in characters.
pub const GROUP_NAME_MAX: usize = 120;

/// Validation errors for group names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    /// Name was blank after trimming.
    EmptyName,
    /// Name exceeded the length limit.
    NameTooLong {
        /// Allowed length.
        max: usize,
    },
}

impl fmt::Display for GroupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "group name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "group name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for GroupValidationError {}

/// Trimmed group name paired with its derived slug.
///
/// # Examples
/// ```
/// use satisfacture::domain::GroupName;
///
/// let name = GroupName::new("  Grupo Norte ").unwrap();
/// assert_eq!(name.as_ref(), "Grupo Norte");
/// assert_eq!(name.slug(), "grupo-norte");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupName {
    name: String,
    slug: String,
}

impl GroupName {
    /// Validate and trim `raw`, deriving its slug.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GroupValidationError> {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            return Err(GroupValidationError::EmptyName);
        }
        if name.chars().count() > GROUP_NAME_MAX {
            return Err(GroupValidationError::NameTooLong {
                max: GROUP_NAME_MAX,
            });
        }
        Ok(Self {
            name: name.to_owned(),
            slug: derive_slug(name),
        })
    }

    /// URL-safe form of the name.
    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        self.name.as_str()
    }
}

/// Stored group.
///
/// `member_ids` mirrors the clients whose group reference points here; the
/// persistence adapter keeps both sides in step inside one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group id.
    #[schema(value_type = String, format = Uuid)]
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Unique URL-safe name.
    pub slug: String,
    /// Clients assigned to the group.
    #[schema(value_type = Vec<String>)]
    pub member_ids: Vec<ClientId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Outcome of a bulk assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignment {
    /// Number of clients now belonging to the group.
    pub assigned: usize,
    /// Clients that could not be assigned.
    #[schema(value_type = Vec<String>)]
    pub failed: Vec<ClientId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_blank_names(#[case] raw: &str) {
        assert_eq!(GroupName::new(raw), Err(GroupValidationError::EmptyName));
    }

    #[rstest]
    fn rejects_overlong_names() {
        let raw = "x".repeat(GROUP_NAME_MAX + 1);
        assert!(matches!(
            GroupName::new(raw),
            Err(GroupValidationError::NameTooLong { .. })
        ));
    }

    #[rstest]
    fn names_differing_in_spacing_share_a_slug() {
        let first = GroupName::new("Grupo Norte").expect("valid");
        let second = GroupName::new("  grupo   norte  ").expect("valid");
        assert_eq!(first.slug(), second.slug());
        assert_ne!(first.as_ref(), second.as_ref());
    }
}
