//! UUID-backed identifiers for console entities.

use std::fmt;

/// Validation failure for identifier inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdError {
    kind: &'static str,
}

impl fmt::Display for InvalidIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} must be a valid UUID", self.kind)
    }
}

impl std::error::Error for InvalidIdError {}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Parse an identifier from its hyphenated string form.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidIdError> {
                let raw = raw.as_ref();
                if raw.trim() != raw {
                    return Err(InvalidIdError { kind: $kind });
                }
                uuid::Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| InvalidIdError { kind: $kind })
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a random v4 id.
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Borrow the underlying UUID.
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_id!(
    /// Console user account identifier.
    UserId => "user id"
);
define_id!(
    /// Group identifier.
    GroupId => "group id"
);
define_id!(
    /// Client (taxpayer) identifier.
    ClientId => "client id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn rejects_malformed_ids(#[case] raw: &str) {
        let err = GroupId::new(raw).expect_err("malformed id");
        assert_eq!(err.to_string(), "group id must be a valid UUID");
    }

    #[rstest]
    fn serialises_as_plain_string() {
        let id = ClientId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"");
        let back: ClientId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, id);
    }
}
