//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types return a
//! plain message on failure; each repository maps it into its own error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    ClientId, Group, GroupId, Rfc, Role, StoredCfdi, StoredMetadata, Taxpayer, UploadLogEntry,
    UserAccount, UserId, Username,
};

use super::schema::{cfdi, clients, groups, metadata, uploads, users};

// ---------------------------------------------------------------------------
// Group models
// ---------------------------------------------------------------------------

/// Row struct for reading from the groups table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub member_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Self {
            id: GroupId::from_uuid(row.id),
            name: row.name,
            slug: row.slug,
            member_ids: row.member_ids.into_iter().map(ClientId::from_uuid).collect(),
            created_at: row.created_at,
        }
    }
}

/// Insertable struct for creating group records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = groups)]
pub(crate) struct NewGroupRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
    pub member_ids: &'a [Uuid],
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Client models
// ---------------------------------------------------------------------------

/// Row struct for reading from the clients table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClientRow {
    pub id: Uuid,
    pub rfc: String,
    pub legal_name: Option<String>,
    pub group_id: Option<Uuid>,
}

impl From<ClientRow> for Taxpayer {
    fn from(row: ClientRow) -> Self {
        Self {
            id: ClientId::from_uuid(row.id),
            rfc: Rfc::from_stored(&row.rfc),
            legal_name: row.legal_name,
            group_id: row.group_id.map(GroupId::from_uuid),
        }
    }
}

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Split into the account and its password hash.
    pub(crate) fn into_parts(self) -> Result<(UserAccount, String), String> {
        let username = Username::new(&self.username)
            .map_err(|err| format!("stored username {:?} is invalid: {err}", self.username))?;
        let role: Role = self
            .role
            .parse()
            .map_err(|err| format!("stored role is invalid: {err}"))?;
        let account = UserAccount {
            id: UserId::from_uuid(self.id),
            username,
            role,
            active: self.active,
            group_id: self.group_id.map(GroupId::from_uuid),
            created_at: self.created_at,
        };
        Ok((account, self.password_hash))
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub active: bool,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Upload log models
// ---------------------------------------------------------------------------

/// Row struct for reading from the uploads table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = uploads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UploadRow {
    pub id: Uuid,
    pub rfc: String,
    pub uploader_username: String,
    pub uploader_name: Option<String>,
    pub group_id: Option<Uuid>,
    pub consent_registered: bool,
    pub status_code: i32,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UploadRow> for UploadLogEntry {
    type Error = String;

    fn try_from(row: UploadRow) -> Result<Self, Self::Error> {
        let status_code = u16::try_from(row.status_code)
            .map_err(|_| format!("stored status code {} is out of range", row.status_code))?;
        Ok(Self {
            id: row.id,
            rfc: Rfc::from_stored(&row.rfc),
            uploader_username: row.uploader_username,
            uploader_name: row.uploader_name,
            group_id: row.group_id.map(GroupId::from_uuid),
            consent_registered: row.consent_registered,
            status_code,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for appending upload log entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = uploads)]
pub(crate) struct NewUploadRow<'a> {
    pub id: Uuid,
    pub rfc: &'a str,
    pub uploader_username: &'a str,
    pub uploader_name: Option<&'a str>,
    pub group_id: Option<Uuid>,
    pub consent_registered: bool,
    pub status_code: i32,
    pub api_payload: &'a serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Document models
// ---------------------------------------------------------------------------

/// Row struct for reading from the cfdi table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cfdi)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CfdiRow {
    pub id: Uuid,
    pub client_rfc: String,
    pub uuid: Option<String>,
    pub xml: serde_json::Value,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<CfdiRow> for StoredCfdi {
    fn from(row: CfdiRow) -> Self {
        Self {
            id: row.id,
            client_rfc: Rfc::from_stored(&row.client_rfc),
            uuid: row.uuid,
            xml: row.xml,
            processed_at: row.processed_at,
        }
    }
}

/// Row struct for reading from the metadata table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = metadata)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MetadataRow {
    pub id: Uuid,
    pub client_rfc: String,
    pub document: serde_json::Value,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<MetadataRow> for StoredMetadata {
    fn from(row: MetadataRow) -> Self {
        Self {
            id: row.id,
            client_rfc: Rfc::from_stored(&row.client_rfc),
            document: row.document,
            processed_at: row.processed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::service_test_support::fixture_timestamp;
    use rstest::rstest;

    fn user_row(role: &str, group_id: Option<Uuid>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "ana".to_owned(),
            password_hash: "$argon2id$v=19$stub".to_owned(),
            role: role.to_owned(),
            active: true,
            group_id,
            created_at: fixture_timestamp(),
        }
    }

    #[rstest]
    fn user_row_splits_hash_from_account() {
        let group = Uuid::new_v4();
        let (account, hash) = user_row("client", Some(group))
            .into_parts()
            .expect("valid row");
        assert_eq!(account.role, Role::Client);
        assert_eq!(account.group_id, Some(GroupId::from_uuid(group)));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[rstest]
    fn unknown_stored_role_is_rejected() {
        let err = user_row("auditor", None).into_parts().expect_err("bad role");
        assert!(err.contains("role"));
    }

    #[rstest]
    fn client_row_keeps_legacy_rfc() {
        let row = ClientRow {
            id: Uuid::new_v4(),
            rfc: "abcd0101011".to_owned(),
            legal_name: None,
            group_id: None,
        };
        assert_eq!(Taxpayer::from(row).rfc.as_ref(), "ABCD0101011");
    }

    #[rstest]
    #[case(200, true)]
    #[case(-1, false)]
    #[case(70_000, false)]
    fn upload_row_status_must_fit_http_range(#[case] status: i32, #[case] ok: bool) {
        let row = UploadRow {
            id: Uuid::new_v4(),
            rfc: "ABC010101AAA".to_owned(),
            uploader_username: "ana".to_owned(),
            uploader_name: None,
            group_id: None,
            consent_registered: false,
            status_code: status,
            created_at: fixture_timestamp(),
        };
        assert_eq!(UploadLogEntry::try_from(row).is_ok(), ok);
    }

    #[rstest]
    fn group_row_maps_member_ids() {
        let member = Uuid::new_v4();
        let group = Group::from(GroupRow {
            id: Uuid::new_v4(),
            name: "Grupo Norte".to_owned(),
            slug: "grupo-norte".to_owned(),
            member_ids: vec![member],
            created_at: fixture_timestamp(),
        });
        assert_eq!(group.member_ids, vec![ClientId::from_uuid(member)]);
    }
}
