//! Append-only audit trail of certificate uploads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{GroupId, Rfc};

/// Entry to append after the SAT API answered an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUploadLogEntry {
    /// Client the upload was for.
    pub rfc: Rfc,
    /// Signed-in user who uploaded.
    pub uploader_username: String,
    /// Name typed on the form.
    pub uploader_name: Option<String>,
    /// Uploader's group.
    pub group_id: Option<GroupId>,
    /// Whether the confidentiality notice was accepted.
    pub consent_registered: bool,
    /// HTTP status returned by the SAT API.
    pub status_code: u16,
    /// Body returned by the SAT API.
    pub api_payload: Value,
    /// When the upload happened.
    pub created_at: DateTime<Utc>,
}

/// Stored upload log entry.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadLogEntry {
    /// Entry id.
    pub id: Uuid,
    /// Client the upload was for.
    #[schema(value_type = String)]
    pub rfc: Rfc,
    /// Signed-in user who uploaded.
    pub uploader_username: String,
    /// Name typed on the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader_name: Option<String>,
    /// Uploader's group.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub group_id: Option<GroupId>,
    /// Whether the confidentiality notice was accepted.
    pub consent_registered: bool,
    /// HTTP status returned by the SAT API.
    pub status_code: u16,
    /// When the upload happened.
    pub created_at: DateTime<Utc>,
}

/// Local client edits applied after a successful client-role upload.
///
/// `group_id` is only applied when the client has no group yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientUploadUpdate {
    /// Client to update.
    pub rfc: Rfc,
    /// Legal name to store, if given.
    pub legal_name: Option<String>,
    /// Group to adopt when none is set.
    pub group_id: Option<GroupId>,
}
