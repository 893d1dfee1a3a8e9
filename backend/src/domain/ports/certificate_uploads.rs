//! Driving port for forwarding e.firma files to the remote API.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{
    CertificateBundle, ClientSubmission, ConsentNotice, Error, Principal, Taxpayer,
    UploadLogEntry,
};

/// Outcome of an accepted upload.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Remote response body.
    pub api: Value,
    /// Local client record after the upload, when the RFC is registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Taxpayer>,
    /// Upload log entry written for this attempt.
    pub log_entry: UploadLogEntry,
}

/// Certificate uploads for both console roles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateUploads: Send + Sync {
    /// Notice a client-role user must accept before uploading.
    async fn consent_notice(&self, principal: &Principal) -> Result<ConsentNotice, Error>;

    /// Upload on behalf of a client-role user who accepted the notice.
    async fn upload_as_client(
        &self,
        principal: &Principal,
        submission: ClientSubmission,
    ) -> Result<UploadReceipt, Error>;

    /// Upload on behalf of an admin.
    async fn upload_as_admin(
        &self,
        principal: &Principal,
        bundle: CertificateBundle,
    ) -> Result<UploadReceipt, Error>;
}
