//! Certificate uploads: consent notice, remote conversion call and audit log.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};

use crate::domain::ports::{
    CertificateUploads, GroupRepository, GroupRepositoryError, RemoteResponse, SatGateway,
    SatOperation, UploadLogRepository, UploadLogRepositoryError, UploadReceipt,
};
use crate::domain::sat_workflow_service::{map_gateway_error, upstream_rejection};
use crate::domain::{
    CertificateBundle, ClientSubmission, ClientUploadUpdate, ConsentNotice, Error, GroupId,
    NewUploadLogEntry, Principal, Role,
};

/// Group label used when the user's group cannot be resolved.
const UNKNOWN_GROUP_LABEL: &str = "(grupo)";

fn map_log_error(error: UploadLogRepositoryError) -> Error {
    match error {
        UploadLogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("upload log unavailable: {message}"))
        }
        UploadLogRepositoryError::Query { message } => {
            Error::internal(format!("upload log error: {message}"))
        }
    }
}

fn map_group_error(error: GroupRepositoryError) -> Error {
    match error {
        GroupRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        other => Error::internal(format!("group repository error: {other}")),
    }
}

fn client_group(principal: &Principal) -> Result<&GroupId, Error> {
    if principal.role != Role::Client {
        return Err(Error::forbidden("client role required"));
    }
    principal
        .group_id
        .as_ref()
        .ok_or_else(|| Error::forbidden("client user has no group assigned"))
}

/// Who uploaded and what local edits follow a successful call.
struct UploadContext {
    uploader_username: String,
    uploader_name: Option<String>,
    group_id: Option<GroupId>,
    consent_registered: bool,
    legal_name: Option<String>,
}

/// Service implementing [`CertificateUploads`].
#[derive(Clone)]
pub struct CertificateUploadService<S, L, G> {
    gateway: Arc<S>,
    uploads: Arc<L>,
    groups: Arc<G>,
    clock: Arc<dyn Clock>,
    firm_name: String,
}

impl<S, L, G> CertificateUploadService<S, L, G> {
    /// Create the service from its collaborators.
    pub fn new(
        gateway: Arc<S>,
        uploads: Arc<L>,
        groups: Arc<G>,
        clock: Arc<dyn Clock>,
        firm_name: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            uploads,
            groups,
            clock,
            firm_name: firm_name.into(),
        }
    }
}

impl<S, L, G> CertificateUploadService<S, L, G>
where
    S: SatGateway,
    L: UploadLogRepository,
    G: GroupRepository,
{
    async fn forward(
        &self,
        bundle: &CertificateBundle,
        context: UploadContext,
    ) -> Result<UploadReceipt, Error> {
        let response = self
            .gateway
            .upload_certificates(bundle)
            .await
            .map_err(map_gateway_error)?;
        let accepted = response.is_success();
        let RemoteResponse { status, payload } = response;

        // Client edits only follow an accepted upload; admin uploads never
        // touch the client record.
        let client_update = (accepted && context.consent_registered).then(|| ClientUploadUpdate {
            rfc: bundle.rfc.clone(),
            legal_name: context.legal_name.clone(),
            group_id: context.group_id.clone(),
        });
        let entry = NewUploadLogEntry {
            rfc: bundle.rfc.clone(),
            uploader_username: context.uploader_username,
            uploader_name: context.uploader_name,
            group_id: context.group_id,
            consent_registered: context.consent_registered,
            status_code: status,
            api_payload: payload.clone(),
            created_at: self.clock.utc(),
        };
        let recorded = self
            .uploads
            .record(&entry, client_update.as_ref())
            .await
            .map_err(|err| {
                error!(rfc = %bundle.rfc, status, error = %err, "failed to record upload");
                map_log_error(err)
            })?;

        if !accepted {
            return Err(upstream_rejection(
                SatOperation::UploadCertificates,
                RemoteResponse { status, payload },
            ));
        }
        info!(
            rfc = %bundle.rfc,
            log_id = %recorded.entry.id,
            consent = entry.consent_registered,
            "certificates uploaded"
        );
        Ok(UploadReceipt {
            api: payload,
            client: recorded.client,
            log_entry: recorded.entry,
        })
    }
}

#[async_trait]
impl<S, L, G> CertificateUploads for CertificateUploadService<S, L, G>
where
    S: SatGateway,
    L: UploadLogRepository,
    G: GroupRepository,
{
    async fn consent_notice(&self, principal: &Principal) -> Result<ConsentNotice, Error> {
        let group_id = client_group(principal)?;
        let group_name = self
            .groups
            .find_by_id(group_id)
            .await
            .map_err(map_group_error)?
            .map(|group| group.name);
        Ok(ConsentNotice::render(
            &self.firm_name,
            group_name.as_deref().unwrap_or(UNKNOWN_GROUP_LABEL),
        ))
    }

    async fn upload_as_client(
        &self,
        principal: &Principal,
        submission: ClientSubmission,
    ) -> Result<UploadReceipt, Error> {
        let group_id = client_group(principal)?.clone();
        let ClientSubmission {
            bundle,
            uploader_name,
            legal_name,
        } = submission;
        let context = UploadContext {
            uploader_username: principal.username.clone(),
            uploader_name: Some(uploader_name),
            group_id: Some(group_id),
            consent_registered: true,
            legal_name,
        };
        self.forward(&bundle, context).await
    }

    async fn upload_as_admin(
        &self,
        principal: &Principal,
        bundle: CertificateBundle,
    ) -> Result<UploadReceipt, Error> {
        if principal.role != Role::Admin {
            return Err(Error::forbidden("admin role required"));
        }
        let context = UploadContext {
            uploader_username: principal.username.clone(),
            uploader_name: None,
            group_id: None,
            consent_registered: false,
            legal_name: None,
        };
        self.forward(&bundle, context).await
    }
}

#[cfg(test)]
#[path = "certificate_upload_service_tests.rs"]
mod tests;
