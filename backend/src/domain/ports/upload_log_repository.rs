//! Port for the certificate upload audit trail.

use async_trait::async_trait;

use crate::domain::{ClientUploadUpdate, NewUploadLogEntry, Taxpayer, UploadLogEntry};

use super::define_port_error;

define_port_error! {
    /// Errors raised by upload log adapters.
    pub enum UploadLogRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "upload log connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "upload log query failed: {message}",
    }
}

/// Result of recording an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpload {
    /// Stored log entry.
    pub entry: UploadLogEntry,
    /// Client record after the optional update, when one exists for the RFC.
    pub client: Option<Taxpayer>,
}

/// Append-only upload log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadLogRepository: Send + Sync {
    /// Append `entry` and apply `client_update` in one transaction.
    async fn record<'a>(
        &self,
        entry: &NewUploadLogEntry,
        client_update: Option<&'a ClientUploadUpdate>,
    ) -> Result<RecordedUpload, UploadLogRepositoryError>;
}
