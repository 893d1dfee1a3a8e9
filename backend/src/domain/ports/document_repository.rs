//! Port for documents stored by the ingestion pipeline.

use async_trait::async_trait;

use crate::domain::{Rfc, StoredCfdi, StoredMetadata};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document repository adapters.
    pub enum DocumentRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "document repository connection failed: {message}",
        /// Query failed during execution.
        Query { message } => "document repository query failed: {message}",
    }
}

/// Read-only access to stored CFDI and metadata, ordered by processing time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// CFDI stored for `rfc`.
    async fn cfdi_for_client(&self, rfc: &Rfc) -> Result<Vec<StoredCfdi>, DocumentRepositoryError>;

    /// Metadata records stored for `rfc`.
    async fn metadata_for_client(
        &self,
        rfc: &Rfc,
    ) -> Result<Vec<StoredMetadata>, DocumentRepositoryError>;
}
