//! CFDI and metadata viewer for a focused client.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    DocumentRepository, DocumentRepositoryError, DocumentViewer, TaxpayerRepository,
    TaxpayerRepositoryError,
};
use crate::domain::{ClientId, DocumentView, Error, TaxYear};

fn map_document_error(error: DocumentRepositoryError) -> Error {
    match error {
        DocumentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("document repository unavailable: {message}"))
        }
        DocumentRepositoryError::Query { message } => {
            Error::internal(format!("document repository error: {message}"))
        }
    }
}

fn map_taxpayer_error(error: TaxpayerRepositoryError) -> Error {
    match error {
        TaxpayerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("client repository unavailable: {message}"))
        }
        TaxpayerRepositoryError::Query { message } => {
            Error::internal(format!("client repository error: {message}"))
        }
    }
}

/// Service implementing [`DocumentViewer`].
#[derive(Clone)]
pub struct DocumentViewerService<T, D> {
    taxpayers: Arc<T>,
    documents: Arc<D>,
}

impl<T, D> DocumentViewerService<T, D> {
    /// Create the viewer over the client and document stores.
    pub fn new(taxpayers: Arc<T>, documents: Arc<D>) -> Self {
        Self {
            taxpayers,
            documents,
        }
    }
}

#[async_trait]
impl<T, D> DocumentViewer for DocumentViewerService<T, D>
where
    T: TaxpayerRepository,
    D: DocumentRepository,
{
    async fn documents(&self, client_id: &ClientId, year: TaxYear) -> Result<DocumentView, Error> {
        let client = self
            .taxpayers
            .find_by_id(client_id)
            .await
            .map_err(map_taxpayer_error)?
            .ok_or_else(|| Error::not_found(format!("client {client_id} not found")))?;

        let (cfdi, metadata) = tokio::try_join!(
            self.documents.cfdi_for_client(&client.rfc),
            self.documents.metadata_for_client(&client.rfc),
        )
        .map_err(map_document_error)?;

        let view = DocumentView::build(client.rfc, year, &cfdi, &metadata);
        debug!(
            rfc = %view.rfc,
            year = year.value(),
            cfdi = view.cfdi.len(),
            metadata = view.metadata.len(),
            "document view built"
        );
        Ok(view)
    }
}
