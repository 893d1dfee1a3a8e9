//! Driving port for the CFDI/metadata viewer.

use async_trait::async_trait;

use crate::domain::{ClientId, DocumentView, Error, TaxYear};

/// Builds the document tables for one client and year.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentViewer: Send + Sync {
    /// Rows for the client's documents in `year`.
    async fn documents(&self, client_id: &ClientId, year: TaxYear) -> Result<DocumentView, Error>;
}
