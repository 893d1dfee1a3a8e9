//! Port for reading the client registry.

use async_trait::async_trait;

use crate::domain::{ClientId, GroupId, Rfc, Taxpayer};

use super::define_port_error;

define_port_error! {
    /// Errors raised by client registry adapters.
    pub enum TaxpayerRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "client repository connection failed: {message}",
        /// Query failed during execution.
        Query { message } => "client repository query failed: {message}",
    }
}

/// Read access to client taxpayers. Every list is ordered by RFC.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxpayerRepository: Send + Sync {
    /// Client with `id`, if any.
    async fn find_by_id(&self, id: &ClientId) -> Result<Option<Taxpayer>, TaxpayerRepositoryError>;

    /// Client registered under `rfc`, if any.
    async fn find_by_rfc(&self, rfc: &Rfc) -> Result<Option<Taxpayer>, TaxpayerRepositoryError>;

    /// Every client.
    async fn list_all(&self) -> Result<Vec<Taxpayer>, TaxpayerRepositoryError>;

    /// Clients without a group reference.
    async fn list_ungrouped(&self) -> Result<Vec<Taxpayer>, TaxpayerRepositoryError>;

    /// Clients whose group reference equals `group_id`.
    async fn list_members(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<Taxpayer>, TaxpayerRepositoryError>;
}
