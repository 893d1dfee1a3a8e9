//! Driving port for group and client membership use-cases.

use async_trait::async_trait;

use crate::domain::{BulkAssignment, ClientId, Error, Group, GroupFilter, GroupId, Taxpayer};

/// Group registry and client membership use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Create a group from a raw name.
    async fn create_group(&self, name: &str) -> Result<Group, Error>;

    /// Existing group or `not_found`.
    async fn find_group(&self, group_id: &GroupId) -> Result<Group, Error>;

    /// Groups ordered by name.
    async fn list_groups(&self) -> Result<Vec<Group>, Error>;

    /// Delete a group no client-role user belongs to.
    async fn delete_group(&self, group_id: &GroupId) -> Result<(), Error>;

    /// Members of an existing group, ordered by RFC.
    async fn group_members(&self, group_id: &GroupId) -> Result<Vec<Taxpayer>, Error>;

    /// Clients with no group, ordered by RFC.
    async fn clients_without_group(&self) -> Result<Vec<Taxpayer>, Error>;

    /// Clients selected by a console group filter.
    async fn clients_for_filter(&self, filter: &GroupFilter) -> Result<Vec<Taxpayer>, Error>;

    /// All clients ordered by RFC.
    async fn list_clients(&self) -> Result<Vec<Taxpayer>, Error>;

    /// Existing client or `not_found`.
    async fn find_client(&self, client_id: &ClientId) -> Result<Taxpayer, Error>;

    /// Move a client into a group and return the updated record.
    async fn assign_client(
        &self,
        client_id: &ClientId,
        group_id: &GroupId,
    ) -> Result<Taxpayer, Error>;

    /// Detach a client from a group; detaching a non-member succeeds.
    async fn remove_client(&self, client_id: &ClientId, group_id: &GroupId) -> Result<(), Error>;

    /// Assign each candidate, collecting failures instead of aborting.
    async fn add_clients(
        &self,
        group_id: &GroupId,
        client_ids: &[ClientId],
    ) -> Result<BulkAssignment, Error>;
}
