//! Group registry and client membership use-cases.
//!
//! Membership invariants (a client's group reference mirrors the group's
//! member list) are enforced by the repository inside one transaction; this
//! service validates inputs, checks existence up front for clear errors, and
//! maps adapter failures.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    GroupDirectory, GroupRepository, GroupRepositoryError, TaxpayerRepository,
    TaxpayerRepositoryError,
};
use crate::domain::{
    BulkAssignment, ClientId, Error, Group, GroupFilter, GroupId, GroupName, GroupValidationError,
    Taxpayer,
};

fn map_group_error(error: GroupRepositoryError) -> Error {
    match error {
        GroupRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        GroupRepositoryError::Query { message } => {
            Error::internal(format!("group repository error: {message}"))
        }
        GroupRepositoryError::DuplicateSlug { slug } => duplicate_slug(&slug),
        GroupRepositoryError::GroupNotFound { group_id } => group_not_found(&group_id),
        GroupRepositoryError::ClientNotFound { client_id } => client_not_found(&client_id),
        GroupRepositoryError::GroupHasUsers { group_id } => Error::conflict(format!(
            "group {group_id} still has client users; reassign them first"
        ))
        .with_details(json!({ "code": "group_has_client_users", "groupId": group_id })),
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

fn duplicate_slug(slug: &str) -> Error {
    Error::conflict(format!("a group with slug {slug} already exists"))
        .with_details(json!({ "code": "duplicate_slug", "slug": slug }))
}

fn group_not_found(group_id: &str) -> Error {
    Error::not_found(format!("group {group_id} not found"))
        .with_details(json!({ "code": "group_not_found", "groupId": group_id }))
}

fn client_not_found(client_id: &str) -> Error {
    Error::not_found(format!("client {client_id} not found"))
        .with_details(json!({ "code": "client_not_found", "clientId": client_id }))
}

fn map_name_error(error: GroupValidationError) -> Error {
    let code = match error {
        GroupValidationError::EmptyName => "empty_name",
        GroupValidationError::NameTooLong { .. } => "name_too_long",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": "name", "code": code }))
}

/// Service implementing [`GroupDirectory`].
#[derive(Clone)]
pub struct GroupMembershipService<G, T> {
    groups: Arc<G>,
    taxpayers: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<G, T> GroupMembershipService<G, T> {
    /// Create the service over the group and client stores.
    pub fn new(groups: Arc<G>, taxpayers: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            groups,
            taxpayers,
            clock,
        }
    }
}

impl<G, T> GroupMembershipService<G, T>
where
    G: GroupRepository,
    T: TaxpayerRepository,
{
    async fn require_group(&self, group_id: &GroupId) -> Result<Group, Error> {
        self.groups
            .find_by_id(group_id)
            .await
            .map_err(map_group_error)?
            .ok_or_else(|| group_not_found(&group_id.to_string()))
    }

    async fn require_client(&self, client_id: &ClientId) -> Result<Taxpayer, Error> {
        self.taxpayers
            .find_by_id(client_id)
            .await
            .map_err(map_taxpayer_error)?
            .ok_or_else(|| client_not_found(&client_id.to_string()))
    }
}

#[async_trait]
impl<G, T> GroupDirectory for GroupMembershipService<G, T>
where
    G: GroupRepository,
    T: TaxpayerRepository,
{
    async fn create_group(&self, name: &str) -> Result<Group, Error> {
        let name = GroupName::new(name).map_err(map_name_error)?;
        if self
            .groups
            .find_by_slug(name.slug())
            .await
            .map_err(map_group_error)?
            .is_some()
        {
            return Err(duplicate_slug(name.slug()));
        }

        let group = Group {
            id: GroupId::random(),
            name: name.as_ref().to_owned(),
            slug: name.slug().to_owned(),
            member_ids: Vec::new(),
            created_at: self.clock.utc(),
        };
        // The unique index still guards against a concurrent insert.
        self.groups.create(&group).await.map_err(map_group_error)?;
        info!(group_id = %group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    async fn find_group(&self, group_id: &GroupId) -> Result<Group, Error> {
        self.require_group(group_id).await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, Error> {
        self.groups.list().await.map_err(map_group_error)
    }

    async fn delete_group(&self, group_id: &GroupId) -> Result<(), Error> {
        self.groups.delete(group_id).await.map_err(map_group_error)?;
        info!(%group_id, "group deleted");
        Ok(())
    }

    async fn group_members(&self, group_id: &GroupId) -> Result<Vec<Taxpayer>, Error> {
        self.require_group(group_id).await?;
        self.taxpayers
            .list_members(group_id)
            .await
            .map_err(map_taxpayer_error)
    }

    async fn clients_without_group(&self) -> Result<Vec<Taxpayer>, Error> {
        self.taxpayers
            .list_ungrouped()
            .await
            .map_err(map_taxpayer_error)
    }

    async fn clients_for_filter(&self, filter: &GroupFilter) -> Result<Vec<Taxpayer>, Error> {
        match filter {
            GroupFilter::Ungrouped => self.clients_without_group().await,
            GroupFilter::Group { group_id } => self.group_members(group_id).await,
        }
    }

    async fn list_clients(&self) -> Result<Vec<Taxpayer>, Error> {
        self.taxpayers.list_all().await.map_err(map_taxpayer_error)
    }

    async fn find_client(&self, client_id: &ClientId) -> Result<Taxpayer, Error> {
        self.require_client(client_id).await
    }

    async fn assign_client(
        &self,
        client_id: &ClientId,
        group_id: &GroupId,
    ) -> Result<Taxpayer, Error> {
        self.require_client(client_id).await?;
        self.require_group(group_id).await?;
        self.groups
            .assign_client(client_id, group_id)
            .await
            .map_err(map_group_error)?;
        info!(%client_id, %group_id, "client assigned to group");
        self.require_client(client_id).await
    }

    async fn remove_client(&self, client_id: &ClientId, group_id: &GroupId) -> Result<(), Error> {
        let removed = self
            .groups
            .remove_client(client_id, group_id)
            .await
            .map_err(map_group_error)?;
        if removed {
            info!(%client_id, %group_id, "client removed from group");
        }
        Ok(())
    }

    async fn add_clients(
        &self,
        group_id: &GroupId,
        client_ids: &[ClientId],
    ) -> Result<BulkAssignment, Error> {
        self.require_group(group_id).await?;
        let mut outcome = BulkAssignment::default();
        for client_id in client_ids {
            match self.groups.assign_client(client_id, group_id).await {
                Ok(()) => outcome.assigned += 1,
                Err(error) => {
                    warn!(%client_id, %group_id, %error, "bulk assignment failed");
                    outcome.failed.push(client_id.clone());
                }
            }
        }
        info!(
            %group_id,
            assigned = outcome.assigned,
            failed = outcome.failed.len(),
            "bulk assignment finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "group_membership_service_tests.rs"]
mod tests;
