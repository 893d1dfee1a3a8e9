//! Port for the group registry and client membership writes.
//!
//! Membership writes touch both the client's group reference and the
//! group's denormalised member list; adapters apply them atomically.

use async_trait::async_trait;

use crate::domain::{ClientId, Group, GroupId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by group repository adapters.
    pub enum GroupRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "group repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "group repository query failed: {message}",
        /// Another group already uses the slug.
        DuplicateSlug { slug } => "group slug {slug} already exists",
        /// The referenced group does not exist.
        GroupNotFound { group_id } => "group {group_id} not found",
        /// The referenced client does not exist.
        ClientNotFound { client_id } => "client {client_id} not found",
        /// Client-role users still belong to the group.
        GroupHasUsers { group_id } =>
            "group {group_id} is still referenced by client users",
    }
}

/// Port for reading and mutating groups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert a new group; the slug must be unique.
    async fn create(&self, group: &Group) -> Result<(), GroupRepositoryError>;

    /// Group with `id`, if any.
    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupRepositoryError>;

    /// Group using `slug`, if any.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, GroupRepositoryError>;

    /// All groups ordered by name.
    async fn list(&self) -> Result<Vec<Group>, GroupRepositoryError>;

    /// Move `client_id` into `group_id`, removing it from its previous group.
    async fn assign_client(
        &self,
        client_id: &ClientId,
        group_id: &GroupId,
    ) -> Result<(), GroupRepositoryError>;

    /// Detach `client_id` from `group_id`. Returns `false` when the client was
    /// not a member.
    async fn remove_client(
        &self,
        client_id: &ClientId,
        group_id: &GroupId,
    ) -> Result<bool, GroupRepositoryError>;

    /// Clear every client reference to the group and delete it.
    async fn delete(&self, group_id: &GroupId) -> Result<(), GroupRepositoryError>;
}
