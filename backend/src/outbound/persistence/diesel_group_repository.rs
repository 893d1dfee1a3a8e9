//! PostgreSQL-backed `GroupRepository` implementation.
//!
//! Membership writes lock the client row first and then the affected group
//! rows in id order, so concurrent reassignments of one client serialise and
//! group locks are always taken in the same order. Deleting a group follows
//! the same client-then-group order by locking its members up front.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{GroupRepository, GroupRepositoryError};
use crate::domain::{ClientId, Group, GroupId};

use super::diesel_helpers::{DieselFailure, TxError, classify_diesel_error, pool_error_message};
use super::models::{GroupRow, NewGroupRow};
use super::pool::{DbPool, PoolError};
use super::schema::{clients, groups, users};

/// Diesel-backed implementation of the `GroupRepository` port.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GroupRepositoryError {
    GroupRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> GroupRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => GroupRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint } => GroupRepositoryError::query(format!(
            "unique constraint {} violated",
            constraint.as_deref().unwrap_or("<unknown>")
        )),
        DieselFailure::Query(message) => GroupRepositoryError::query(message),
    }
}

/// Member list with `member` added once.
fn with_member(mut members: Vec<Uuid>, member: Uuid) -> Vec<Uuid> {
    if !members.contains(&member) {
        members.push(member);
    }
    members
}

/// Member list with every occurrence of `member` removed.
fn without_member(mut members: Vec<Uuid>, member: Uuid) -> Vec<Uuid> {
    members.retain(|id| *id != member);
    members
}

type GroupTxError = TxError<GroupRepositoryError>;

async fn lock_client_group(
    conn: &mut AsyncPgConnection,
    client_id: Uuid,
) -> Result<Option<Option<Uuid>>, diesel::result::Error> {
    clients::table
        .find(client_id)
        .select(clients::group_id)
        .for_update()
        .first::<Option<Uuid>>(conn)
        .await
        .optional()
}

async fn lock_member_clients(
    conn: &mut AsyncPgConnection,
    group_id: Uuid,
) -> Result<Vec<Uuid>, diesel::result::Error> {
    clients::table
        .filter(clients::group_id.eq(group_id))
        .order(clients::id.asc())
        .select(clients::id)
        .for_update()
        .load(conn)
        .await
}

async fn lock_groups(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> Result<Vec<GroupRow>, diesel::result::Error> {
    groups::table
        .filter(groups::id.eq_any(ids))
        .order(groups::id.asc())
        .select(GroupRow::as_select())
        .for_update()
        .load(conn)
        .await
}

async fn write_members(
    conn: &mut AsyncPgConnection,
    group_id: Uuid,
    members: &[Uuid],
) -> Result<(), diesel::result::Error> {
    diesel::update(groups::table.find(group_id))
        .set(groups::member_ids.eq(members))
        .execute(conn)
        .await
        .map(|_| ())
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn create(&self, group: &Group) -> Result<(), GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let member_ids: Vec<Uuid> = group.member_ids.iter().map(|id| *id.as_uuid()).collect();
        let row = NewGroupRow {
            id: *group.id.as_uuid(),
            name: &group.name,
            slug: &group.slug,
            member_ids: &member_ids,
            created_at: group.created_at,
        };

        diesel::insert_into(groups::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| match classify_diesel_error(error) {
                DieselFailure::UniqueViolation { .. } => {
                    GroupRepositoryError::duplicate_slug(group.slug.clone())
                }
                DieselFailure::Connection(message) => GroupRepositoryError::connection(message),
                DieselFailure::Query(message) => GroupRepositoryError::query(message),
            })
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GroupRow> = groups::table
            .find(id.as_uuid())
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Group::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GroupRow> = groups::table
            .filter(groups::slug.eq(slug))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Group::from))
    }

    async fn list(&self) -> Result<Vec<Group>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GroupRow> = groups::table
            .select(GroupRow::as_select())
            .order((groups::name.asc(), groups::created_at.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Group::from).collect())
    }

    async fn assign_client(
        &self,
        client_id: &ClientId,
        group_id: &GroupId,
    ) -> Result<(), GroupRepositoryError> {
        let client = *client_id.as_uuid();
        let target = *group_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome: Result<_, GroupTxError> = conn
            .transaction(|conn| {
                async move {
                    let previous = lock_client_group(conn, client).await?.ok_or_else(|| {
                        TxError::Abort(GroupRepositoryError::client_not_found(client.to_string()))
                    })?;

                    let mut ids = vec![target];
                    if let Some(previous) = previous.filter(|id| *id != target) {
                        ids.push(previous);
                    }
                    let locked = lock_groups(conn, &ids).await?;
                    if !locked.iter().any(|row| row.id == target) {
                        return Err(TxError::Abort(GroupRepositoryError::group_not_found(
                            target.to_string(),
                        )));
                    }

                    for row in locked {
                        let members = if row.id == target {
                            with_member(row.member_ids, client)
                        } else {
                            without_member(row.member_ids, client)
                        };
                        write_members(conn, row.id, &members).await?;
                    }

                    diesel::update(clients::table.find(client))
                        .set(clients::group_id.eq(Some(target)))
                        .execute(conn)
                        .await?;
                    debug!(%client, %target, ?previous, "client group reassigned");
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(|error| error.into_port_error(map_diesel_error))
    }

    async fn remove_client(
        &self,
        client_id: &ClientId,
        group_id: &GroupId,
    ) -> Result<bool, GroupRepositoryError> {
        let client = *client_id.as_uuid();
        let group = *group_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome: Result<_, GroupTxError> = conn
            .transaction(|conn| {
                async move {
                    let current = lock_client_group(conn, client).await?.flatten();
                    let was_member = current == Some(group);

                    for row in lock_groups(conn, &[group]).await? {
                        if row.member_ids.contains(&client) {
                            let members = without_member(row.member_ids, client);
                            write_members(conn, row.id, &members).await?;
                        }
                    }
                    if was_member {
                        diesel::update(clients::table.find(client))
                            .set(clients::group_id.eq(None::<Uuid>))
                            .execute(conn)
                            .await?;
                    }
                    Ok(was_member)
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(|error| error.into_port_error(map_diesel_error))
    }

    async fn delete(&self, group_id: &GroupId) -> Result<(), GroupRepositoryError> {
        let group = *group_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome: Result<_, GroupTxError> = conn
            .transaction(|conn| {
                async move {
                    let members = lock_member_clients(conn, group).await?;
                    if lock_groups(conn, &[group]).await?.is_empty() {
                        return Err(TxError::Abort(GroupRepositoryError::group_not_found(
                            group.to_string(),
                        )));
                    }

                    let referencing_users: i64 = users::table
                        .filter(users::group_id.eq(group))
                        .count()
                        .get_result(conn)
                        .await?;
                    if referencing_users > 0 {
                        return Err(TxError::Abort(GroupRepositoryError::group_has_users(
                            group.to_string(),
                        )));
                    }

                    let detached = diesel::update(clients::table.filter(clients::group_id.eq(group)))
                        .set(clients::group_id.eq(None::<Uuid>))
                        .execute(conn)
                        .await?;
                    diesel::delete(groups::table.find(group))
                        .execute(conn)
                        .await?;
                    debug!(%group, detached, locked = members.len(), "group deleted");
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(|error| error.into_port_error(map_diesel_error))
    }
}
