//! PostgreSQL-backed `UploadLogRepository` implementation.
//!
//! The log append and the optional client update commit together. Clients
//! are created by the remote conversion service; an update for an RFC with no
//! local row only appends the log entry.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{RecordedUpload, UploadLogRepository, UploadLogRepositoryError};
use crate::domain::{ClientUploadUpdate, NewUploadLogEntry, Taxpayer, UploadLogEntry};

use super::diesel_helpers::{TxError, map_basic_diesel_error, pool_error_message};
use super::models::{ClientRow, NewUploadRow, UploadRow};
use super::pool::{DbPool, PoolError};
use super::schema::{clients, groups, uploads};

/// Diesel-backed implementation of the `UploadLogRepository` port.
#[derive(Clone)]
pub struct DieselUploadLogRepository {
    pool: DbPool,
}

impl DieselUploadLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UploadLogRepositoryError {
    UploadLogRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UploadLogRepositoryError {
    map_basic_diesel_error(
        error,
        UploadLogRepositoryError::query,
        UploadLogRepositoryError::connection,
    )
}

type UploadTxError = TxError<UploadLogRepositoryError>;

/// Group the client should join, if any: only clients without a group adopt
/// the uploader's group.
fn adopted_group(current: Option<Uuid>, update: &ClientUploadUpdate) -> Option<Uuid> {
    match current {
        Some(_) => None,
        None => update.group_id.as_ref().map(|id| *id.as_uuid()),
    }
}

async fn apply_client_update(
    conn: &mut AsyncPgConnection,
    update: &ClientUploadUpdate,
) -> Result<(), diesel::result::Error> {
    let Some(client) = clients::table
        .filter(clients::rfc.eq(update.rfc.as_ref()))
        .select(ClientRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?
    else {
        debug!(rfc = %update.rfc, "no local client for uploaded rfc");
        return Ok(());
    };

    if let Some(legal_name) = update.legal_name.as_deref() {
        diesel::update(clients::table.find(client.id))
            .set(clients::legal_name.eq(legal_name))
            .execute(conn)
            .await?;
    }

    if let Some(group) = adopted_group(client.group_id, update) {
        let members: Option<Vec<Uuid>> = groups::table
            .find(group)
            .select(groups::member_ids)
            .for_update()
            .first(conn)
            .await
            .optional()?;
        let Some(mut members) = members else {
            debug!(rfc = %update.rfc, %group, "uploader group no longer exists");
            return Ok(());
        };
        if !members.contains(&client.id) {
            members.push(client.id);
            diesel::update(groups::table.find(group))
                .set(groups::member_ids.eq(&members))
                .execute(conn)
                .await?;
        }
        diesel::update(clients::table.find(client.id))
            .set(clients::group_id.eq(Some(group)))
            .execute(conn)
            .await?;
    }
    Ok(())
}

async fn client_by_rfc(
    conn: &mut AsyncPgConnection,
    rfc: &str,
) -> Result<Option<ClientRow>, diesel::result::Error> {
    clients::table
        .filter(clients::rfc.eq(rfc))
        .select(ClientRow::as_select())
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl UploadLogRepository for DieselUploadLogRepository {
    async fn record<'a>(
        &self,
        entry: &NewUploadLogEntry,
        client_update: Option<&'a ClientUploadUpdate>,
    ) -> Result<RecordedUpload, UploadLogRepositoryError> {
        let row = NewUploadRow {
            id: Uuid::new_v4(),
            rfc: entry.rfc.as_ref(),
            uploader_username: &entry.uploader_username,
            uploader_name: entry.uploader_name.as_deref(),
            group_id: entry.group_id.as_ref().map(|id| *id.as_uuid()),
            consent_registered: entry.consent_registered,
            status_code: i32::from(entry.status_code),
            api_payload: &entry.api_payload,
            created_at: entry.created_at,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome: Result<(UploadRow, Option<ClientRow>), UploadTxError> = conn
            .transaction(|conn| {
                async move {
                    if let Some(update) = client_update {
                        apply_client_update(conn, update).await?;
                    }
                    let stored: UploadRow = diesel::insert_into(uploads::table)
                        .values(&row)
                        .returning(UploadRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let client = client_by_rfc(conn, row.rfc).await?;
                    Ok((stored, client))
                }
                .scope_boxed()
            })
            .await;
        let (stored, client) = outcome.map_err(|error| error.into_port_error(map_diesel_error))?;

        let entry = UploadLogEntry::try_from(stored).map_err(UploadLogRepositoryError::query)?;
        let client = client.map(Taxpayer::from);
        Ok(RecordedUpload { entry, client })
    }
}
