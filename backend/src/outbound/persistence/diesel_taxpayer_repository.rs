//! PostgreSQL-backed `TaxpayerRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TaxpayerRepository, TaxpayerRepositoryError};
use crate::domain::{ClientId, GroupId, Rfc, Taxpayer};

use super::diesel_helpers::{map_basic_diesel_error, pool_error_message};
use super::models::ClientRow;
use super::pool::{DbPool, PoolError};
use super::schema::clients;

/// Diesel-backed implementation of the `TaxpayerRepository` port.
#[derive(Clone)]
pub struct DieselTaxpayerRepository {
    pool: DbPool,
}

impl DieselTaxpayerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TaxpayerRepositoryError {
    TaxpayerRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> TaxpayerRepositoryError {
    map_basic_diesel_error(
        error,
        TaxpayerRepositoryError::query,
        TaxpayerRepositoryError::connection,
    )
}

fn into_taxpayers(rows: Vec<ClientRow>) -> Vec<Taxpayer> {
    rows.into_iter().map(Taxpayer::from).collect()
}

#[async_trait]
impl TaxpayerRepository for DieselTaxpayerRepository {
    async fn find_by_id(&self, id: &ClientId) -> Result<Option<Taxpayer>, TaxpayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ClientRow> = clients::table
            .find(id.as_uuid())
            .select(ClientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Taxpayer::from))
    }

    async fn find_by_rfc(&self, rfc: &Rfc) -> Result<Option<Taxpayer>, TaxpayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ClientRow> = clients::table
            .filter(clients::rfc.eq(rfc.as_ref()))
            .select(ClientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Taxpayer::from))
    }

    async fn list_all(&self) -> Result<Vec<Taxpayer>, TaxpayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ClientRow> = clients::table
            .select(ClientRow::as_select())
            .order(clients::rfc.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(into_taxpayers(rows))
    }

    async fn list_ungrouped(&self) -> Result<Vec<Taxpayer>, TaxpayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ClientRow> = clients::table
            .filter(clients::group_id.is_null())
            .select(ClientRow::as_select())
            .order(clients::rfc.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(into_taxpayers(rows))
    }

    async fn list_members(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<Taxpayer>, TaxpayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ClientRow> = clients::table
            .filter(clients::group_id.eq(group_id.as_uuid()))
            .select(ClientRow::as_select())
            .order(clients::rfc.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(into_taxpayers(rows))
    }
}
