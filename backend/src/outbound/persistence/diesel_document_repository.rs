//! PostgreSQL-backed `DocumentRepository` reading ingestion output.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DocumentRepository, DocumentRepositoryError};
use crate::domain::{Rfc, StoredCfdi, StoredMetadata};

use super::diesel_helpers::{map_basic_diesel_error, pool_error_message};
use super::models::{CfdiRow, MetadataRow};
use super::pool::{DbPool, PoolError};
use super::schema::{cfdi, metadata};

/// Diesel-backed implementation of the `DocumentRepository` port.
#[derive(Clone)]
pub struct DieselDocumentRepository {
    pool: DbPool,
}

impl DieselDocumentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DocumentRepositoryError {
    DocumentRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> DocumentRepositoryError {
    map_basic_diesel_error(
        error,
        DocumentRepositoryError::query,
        DocumentRepositoryError::connection,
    )
}

#[async_trait]
impl DocumentRepository for DieselDocumentRepository {
    async fn cfdi_for_client(&self, rfc: &Rfc) -> Result<Vec<StoredCfdi>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CfdiRow> = cfdi::table
            .filter(cfdi::client_rfc.eq(rfc.as_ref()))
            .select(CfdiRow::as_select())
            .order((cfdi::processed_at.asc().nulls_first(), cfdi::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(StoredCfdi::from).collect())
    }

    async fn metadata_for_client(
        &self,
        rfc: &Rfc,
    ) -> Result<Vec<StoredMetadata>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MetadataRow> = metadata::table
            .filter(metadata::client_rfc.eq(rfc.as_ref()))
            .select(MetadataRow::as_select())
            .order((metadata::processed_at.asc().nulls_first(), metadata::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(StoredMetadata::from).collect())
    }
}
