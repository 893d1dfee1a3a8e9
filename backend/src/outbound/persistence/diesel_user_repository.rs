//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Password hashes never leave this adapter except through
//! [`StoredCredentials`], which only the login service consumes.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{UserAccount, Username};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, collect_rows, pool_error_message};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            UserPersistenceError::query("unique constraint violated")
        }
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(
        &self,
        account: &UserAccount,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *account.id.as_uuid(),
            username: account.username.as_ref(),
            password_hash,
            role: account.role.as_str(),
            active: account.active,
            group_id: account.group_id.as_ref().map(|id| *id.as_uuid()),
            created_at: account.created_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| match classify_diesel_error(error) {
                DieselFailure::UniqueViolation { .. } => {
                    UserPersistenceError::duplicate_username(account.username.to_string())
                }
                DieselFailure::Connection(message) => UserPersistenceError::connection(message),
                DieselFailure::Query(message) => UserPersistenceError::query(message),
            })
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            row.into_parts()
                .map(|(account, password_hash)| StoredCredentials {
                    account,
                    password_hash,
                })
        })
        .transpose()
        .map_err(UserPersistenceError::query)
    }

    async fn list(&self) -> Result<Vec<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order(users::username.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter()
                .map(|row| row.into_parts().map(|(account, _)| account)),
            UserPersistenceError::query,
        )
    }
}
