//! Shared helpers for Diesel repository implementations.
//!
//! Each repository has its own port error enum; these helpers classify pool
//! and Diesel failures once and let callers pick the constructors.

use tracing::debug;

use super::pool::PoolError;

/// Diesel failure reduced to what repositories distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped while the statement ran.
    Connection(&'static str),
    /// A unique index rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Any other query failure.
    Query(&'static str),
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message }
        | PoolError::Build { message }
        | PoolError::InvalidUrl { message } => message,
    }
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify_diesel_error(error: diesel::result::Error) -> DieselFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        _ => DieselFailure::Query("database error"),
    }
}

/// Map a Diesel error through connection/query constructors, treating unique
/// violations as query failures.
pub(crate) fn map_basic_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => connection(message),
        DieselFailure::UniqueViolation { .. } => query("unique constraint violated"),
        DieselFailure::Query(message) => query(message),
    }
}

/// Transaction failure: either Diesel itself or a repository outcome that
/// aborts and rolls back the transaction.
#[derive(Debug)]
pub(crate) enum TxError<E> {
    Diesel(diesel::result::Error),
    Abort(E),
}

impl<E> From<diesel::result::Error> for TxError<E> {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl<E> TxError<E> {
    /// Collapse into the repository error, mapping Diesel failures.
    pub(crate) fn into_port_error(self, map_diesel: impl FnOnce(diesel::result::Error) -> E) -> E {
        match self {
            Self::Diesel(error) => map_diesel(error),
            Self::Abort(error) => error,
        }
    }
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct Info {
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info { constraint }))
    }

    #[rstest]
    fn unique_violation_keeps_constraint_name() {
        let failure = classify_diesel_error(database_error(
            DatabaseErrorKind::UniqueViolation,
            Some("groups_slug_key"),
        ));
        assert_eq!(
            failure,
            DieselFailure::UniqueViolation {
                constraint: Some("groups_slug_key".to_owned())
            }
        );
    }

    #[rstest]
    #[case(database_error(DatabaseErrorKind::ClosedConnection, None), true)]
    #[case(DieselError::NotFound, false)]
    #[case(database_error(DatabaseErrorKind::ForeignKeyViolation, None), false)]
    fn basic_mapping_splits_connection_from_query(
        #[case] error: DieselError,
        #[case] is_connection: bool,
    ) {
        let mapped_to_connection = map_basic_diesel_error(error, |_| false, |_| true);
        assert_eq!(mapped_to_connection, is_connection);
    }

    #[rstest]
    fn pool_messages_are_preserved() {
        assert_eq!(
            pool_error_message(PoolError::checkout("timed out")),
            "timed out"
        );
    }

    #[rstest]
    fn collect_rows_reports_first_failure() {
        let rows = vec![Ok(1), Err("bad row".to_owned()), Err("later".to_owned())];
        let err = collect_rows(rows.into_iter(), |message| message).expect_err("failure");
        assert_eq!(err, "bad row");
    }
}
