//! Helpers shared by the backend integration suites.

use postgres::{Client, NoTls};

pub mod pg_embed;

/// Render a `postgres` error with its SQLSTATE and detail when available.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Whether a cluster that fails to start should fail the test run.
///
/// Truthy values of `REQUIRE_TEST_CLUSTER`: "1", "true", "yes".
pub fn test_cluster_required() -> bool {
    std::env::var("REQUIRE_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker, or panic when the cluster is required.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if test_cluster_required() {
        panic!("Test cluster setup failed: {reason}. Unset REQUIRE_TEST_CLUSTER to skip.");
    }
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}

/// Drop and recreate `name` through the cluster's maintenance database.
pub fn reset_database(maintenance_url: &str, name: &str) -> Result<(), String> {
    let mut client =
        Client::connect(maintenance_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    // Separate round trips: a multi-statement batch runs in one transaction.
    client
        .batch_execute(&format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
        .map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))
}
