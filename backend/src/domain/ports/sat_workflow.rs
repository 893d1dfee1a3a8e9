//! Driving port for SAT workflows run against the focused client.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{ClientId, Error, Rfc, TaxYear, VerificationReport};

/// Accepted initial-request submission.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitialRequestsOutcome {
    #[schema(value_type = String)]
    /// Client RFC.
    pub rfc: Rfc,
    /// Requested fiscal year.
    #[schema(value_type = i32)]
    pub year: TaxYear,
    /// Remote response body.
    pub api: Value,
}

/// Authentication followed by verification.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    #[schema(value_type = String)]
    /// Client RFC.
    pub rfc: Rfc,
    /// Requested fiscal year.
    #[schema(value_type = i32)]
    pub year: TaxYear,
    /// Normalised verification result.
    pub report: VerificationReport,
}

/// SAT API workflows for a focused client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SatWorkflow: Send + Sync {
    /// Submit the initial download requests for `year`.
    async fn run_initial_requests(
        &self,
        client_id: &ClientId,
        year: TaxYear,
    ) -> Result<InitialRequestsOutcome, Error>;

    /// Authenticate against SAT, then verify; stops after a failed
    /// authentication.
    async fn authenticate_and_verify(
        &self,
        client_id: &ClientId,
        year: TaxYear,
    ) -> Result<VerificationOutcome, Error>;
}
