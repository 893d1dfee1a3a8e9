//! SAT workflows for the focused client: initial download requests and
//! authentication followed by verification.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    InitialRequestsOutcome, RemoteResponse, SatGateway, SatGatewayError, SatOperation,
    SatWorkflow, TaxpayerRepository, TaxpayerRepositoryError, VerificationOutcome,
};
use crate::domain::{ClientId, Error, TaxYear, Taxpayer, VerificationReport};

/// Map a failed call that produced no HTTP response.
pub(crate) fn map_gateway_error(error: SatGatewayError) -> Error {
    warn!(%error, "remote API call failed");
    Error::upstream_unavailable(error.to_string())
}

/// Error for a non-2xx remote response, carrying its status and body.
pub(crate) fn upstream_rejection(operation: SatOperation, response: RemoteResponse) -> Error {
    warn!(%operation, status = response.status, "remote API rejected request");
    Error::upstream_error(format!(
        "{operation} failed with status {}",
        response.status
    ))
    .with_details(json!({
        "operation": operation.path(),
        "status": response.status,
        "payload": response.payload,
    }))
}

fn require_success(
    operation: SatOperation,
    response: RemoteResponse,
) -> Result<RemoteResponse, Error> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(upstream_rejection(operation, response))
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

/// Service implementing [`SatWorkflow`].
#[derive(Clone)]
pub struct SatWorkflowService<T, S> {
    taxpayers: Arc<T>,
    gateway: Arc<S>,
}

impl<T, S> SatWorkflowService<T, S> {
    /// Create the workflow over the client store and SAT gateway.
    pub fn new(taxpayers: Arc<T>, gateway: Arc<S>) -> Self {
        Self { taxpayers, gateway }
    }
}

impl<T, S> SatWorkflowService<T, S>
where
    T: TaxpayerRepository,
{
    async fn client(&self, client_id: &ClientId) -> Result<Taxpayer, Error> {
        self.taxpayers
            .find_by_id(client_id)
            .await
            .map_err(map_taxpayer_error)?
            .ok_or_else(|| Error::not_found(format!("client {client_id} not found")))
    }
}

#[async_trait]
impl<T, S> SatWorkflow for SatWorkflowService<T, S>
where
    T: TaxpayerRepository,
    S: SatGateway,
{
    async fn run_initial_requests(
        &self,
        client_id: &ClientId,
        year: TaxYear,
    ) -> Result<InitialRequestsOutcome, Error> {
        let client = self.client(client_id).await?;
        let response = self
            .gateway
            .initial_requests(&client.rfc, year)
            .await
            .map_err(map_gateway_error)?;
        let response = require_success(SatOperation::InitialRequests, response)?;
        info!(rfc = %client.rfc, year = year.value(), "initial requests submitted");
        Ok(InitialRequestsOutcome {
            rfc: client.rfc,
            year,
            api: response.payload,
        })
    }

    async fn authenticate_and_verify(
        &self,
        client_id: &ClientId,
        year: TaxYear,
    ) -> Result<VerificationOutcome, Error> {
        let client = self.client(client_id).await?;
        let auth = self
            .gateway
            .authenticate(&client.rfc)
            .await
            .map_err(map_gateway_error)?;
        require_success(SatOperation::Authenticate, auth)?;

        let verification = self
            .gateway
            .verify_requests(&client.rfc, year)
            .await
            .map_err(map_gateway_error)?;
        let verification = require_success(SatOperation::VerifyRequests, verification)?;
        let report = VerificationReport::from_payload(&verification.payload);
        info!(
            rfc = %client.rfc,
            year = year.value(),
            total = report.total,
            "verification finished"
        );
        Ok(VerificationOutcome {
            rfc: client.rfc,
            year,
            report,
        })
    }
}
