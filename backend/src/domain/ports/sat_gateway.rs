//! Driven port for the remote certificate-conversion and SAT API.
//!
//! The adapter only reports transport outcomes. Any HTTP response, including
//! non-2xx ones, is returned as a [`RemoteResponse`] so callers can log the
//! attempt before deciding how to surface it.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CertificateBundle, Rfc, TaxYear};

use super::define_port_error;

/// Remote operations and their budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SatOperation {
    /// Certificate conversion and upload.
    UploadCertificates,
    /// Initial download requests for a year.
    InitialRequests,
    /// SAT token request.
    Authenticate,
    /// Status check of issued requests.
    VerifyRequests,
}

impl SatOperation {
    /// Path relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::UploadCertificates => "convert-and-upload-certificates/",
            Self::InitialRequests => "ejecutar-solicitudes-iniciales/",
            Self::Authenticate => "auth-sat/",
            Self::VerifyRequests => "verificar-solicitudes/",
        }
    }

    /// Total request timeout.
    pub fn timeout(self) -> Duration {
        match self {
            Self::UploadCertificates | Self::Authenticate => Duration::from_secs(120),
            Self::InitialRequests => Duration::from_secs(3000),
            Self::VerifyRequests => Duration::from_secs(600),
        }
    }
}

impl fmt::Display for SatOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UploadCertificates => "certificate upload",
            Self::InitialRequests => "initial requests",
            Self::Authenticate => "SAT authentication",
            Self::VerifyRequests => "request verification",
        };
        f.write_str(name)
    }
}

/// HTTP response from the remote API.
///
/// `payload` is the decoded JSON body when the response declared
/// `application/json`, otherwise `{"raw": <text>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body.
    pub payload: Value,
}

impl RemoteResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

define_port_error! {
    /// Errors surfaced when no HTTP response was obtained.
    pub enum SatGatewayError {
        /// Connection could not be established or broke mid-request.
        Transport { operation, message } =>
            "{operation} transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { operation, message } =>
            "{operation} timed out: {message}",
    }
}

/// Port for calling the remote API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SatGateway: Send + Sync {
    /// Forward the three e.firma files and the RFC as a multipart form.
    async fn upload_certificates(
        &self,
        bundle: &CertificateBundle,
    ) -> Result<RemoteResponse, SatGatewayError>;

    /// Trigger the initial download requests for a fiscal year.
    async fn initial_requests(
        &self,
        rfc: &Rfc,
        year: TaxYear,
    ) -> Result<RemoteResponse, SatGatewayError>;

    /// Obtain a SAT token for the RFC.
    async fn authenticate(&self, rfc: &Rfc) -> Result<RemoteResponse, SatGatewayError>;

    /// Check the status of previously issued requests.
    async fn verify_requests(
        &self,
        rfc: &Rfc,
        year: TaxYear,
    ) -> Result<RemoteResponse, SatGatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SatOperation::UploadCertificates, 120)]
    #[case(SatOperation::InitialRequests, 3000)]
    #[case(SatOperation::Authenticate, 120)]
    #[case(SatOperation::VerifyRequests, 600)]
    fn operation_timeouts(#[case] operation: SatOperation, #[case] seconds: u64) {
        assert_eq!(operation.timeout(), Duration::from_secs(seconds));
        assert!(operation.path().ends_with('/'));
    }

    #[rstest]
    #[case(200, true)]
    #[case(204, true)]
    #[case(302, false)]
    #[case(422, false)]
    fn success_is_2xx(#[case] status: u16, #[case] expected: bool) {
        let response = RemoteResponse {
            status,
            payload: Value::Null,
        };
        assert_eq!(response.is_success(), expected);
    }
}
