//! Reqwest-backed SAT API gateway.
//!
//! This adapter owns transport details only: request serialisation, per-call
//! timeouts and body decoding. Every HTTP response is handed back to the
//! caller, whatever its status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url, header};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::ports::{RemoteResponse, SatGateway, SatGatewayError, SatOperation};
use crate::domain::{CertificateBundle, CertificateFile, Rfc, TaxYear, certificate_fields as fields};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "satisfacture-console/0.1";

#[derive(Serialize)]
struct RfcBody<'a> {
    rfc: &'a str,
}

#[derive(Serialize)]
struct RfcYearBody<'a> {
    rfc: &'a str,
    year: i32,
}

/// Gateway that POSTs to the four remote endpoints below one base URL.
pub struct SatApiHttpGateway {
    client: Client,
    base_url: Url,
}

impl SatApiHttpGateway {
    /// Build a gateway with a 10 s connect timeout. Request timeouts are set
    /// per operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: normalise_base_url(base_url),
        })
    }

    fn endpoint(&self, operation: SatOperation) -> Result<Url, SatGatewayError> {
        self.base_url.join(operation.path()).map_err(|error| {
            SatGatewayError::transport(operation.to_string(), format!("invalid endpoint: {error}"))
        })
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        operation: SatOperation,
        body: &B,
    ) -> Result<RemoteResponse, SatGatewayError> {
        let url = self.endpoint(operation)?;
        self.send(operation, self.client.post(url).json(body)).await
    }

    async fn send(
        &self,
        operation: SatOperation,
        request: RequestBuilder,
    ) -> Result<RemoteResponse, SatGatewayError> {
        let response = request
            .timeout(operation.timeout())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| map_transport_error(operation, &error))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|error| map_transport_error(operation, &error))?;
        debug!(%operation, status, bytes = body.len(), "remote API responded");

        Ok(RemoteResponse {
            status,
            payload: decode_payload(content_type.as_deref(), body.as_ref()),
        })
    }
}

/// Ensure the base URL ends with a slash so endpoint paths are appended
/// rather than replacing its last segment.
pub fn normalise_base_url(mut base_url: Url) -> Url {
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    base_url
}

const BINARY_MIME: &str = "application/octet-stream";
const TEXT_MIME: &str = "text/plain";

fn file_part(file: &CertificateFile, mime: &str) -> Result<Part, reqwest::Error> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(mime)
}

/// Certificate and key travel as binary parts; the password file as text.
fn certificate_form(bundle: &CertificateBundle) -> Result<Form, reqwest::Error> {
    Ok(Form::new()
        .text(fields::RFC, bundle.rfc.to_string())
        .part(fields::CER_FILE, file_part(&bundle.cer_file, BINARY_MIME)?)
        .part(fields::KEY_FILE, file_part(&bundle.key_file, BINARY_MIME)?)
        .part(fields::PASSWORD_FILE, file_part(&bundle.password_file, TEXT_MIME)?))
}

/// JSON bodies are decoded when the response declares them; everything else,
/// including JSON that fails to parse, is wrapped as `{"raw": text}`.
fn decode_payload(content_type: Option<&str>, body: &[u8]) -> Value {
    let declares_json = content_type
        .is_some_and(|value| value.trim_start().starts_with("application/json"));
    if declares_json {
        if let Ok(value) = serde_json::from_slice(body) {
            return value;
        }
    }
    json!({ "raw": String::from_utf8_lossy(body) })
}

fn map_transport_error(operation: SatOperation, error: &reqwest::Error) -> SatGatewayError {
    if error.is_timeout() {
        SatGatewayError::timeout(operation.to_string(), error.to_string())
    } else {
        SatGatewayError::transport(operation.to_string(), error.to_string())
    }
}

#[async_trait]
impl SatGateway for SatApiHttpGateway {
    async fn upload_certificates(
        &self,
        bundle: &CertificateBundle,
    ) -> Result<RemoteResponse, SatGatewayError> {
        let operation = SatOperation::UploadCertificates;
        let url = self.endpoint(operation)?;
        let form = certificate_form(bundle)
            .map_err(|error| map_transport_error(operation, &error))?;
        let request = self.client.post(url).multipart(form);
        self.send(operation, request).await
    }

    async fn initial_requests(
        &self,
        rfc: &Rfc,
        year: TaxYear,
    ) -> Result<RemoteResponse, SatGatewayError> {
        let body = RfcYearBody {
            rfc: rfc.as_ref(),
            year: year.value(),
        };
        self.post_json(SatOperation::InitialRequests, &body).await
    }

    async fn authenticate(&self, rfc: &Rfc) -> Result<RemoteResponse, SatGatewayError> {
        let body = RfcBody { rfc: rfc.as_ref() };
        self.post_json(SatOperation::Authenticate, &body).await
    }

    async fn verify_requests(
        &self,
        rfc: &Rfc,
        year: TaxYear,
    ) -> Result<RemoteResponse, SatGatewayError> {
        let body = RfcYearBody {
            rfc: rfc.as_ref(),
            year: year.value(),
        };
        self.post_json(SatOperation::VerifyRequests, &body).await
    }
}
