//! e.firma upload handler.
//!
//! ```text
//! POST /api/v1/certificates  multipart/form-data
//!   rfc, uploaderName, legalName, cer_file, key_file, password_file
//! ```
//!
//! Client-role users must have accepted the confidentiality notice in the
//! current session; admins upload on behalf of any client.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{post, web};
use futures_util::TryStreamExt;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::UploadReceipt;
use crate::domain::{
    CertificateFile, CertificateUploadForm, Error, Role, certificate_fields as fields,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::certificate_form_error;

/// Largest accepted certificate, key or password file.
pub const MAX_FILE_BYTES: usize = 1024 * 1024;
const MAX_TEXT_BYTES: usize = 1024;

fn malformed(err: MultipartError) -> Error {
    Error::invalid_request(format!("malformed multipart body: {err}"))
}

fn too_large(field: &str, limit: usize) -> Error {
    Error::invalid_request(format!("field {field} exceeds {limit} bytes"))
        .with_details(json!({ "field": field, "code": "too_large", "limit": limit }))
}

async fn read_limited(field: &mut Field, name: &str, limit: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large(name, limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, Error> {
    let bytes = read_limited(field, name, MAX_TEXT_BYTES).await?;
    String::from_utf8(bytes).map_err(|_| {
        Error::invalid_request(format!("field {name} is not valid UTF-8"))
            .with_details(json!({ "field": name, "code": "invalid_encoding" }))
    })
}

async fn read_file(field: &mut Field, name: &str) -> Result<CertificateFile, Error> {
    let file_name = field
        .content_disposition()
        .and_then(|disposition| disposition.get_filename())
        .map_or_else(|| name.to_owned(), str::to_owned);
    let bytes = read_limited(field, name, MAX_FILE_BYTES).await?;
    Ok(CertificateFile { file_name, bytes })
}

/// Drain the multipart stream into a form. Unknown fields are skipped.
async fn read_form(mut payload: Multipart) -> Result<CertificateUploadForm, Error> {
    let mut form = CertificateUploadForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            fields::RFC => form.rfc = Some(read_text(&mut field, fields::RFC).await?),
            fields::UPLOADER_NAME => {
                form.uploader_name = Some(read_text(&mut field, fields::UPLOADER_NAME).await?);
            }
            fields::LEGAL_NAME => {
                form.legal_name = Some(read_text(&mut field, fields::LEGAL_NAME).await?);
            }
            fields::CER_FILE => form.cer_file = Some(read_file(&mut field, fields::CER_FILE).await?),
            fields::KEY_FILE => form.key_file = Some(read_file(&mut field, fields::KEY_FILE).await?),
            fields::PASSWORD_FILE => {
                form.password_file = Some(read_file(&mut field, fields::PASSWORD_FILE).await?);
            }
            other => {
                debug!(field = other, "skipping unknown multipart field");
                while field.try_next().await.map_err(malformed)?.is_some() {}
            }
        }
    }
    Ok(form)
}

/// Forward e.firma files to the conversion service and log the attempt.
///
/// Accepted uploads relay the remote payload in
/// `api`; remote rejections surface as `502` with the payload in `details`.
#[utoipa::path(
    post,
    path = "/api/v1/certificates",
    request_body(content_type = "multipart/form-data", description = "rfc, uploaderName, legalName, cer_file, key_file, password_file"),
    responses(
        (status = 200, description = "Upload accepted", body = UploadReceipt),
        (status = 400, description = "Missing fields, invalid RFC or consent not given", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 502, description = "Remote service rejected the upload", body = Error),
        (status = 504, description = "Remote service unreachable", body = Error)
    ),
    tags = ["certificates"],
    operation_id = "uploadCertificates"
)]
#[post("/certificates")]
pub async fn upload_certificates(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<web::Json<UploadReceipt>> {
    let console = session.console()?;
    let principal = console.principal()?.clone();
    if principal.role == Role::Client && !console.consent_confirmed() {
        return Err(Error::invalid_request(
            "accept the confidentiality notice before uploading files",
        )
        .with_details(json!({ "code": "consent_required" })));
    }

    let form = read_form(payload).await?;
    let receipt = match principal.role {
        Role::Client => {
            let submission = form.into_client_submission().map_err(certificate_form_error)?;
            state.uploads.upload_as_client(&principal, submission).await?
        }
        Role::Admin => {
            let bundle = form.into_admin_bundle().map_err(certificate_form_error)?;
            state.uploads.upload_as_admin(&principal, bundle).await?
        }
    };
    info!(
        username = %principal.username,
        rfc = %receipt.log_entry.rfc,
        status = receipt.log_entry.status_code,
        "certificate upload relayed"
    );
    Ok(web::Json(receipt))
}
