//! e.firma upload forms.
//!
//! The console never inspects certificate contents: files are carried as
//! opaque bytes from the multipart form to the SAT API.

use std::fmt;

use crate::domain::{Rfc, TaxpayerValidationError};

/// Form field names shared by the inbound form and the SAT API request.
pub mod fields {
    /// Taxpayer RFC.
    pub const RFC: &str = "rfc";
    /// Name of the person uploading.
    pub const UPLOADER_NAME: &str = "uploaderName";
    /// Taxpayer legal name.
    pub const LEGAL_NAME: &str = "legalName";
    /// Certificate (`.cer`) file.
    pub const CER_FILE: &str = "cer_file";
    /// Private key (`.key`) file.
    pub const KEY_FILE: &str = "key_file";
    /// Text file holding the key password.
    pub const PASSWORD_FILE: &str = "password_file";
}

/// One uploaded file.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateFile {
    /// Name the browser reported.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for CertificateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Files and RFC forwarded to the conversion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    /// Taxpayer the files belong to.
    pub rfc: Rfc,
    /// Certificate file.
    pub cer_file: CertificateFile,
    /// Private key file.
    pub key_file: CertificateFile,
    /// Password file.
    pub password_file: CertificateFile,
}

/// Validation failures for upload forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateFormError {
    /// Required inputs were absent or empty; every missing field is listed.
    Missing {
        /// Names of the absent fields.
        fields: Vec<&'static str>,
    },
    /// The RFC was present but malformed.
    InvalidRfc(TaxpayerValidationError),
}

impl fmt::Display for CertificateFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { fields } => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            Self::InvalidRfc(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CertificateFormError {}

/// Raw upload form as received from the inbound adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateUploadForm {
    /// RFC as typed.
    pub rfc: Option<String>,
    /// Uploader name as typed.
    pub uploader_name: Option<String>,
    /// Legal name as typed.
    pub legal_name: Option<String>,
    /// Certificate file, if sent.
    pub cer_file: Option<CertificateFile>,
    /// Private key file, if sent.
    pub key_file: Option<CertificateFile>,
    /// Password file, if sent.
    pub password_file: Option<CertificateFile>,
}

/// Upload submitted by a client-role user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSubmission {
    /// Files and RFC.
    pub bundle: CertificateBundle,
    /// Name of the person uploading.
    pub uploader_name: String,
    /// Legal name for the client record.
    pub legal_name: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn non_empty(file: Option<CertificateFile>) -> Option<CertificateFile> {
    file.filter(|file| !file.bytes.is_empty())
}

struct Collected {
    rfc: Option<String>,
    cer_file: Option<CertificateFile>,
    key_file: Option<CertificateFile>,
    password_file: Option<CertificateFile>,
    missing: Vec<&'static str>,
}

impl CertificateUploadForm {
    fn collect(
        rfc: Option<String>,
        cer_file: Option<CertificateFile>,
        key_file: Option<CertificateFile>,
        password_file: Option<CertificateFile>,
        mut missing: Vec<&'static str>,
    ) -> Collected {
        let rfc = non_blank(rfc);
        let cer_file = non_empty(cer_file);
        let key_file = non_empty(key_file);
        let password_file = non_empty(password_file);
        for (present, field) in [
            (rfc.is_some(), fields::RFC),
            (cer_file.is_some(), fields::CER_FILE),
            (key_file.is_some(), fields::KEY_FILE),
            (password_file.is_some(), fields::PASSWORD_FILE),
        ] {
            if !present {
                missing.push(field);
            }
        }
        Collected {
            rfc,
            cer_file,
            key_file,
            password_file,
            missing,
        }
    }

    fn bundle(collected: Collected) -> Result<CertificateBundle, CertificateFormError> {
        match collected {
            Collected {
                rfc: Some(rfc),
                cer_file: Some(cer_file),
                key_file: Some(key_file),
                password_file: Some(password_file),
                missing,
            } if missing.is_empty() => {
                let rfc = Rfc::new(rfc).map_err(CertificateFormError::InvalidRfc)?;
                Ok(CertificateBundle {
                    rfc,
                    cer_file,
                    key_file,
                    password_file,
                })
            }
            Collected { missing, .. } => Err(CertificateFormError::Missing { fields: missing }),
        }
    }

    /// Validate a client-role upload: uploader name, RFC and all three files
    /// are required; the legal name is optional.
    pub fn into_client_submission(self) -> Result<ClientSubmission, CertificateFormError> {
        let uploader_name = non_blank(self.uploader_name);
        let legal_name = non_blank(self.legal_name);
        let missing = if uploader_name.is_some() {
            Vec::new()
        } else {
            vec![fields::UPLOADER_NAME]
        };
        let collected = Self::collect(
            self.rfc,
            self.cer_file,
            self.key_file,
            self.password_file,
            missing,
        );
        let bundle = Self::bundle(collected)?;
        Ok(ClientSubmission {
            bundle,
            uploader_name: uploader_name.unwrap_or_default(),
            legal_name,
        })
    }

    /// Validate an admin upload: RFC and all three files are required.
    pub fn into_admin_bundle(self) -> Result<CertificateBundle, CertificateFormError> {
        let collected = Self::collect(
            self.rfc,
            self.cer_file,
            self.key_file,
            self.password_file,
            Vec::new(),
        );
        Self::bundle(collected)
    }
}
