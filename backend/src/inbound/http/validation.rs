//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{CertificateFormError, ClientId, Error, GroupId, InvalidIdError, TaxYear};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidYear,
    InvalidRfc,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidYear => "invalid_year",
            ErrorCode::InvalidRfc => "invalid_rfc",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn parse_id<T>(
    raw: &str,
    field: FieldName,
    parse: impl FnOnce(&str) -> Result<T, InvalidIdError>,
) -> Result<T, Error> {
    parse(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": field.as_str(),
            "value": raw,
            "code": ErrorCode::InvalidUuid.as_str(),
        }))
    })
}

pub(crate) fn parse_group_id(raw: &str, field: FieldName) -> Result<GroupId, Error> {
    parse_id(raw, field, |value| GroupId::new(value))
}

pub(crate) fn parse_client_id(raw: &str, field: FieldName) -> Result<ClientId, Error> {
    parse_id(raw, field, |value| ClientId::new(value))
}

pub(crate) fn parse_client_ids(raw: &[String], field: FieldName) -> Result<Vec<ClientId>, Error> {
    raw.iter()
        .enumerate()
        .map(|(index, value)| {
            ClientId::new(value).map_err(|err| {
                Error::invalid_request(err.to_string()).with_details(json!({
                    "field": field.as_str(),
                    "index": index,
                    "value": value,
                    "code": ErrorCode::InvalidUuid.as_str(),
                }))
            })
        })
        .collect()
}

pub(crate) fn parse_year(raw: i32, field: FieldName) -> Result<TaxYear, Error> {
    TaxYear::new(raw).map_err(|err| field_error(field, ErrorCode::InvalidYear, err.to_string()))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(field, ErrorCode::MissingField, format!("missing required field: {name}"))
}

/// Map certificate form failures; every missing field is listed at once.
pub(crate) fn certificate_form_error(err: CertificateFormError) -> Error {
    match err {
        CertificateFormError::Missing { fields } => Error::invalid_request(
            format!("missing required fields: {}", fields.join(", ")),
        )
        .with_details(json!({
            "missing": fields,
            "code": ErrorCode::MissingField.as_str(),
        })),
        CertificateFormError::InvalidRfc(inner) => {
            field_error(FieldName::new("rfc"), ErrorCode::InvalidRfc, inner.to_string())
        }
    }
}
