//! Read-only CFDI and metadata views for one client and fiscal year.
//!
//! Documents are written by the ingestion pipeline as JSON trees (the CFDI
//! XML converted attribute-by-attribute, `@`-prefixed). The console filters
//! them by year and flattens them into table rows.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::payload::{first_object, first_text};
use crate::domain::{Rfc, TaxYear};

const COMPROBANTE: &str = "cfdi:Comprobante";
const EMISOR: &str = "cfdi:Emisor";
const RECEPTOR: &str = "cfdi:Receptor";
const COMPLEMENTO: &str = "cfdi:Complemento";
const TIMBRE: &str = "tfd:TimbreFiscalDigital";

/// Stored CFDI as written by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCfdi {
    /// Row id.
    pub id: Uuid,
    /// Owning client.
    pub client_rfc: Rfc,
    /// UUID column, when the pipeline set one.
    pub uuid: Option<String>,
    /// Parsed CFDI XML as JSON.
    pub xml: Value,
    /// When the pipeline processed the file.
    pub processed_at: Option<DateTime<Utc>>,
}

/// Stored SAT metadata record.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMetadata {
    /// Row id.
    pub id: Uuid,
    /// Owning client.
    pub client_rfc: Rfc,
    /// SAT metadata fields.
    pub document: Value,
    /// When the pipeline processed the record.
    pub processed_at: Option<DateTime<Utc>>,
}

/// Whether the CFDI was issued or received by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Direction {
    /// The client is the issuer.
    #[serde(rename = "Emitido")]
    Issued,
    /// The client is the receiver.
    #[serde(rename = "Recibido")]
    Received,
    /// Neither party is the client.
    #[serde(rename = "")]
    Unrelated,
}

/// One CFDI table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CfdiRow {
    /// Issue date.
    pub fecha: Option<String>,
    /// Fiscal stamp UUID.
    pub uuid: Option<String>,
    /// Voucher type.
    pub tipo: Option<String>,
    /// Series.
    pub serie: Option<String>,
    /// Folio.
    pub folio: Option<String>,
    /// Total amount.
    pub total: Option<String>,
    /// Issuer RFC.
    pub emisor: Option<String>,
    /// Receiver RFC.
    pub receptor: Option<String>,
    /// Direction relative to the client.
    pub sentido: Direction,
}

/// One metadata table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRow {
    /// Issue date.
    pub fecha_emision: Option<String>,
    /// Fiscal UUID.
    pub uuid: Option<String>,
    /// Voucher effect.
    pub efecto: Option<String>,
    /// Amount.
    pub monto: Option<String>,
    /// Issuer RFC.
    pub rfc_emisor: Option<String>,
    /// Receiver RFC.
    pub rfc_receptor: Option<String>,
    /// SAT status.
    pub estatus: Option<String>,
    /// SAT certification date.
    pub fecha_cert_sat: Option<String>,
}

/// Filtered rows for one client and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    /// Client RFC.
    #[schema(value_type = String)]
    pub rfc: Rfc,
    /// Fiscal year shown.
    #[schema(value_type = i32)]
    pub year: TaxYear,
    /// CFDI rows.
    pub cfdi: Vec<CfdiRow>,
    /// Metadata rows.
    pub metadata: Vec<MetadataRow>,
}

/// A date string matches when it starts with `"<year>-"`.
pub fn date_text_in_year(value: &Value, year: TaxYear) -> bool {
    value
        .as_str()
        .is_some_and(|text| text.starts_with(&format!("{}-", year.value())))
}

fn timestamp_in_year(value: Option<DateTime<Utc>>, year: TaxYear) -> bool {
    value.is_some_and(|at| at.year() == year.value())
}

fn empty_map() -> &'static Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    EMPTY.get_or_init(Map::new)
}

impl StoredCfdi {
    fn comprobante(&self) -> &Map<String, Value> {
        self.xml
            .as_object()
            .and_then(|xml| first_object(xml, &[COMPROBANTE]))
            .unwrap_or(empty_map())
    }

    /// Emisor/Receptor nodes sit at the top of the tree or under the
    /// Comprobante node depending on the converter version.
    fn party(&self, key: &str) -> &Map<String, Value> {
        self.xml
            .as_object()
            .and_then(|xml| first_object(xml, &[key]))
            .or_else(|| first_object(self.comprobante(), &[key]))
            .unwrap_or(empty_map())
    }

    fn stamp_uuid(&self) -> Option<String> {
        self.xml
            .as_object()
            .and_then(|xml| first_object(xml, &[COMPLEMENTO]))
            .and_then(|complemento| first_object(complemento, &[TIMBRE]))
            .and_then(|timbre| first_text(timbre, &["@UUID"]))
    }

    /// Whether the CFDI belongs to `year`.
    pub fn in_year(&self, year: TaxYear) -> bool {
        let issued = self.comprobante().get("@Fecha");
        issued.is_some_and(|fecha| date_text_in_year(fecha, year))
            || timestamp_in_year(self.processed_at, year)
    }

    /// Flatten into a table row from the point of view of `client`.
    pub fn to_row(&self, client: &Rfc) -> CfdiRow {
        let comprobante = self.comprobante();
        let emisor = first_text(self.party(EMISOR), &["@Rfc", "@RFC"]);
        let receptor = first_text(self.party(RECEPTOR), &["@Rfc", "@RFC"]);
        let sentido = if emisor.as_deref() == Some(client.as_ref()) {
            Direction::Issued
        } else if receptor.as_deref() == Some(client.as_ref()) {
            Direction::Received
        } else {
            Direction::Unrelated
        };
        CfdiRow {
            fecha: first_text(comprobante, &["@Fecha"]),
            uuid: self
                .stamp_uuid()
                .or_else(|| self.uuid.clone().filter(|uuid| !uuid.is_empty())),
            tipo: first_text(comprobante, &["@TipoDeComprobante"]),
            serie: first_text(comprobante, &["@Serie"]),
            folio: first_text(comprobante, &["@Folio"]),
            total: first_text(comprobante, &["@Total"]),
            emisor,
            receptor,
            sentido,
        }
    }
}

impl StoredMetadata {
    fn fields(&self) -> &Map<String, Value> {
        self.document.as_object().unwrap_or(empty_map())
    }

    /// Whether the record belongs to `year`.
    pub fn in_year(&self, year: TaxYear) -> bool {
        let issued = self.fields().get("FechaEmision");
        issued.is_some_and(|fecha| date_text_in_year(fecha, year))
            || timestamp_in_year(self.processed_at, year)
    }

    /// Flatten into a table row.
    pub fn to_row(&self) -> MetadataRow {
        let fields = self.fields();
        MetadataRow {
            fecha_emision: first_text(fields, &["FechaEmision"]),
            uuid: first_text(fields, &["Uuid", "UUID"]),
            efecto: first_text(fields, &["EfectoComprobante"]),
            monto: first_text(fields, &["Monto"]),
            rfc_emisor: first_text(fields, &["RfcEmisor"]),
            rfc_receptor: first_text(fields, &["RfcReceptor"]),
            estatus: first_text(fields, &["Estatus"]),
            fecha_cert_sat: first_text(fields, &["FechaCertificacionSat"]),
        }
    }
}

impl DocumentView {
    /// Filter stored documents to `year` and flatten them into rows. Input
    /// order is preserved; callers pass rows ordered by processing time.
    pub fn build(
        rfc: Rfc,
        year: TaxYear,
        cfdi: &[StoredCfdi],
        metadata: &[StoredMetadata],
    ) -> Self {
        let cfdi = cfdi
            .iter()
            .filter(|document| document.in_year(year))
            .map(|document| document.to_row(&rfc))
            .collect();
        let metadata = metadata
            .iter()
            .filter(|document| document.in_year(year))
            .map(StoredMetadata::to_row)
            .collect();
        Self {
            rfc,
            year,
            cfdi,
            metadata,
        }
    }
}

#[cfg(test)]
#[path = "documents_tests.rs"]
mod tests;
