//! Typed view over `verificar-solicitudes/` responses.
//!
//! The remote service has returned several payload shapes over time. Each
//! field is read through an explicit fallback list; a candidate is skipped
//! when it is absent, null, `""`, `false`, `0`, `[]` or `{}`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::payload::{first_present, first_text, scalar_text};

const ITEM_LIST_KEYS: [&str; 3] = ["detalle", "solicitudes", "items"];
const ID_KEYS: [&str; 3] = ["id_solicitud", "idSolicitud", "id"];
const STATUS_KEYS: [&str; 3] = ["estado", "status", "EstadoSolicitud"];
const PACKAGE_KEYS: [&str; 3] = ["paquetes", "ids_paquetes", "IdsPaquetes"];
const PERIOD_KEY: &str = "periodo";
const PERIOD_START_KEY: &str = "fecha_inicio";
const PERIOD_END_KEY: &str = "fecha_fin";

/// Status bucket for items that carry none.
pub const UNKNOWN_STATUS: &str = "unknown";

/// One download request reported by the SAT verification endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationItem {
    /// Request id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// SAT status text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Number of packages ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_count: Option<u64>,
    /// Requested period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

/// Normalised verification result with per-status counts.
///
/// # Examples
/// ```
/// use satisfacture::domain::VerificationReport;
///
/// let payload = serde_json::json!({
///     "solicitudes": [{ "idSolicitud": "a1", "status": "Terminada", "paquetes": ["p1", "p2"] }]
/// });
/// let report = VerificationReport::from_payload(&payload);
/// assert_eq!(report.total, 1);
/// assert_eq!(report.items[0].package_count, Some(2));
/// assert_eq!(report.by_status["Terminada"], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// Reported requests.
    pub items: Vec<VerificationItem>,
    /// Number of requests.
    pub total: usize,
    /// Request count per status.
    pub by_status: BTreeMap<String, usize>,
}

impl VerificationReport {
    /// Build a report from a raw payload. Unrecognised shapes yield an empty
    /// report rather than an error.
    pub fn from_payload(payload: &Value) -> Self {
        let items: Vec<VerificationItem> = item_values(payload)
            .iter()
            .filter_map(Value::as_object)
            .map(VerificationItem::from_object)
            .collect();

        let mut by_status = BTreeMap::new();
        for item in &items {
            let key = item.status.as_deref().unwrap_or(UNKNOWN_STATUS);
            *by_status.entry(key.to_owned()).or_insert(0) += 1;
        }

        Self {
            total: items.len(),
            items,
            by_status,
        }
    }

    /// Whether no requests were reported.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl VerificationItem {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            id: first_text(object, &ID_KEYS),
            status: first_text(object, &STATUS_KEYS),
            package_count: first_present(object, &PACKAGE_KEYS).and_then(package_count),
            period: period(object),
        }
    }
}

fn item_values(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(object) => ITEM_LIST_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

fn package_count(value: &Value) -> Option<u64> {
    match value {
        Value::Array(items) => u64::try_from(items.len()).ok(),
        Value::Number(number) => number.as_u64(),
        _ => None,
    }
}

fn period(object: &Map<String, Value>) -> Option<String> {
    if let Some(period) = first_text(object, &[PERIOD_KEY]) {
        return Some(period);
    }
    let start = first_present(object, &[PERIOD_START_KEY]);
    let end = first_present(object, &[PERIOD_END_KEY]);
    if start.is_none() && end.is_none() {
        return None;
    }
    let render = |bound: Option<&Value>| bound.and_then(scalar_text).unwrap_or_default();
    Some(format!("{} → {}", render(start), render(end)))
}
