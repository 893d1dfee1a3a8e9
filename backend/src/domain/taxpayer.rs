//! Client taxpayers identified by their RFC.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ClientId, GroupId};

/// RFC length for legal entities (personas morales).
pub const RFC_LEN_LEGAL_ENTITY: usize = 12;
/// RFC length for individuals (personas físicas).
pub const RFC_LEN_INDIVIDUAL: usize = 13;

/// Validation errors for RFC and fiscal year inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxpayerValidationError {
    /// RFC was blank.
    EmptyRfc,
    /// RFC had the wrong number of characters.
    RfcLength {
        /// Characters received.
        length: usize,
    },
    /// RFC contained characters outside `A-Z`, `0-9`, `&` and `Ñ`.
    RfcCharacters,
    /// Fiscal year outside the accepted range.
    YearOutOfRange {
        /// Year received.
        year: i32,
        /// Earliest accepted year.
        min: i32,
        /// Latest accepted year.
        max: i32,
    },
}

impl fmt::Display for TaxpayerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRfc => write!(f, "rfc must not be empty"),
            Self::RfcLength { length } => write!(
                f,
                "rfc must have {RFC_LEN_LEGAL_ENTITY} or {RFC_LEN_INDIVIDUAL} characters, got {length}"
            ),
            Self::RfcCharacters => {
                write!(f, "rfc may only contain letters, digits, '&' or 'Ñ'")
            }
            Self::YearOutOfRange { year, min, max } => {
                write!(f, "year {year} must be between {min} and {max}")
            }
        }
    }
}

impl std::error::Error for TaxpayerValidationError {}

/// Mexican taxpayer id, trimmed and upper-cased.
///
/// # Examples
/// ```
/// use satisfacture::domain::Rfc;
///
/// let rfc = Rfc::new(" abc010101aaa ").unwrap();
/// assert_eq!(rfc.as_ref(), "ABC010101AAA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rfc(String);

impl Rfc {
    /// Validate and normalise `raw` to upper case.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TaxpayerValidationError> {
        let normalised = raw.as_ref().trim().to_uppercase();
        if normalised.is_empty() {
            return Err(TaxpayerValidationError::EmptyRfc);
        }
        let length = normalised.chars().count();
        if length != RFC_LEN_LEGAL_ENTITY && length != RFC_LEN_INDIVIDUAL {
            return Err(TaxpayerValidationError::RfcLength { length });
        }
        let allowed = normalised
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '&' || ch == 'Ñ');
        if !allowed {
            return Err(TaxpayerValidationError::RfcCharacters);
        }
        Ok(Self(normalised))
    }

    /// Wrap an RFC read back from storage without re-validating it.
    ///
    /// Rows written by the ingestion pipeline or before validation existed
    /// may not satisfy [`Rfc::new`]; they must still be listed.
    pub fn from_stored(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }
}

impl AsRef<str> for Rfc {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Rfc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Rfc> for String {
    fn from(value: Rfc) -> Self {
        value.0
    }
}

impl TryFrom<String> for Rfc {
    type Error = TaxpayerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Fiscal year used by SAT request workflows and the document viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i32", into = "i32")]
pub struct TaxYear(i32);

impl TaxYear {
    /// Earliest year the console accepts for SAT requests.
    pub const MIN: i32 = 2000;
    /// Upper bound kept generous for scheduled requests.
    pub const MAX: i32 = 2100;

    /// Accept `year` when it lies within [`Self::MIN`, `Self::MAX`].
    pub fn new(year: i32) -> Result<Self, TaxpayerValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&year) {
            return Err(TaxpayerValidationError::YearOutOfRange {
                year,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(year))
    }

    /// The year as an integer.
    pub fn value(self) -> i32 {
        self.0
    }
}

impl From<TaxYear> for i32 {
    fn from(value: TaxYear) -> Self {
        value.0
    }
}

impl TryFrom<i32> for TaxYear {
    type Error = TaxpayerValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Client record as stored in the registry.
///
/// Records are created by the remote conversion service after a successful
/// certificate upload; the console only edits `legal_name` and `group_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Taxpayer {
    /// Client id.
    #[schema(value_type = String, format = Uuid)]
    pub id: ClientId,
    /// Taxpayer RFC.
    #[schema(value_type = String, example = "ABC010101AAA")]
    pub rfc: Rfc,
    /// Legal name (razón social).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    /// Assigned group.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub group_id: Option<GroupId>,
}

impl Taxpayer {
    /// Display label used by selection lists: the RFC followed by the legal
    /// name when one is known.
    pub fn label(&self) -> String {
        match self.legal_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{} — {name}", self.rfc),
            _ => self.rfc.to_string(),
        }
    }
}
