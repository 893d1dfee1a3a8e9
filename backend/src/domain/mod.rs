//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: define strongly typed console entities used by the HTTP and
//! persistence adapters, the per-user session state machine, and the
//! services implementing the driving ports.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - Identifiers: `UserId`, `GroupId`, `ClientId`.
//! - Accounts: `UserAccount`, `NewUser`, `Role`, `Principal`.
//! - Registry: `Group`, `GroupName`, `Taxpayer`, `Rfc`, `TaxYear`.
//! - Uploads: `CertificateUploadForm`, `CertificateBundle`, upload log types.
//! - Session: `ConsoleSession` and its sub-states.
//! - Remote results: `VerificationReport`, `DocumentView`.

pub mod auth;
pub mod certificate;
pub mod consent;
pub mod console_session;
pub mod documents;
pub mod error;
pub mod group;
pub mod ids;
pub(crate) mod payload;
pub mod ports;
pub mod sat_verification;
#[cfg(test)]
pub(crate) mod service_test_support;
pub mod slug;
pub mod taxpayer;
pub mod trace_id;
pub mod upload_log;
pub mod user;

mod authentication_service;
mod certificate_upload_service;
mod document_viewer_service;
mod group_membership_service;
mod sat_workflow_service;
mod user_admin_service;

pub use self::auth::{LoginCredentials, LoginValidationError, Principal};
pub use self::certificate::{
    CertificateBundle, CertificateFile, CertificateFormError, CertificateUploadForm,
    ClientSubmission, fields as certificate_fields,
};
pub use self::consent::{ConsentNotice, DEFAULT_FIRM_NAME};
pub use self::console_session::{
    AppState, ConsoleSession, Focus, GroupFilter, Section, Selection, SessionTransitionError,
};
pub use self::documents::{
    CfdiRow, Direction, DocumentView, MetadataRow, StoredCfdi, StoredMetadata,
};
pub use self::error::{Error, ErrorCode};
pub use self::group::{BulkAssignment, GROUP_NAME_MAX, Group, GroupName, GroupValidationError};
pub use self::ids::{ClientId, GroupId, InvalidIdError, UserId};
pub use self::sat_verification::{UNKNOWN_STATUS, VerificationItem, VerificationReport};
pub use self::slug::derive_slug;
pub use self::taxpayer::{Rfc, TaxYear, Taxpayer, TaxpayerValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::upload_log::{ClientUploadUpdate, NewUploadLogEntry, UploadLogEntry};
pub use self::user::{NewUser, Role, USERNAME_MAX, UserAccount, UserValidationError, Username};

pub use self::authentication_service::AuthenticationService;
pub use self::certificate_upload_service::CertificateUploadService;
pub use self::document_viewer_service::DocumentViewerService;
pub use self::group_membership_service::GroupMembershipService;
pub use self::sat_workflow_service::SatWorkflowService;
pub use self::user_admin_service::{BootstrapAdmin, UserAdminService};

