//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CertificateUploads, DocumentViewer, GroupDirectory, LoginService, SatWorkflow,
    UserAdministration,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential checks.
    pub login: Arc<dyn LoginService>,
    /// Account administration.
    pub users: Arc<dyn UserAdministration>,
    /// Groups and membership.
    pub groups: Arc<dyn GroupDirectory>,
    /// Certificate uploads.
    pub uploads: Arc<dyn CertificateUploads>,
    /// SAT workflows.
    pub sat: Arc<dyn SatWorkflow>,
    /// Document viewer.
    pub documents: Arc<dyn DocumentViewer>,
}
