//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the remote API gateway, the password hasher)
//! expose typed errors built with `define_port_error!`. Driving ports
//! (use-cases called by inbound adapters) return the domain [`Error`].
//!
//! [`Error`]: crate::domain::Error

mod macros;
pub(crate) use macros::define_port_error;

mod certificate_uploads;
mod document_repository;
mod document_viewer;
mod group_directory;
mod group_repository;
mod login_service;
mod password_hasher;
mod sat_gateway;
mod sat_workflow;
mod taxpayer_repository;
mod upload_log_repository;
mod user_administration;
mod user_repository;

#[cfg(test)]
pub use certificate_uploads::MockCertificateUploads;
pub use certificate_uploads::{CertificateUploads, UploadReceipt};
#[cfg(test)]
pub use document_repository::MockDocumentRepository;
pub use document_repository::{DocumentRepository, DocumentRepositoryError};
#[cfg(test)]
pub use document_viewer::MockDocumentViewer;
pub use document_viewer::DocumentViewer;
#[cfg(test)]
pub use group_directory::MockGroupDirectory;
pub use group_directory::GroupDirectory;
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupRepository, GroupRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use sat_gateway::MockSatGateway;
pub use sat_gateway::{RemoteResponse, SatGateway, SatGatewayError, SatOperation};
#[cfg(test)]
pub use sat_workflow::MockSatWorkflow;
pub use sat_workflow::{InitialRequestsOutcome, SatWorkflow, VerificationOutcome};
#[cfg(test)]
pub use taxpayer_repository::MockTaxpayerRepository;
pub use taxpayer_repository::{TaxpayerRepository, TaxpayerRepositoryError};
#[cfg(test)]
pub use upload_log_repository::MockUploadLogRepository;
pub use upload_log_repository::{RecordedUpload, UploadLogRepository, UploadLogRepositoryError};
#[cfg(test)]
pub use user_administration::MockUserAdministration;
pub use user_administration::{CreateUserRequest, UserAdministration};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
