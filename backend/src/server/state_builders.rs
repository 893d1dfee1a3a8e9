//! Wiring of Diesel repositories, outbound adapters and domain services into
//! the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use satisfacture::domain::{
    AuthenticationService, BootstrapAdmin, CertificateUploadService, DocumentViewerService,
    Error, GroupMembershipService, SatWorkflowService, UserAdminService,
};
use satisfacture::inbound::http::state::HttpState;
use satisfacture::outbound::password::Argon2PasswordHasher;
use satisfacture::outbound::persistence::{
    DbPool, DieselDocumentRepository, DieselGroupRepository, DieselTaxpayerRepository,
    DieselUploadLogRepository, DieselUserRepository,
};
use satisfacture::outbound::sat_api::SatApiHttpGateway;

type AdminService = UserAdminService<DieselUserRepository, DieselGroupRepository, Argon2PasswordHasher>;

/// Driving ports plus the concrete admin service used for start-up seeding.
pub struct ConsoleServices {
    pub http_state: web::Data<HttpState>,
    admin: Arc<AdminService>,
}

impl ConsoleServices {
    /// Seed the bootstrap admin account when one is configured.
    ///
    /// # Errors
    ///
    /// Propagates persistence and hashing failures.
    pub async fn seed_bootstrap_admin(&self, bootstrap: &BootstrapAdmin) -> Result<bool, Error> {
        self.admin.ensure_bootstrap_admin(bootstrap).await
    }
}

/// Build every service over a shared pool and SAT gateway.
pub fn build_console_services(
    pool: &DbPool,
    gateway: SatApiHttpGateway,
    firm_name: &str,
) -> ConsoleServices {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let gateway = Arc::new(gateway);
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let groups = Arc::new(DieselGroupRepository::new(pool.clone()));
    let taxpayers = Arc::new(DieselTaxpayerRepository::new(pool.clone()));
    let uploads = Arc::new(DieselUploadLogRepository::new(pool.clone()));
    let documents = Arc::new(DieselDocumentRepository::new(pool.clone()));

    let admin = Arc::new(UserAdminService::new(
        users.clone(),
        groups.clone(),
        hasher.clone(),
        clock.clone(),
    ));
    let http_state = web::Data::new(HttpState {
        login: Arc::new(AuthenticationService::new(users, hasher)),
        users: admin.clone(),
        groups: Arc::new(GroupMembershipService::new(
            groups.clone(),
            taxpayers.clone(),
            clock.clone(),
        )),
        uploads: Arc::new(CertificateUploadService::new(
            gateway.clone(),
            uploads,
            groups,
            clock,
            firm_name,
        )),
        sat: Arc::new(SatWorkflowService::new(taxpayers.clone(), gateway)),
        documents: Arc::new(DocumentViewerService::new(taxpayers, documents)),
    });

    ConsoleServices { http_state, admin }
}
