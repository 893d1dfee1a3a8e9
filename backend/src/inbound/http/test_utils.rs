//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use crate::domain::ports::{
    MockCertificateUploads, MockDocumentViewer, MockGroupDirectory, MockLoginService,
    MockSatWorkflow, MockUserAdministration,
};
use crate::domain::{ConsoleSession, Error, GroupId, Principal, Role, UserId};

use super::error::payload_configs;
use super::session::SessionContext;
use super::state::HttpState;

/// Path of the helper route that writes an arbitrary console state.
pub const SEED_SESSION_PATH: &str = "/test/session";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Principal for an administrator account.
pub fn admin_principal() -> Principal {
    Principal {
        user_id: UserId::random(),
        username: "admin".to_owned(),
        role: Role::Admin,
        group_id: None,
    }
}

/// Principal for a client account bound to `group_id`.
pub fn client_principal(group_id: GroupId) -> Principal {
    Principal {
        user_id: UserId::random(),
        username: "contador".to_owned(),
        role: Role::Client,
        group_id: Some(group_id),
    }
}

/// Handler for [`SEED_SESSION_PATH`].
pub async fn seed_session(
    session: SessionContext,
    state: web::Json<ConsoleSession>,
) -> Result<HttpResponse, Error> {
    session.store(&state.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

/// The `session` cookie set on `response`.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Store `state` through the seed route and return the resulting cookie.
pub async fn cookie_for<S>(app: &S, state: &ConsoleSession) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(SEED_SESSION_PATH)
        .set_json(state)
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "seeding session failed");
    session_cookie(&response)
}

/// App with the test session middleware, the seed route, and `routes`
/// mounted under `/api/v1`.
pub fn test_app(
    state: web::Data<HttpState>,
    routes: impl FnOnce(&mut web::ServiceConfig),
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(test_session_middleware())
        .route(SEED_SESSION_PATH, web::post().to(seed_session))
        .service(
            web::scope("/api/v1")
                .configure(payload_configs)
                .configure(routes),
        )
}

/// Mocks for every driving port; unused ones fail loudly if called.
#[derive(Default)]
pub struct MockPorts {
    /// Login port mock.
    pub login: MockLoginService,
    /// User administration port mock.
    pub users: MockUserAdministration,
    /// Group directory port mock.
    pub groups: MockGroupDirectory,
    /// Certificate uploads port mock.
    pub uploads: MockCertificateUploads,
    /// SAT workflow port mock.
    pub sat: MockSatWorkflow,
    /// Document viewer port mock.
    pub documents: MockDocumentViewer,
}

impl MockPorts {
    /// Wrap the mocks into shared HTTP state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            login: Arc::new(self.login),
            users: Arc::new(self.users),
            groups: Arc::new(self.groups),
            uploads: Arc::new(self.uploads),
            sat: Arc::new(self.sat),
            documents: Arc::new(self.documents),
        })
    }
}
