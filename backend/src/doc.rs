//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every console endpoint, the domain types they
//! exchange, and the session cookie security scheme. The document backs
//! Swagger UI in debug builds and is exported by `cargo run --bin
//! openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{InitialRequestsOutcome, UploadReceipt, VerificationOutcome};
use crate::domain::{
    AppState, BulkAssignment, CfdiRow, ConsentNotice, ConsoleSession, Direction, DocumentView,
    Error, ErrorCode, Focus, Group, GroupFilter, MetadataRow, Principal, Role, Section, Selection,
    Taxpayer, UploadLogEntry, UserAccount, VerificationItem, VerificationReport,
};
use crate::inbound::http::clients::AssignGroupRequest;
use crate::inbound::http::console::{
    ConsentRequest, FocusRequest, MemberList, MemberOption, SectionRequest,
};
use crate::inbound::http::focus::YearRequest;
use crate::inbound::http::groups::{AddMembersRequest, CreateGroupRequest};
use crate::inbound::http::users::{CreateUserBody, LoginRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the console REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Satisfacture console API",
        description = "Administration console for SAT tax-document workflows: groups, clients, users, e.firma uploads and CFDI review."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::console::current_session,
        crate::inbound::http::console::select_section,
        crate::inbound::http::console::set_group_filter,
        crate::inbound::http::console::load_members,
        crate::inbound::http::console::focus_client,
        crate::inbound::http::console::clear_focus,
        crate::inbound::http::console::consent_notice,
        crate::inbound::http::console::accept_consent,
        crate::inbound::http::groups::list_groups,
        crate::inbound::http::groups::create_group,
        crate::inbound::http::groups::delete_group,
        crate::inbound::http::groups::group_members,
        crate::inbound::http::groups::add_members,
        crate::inbound::http::groups::remove_member,
        crate::inbound::http::clients::list_clients,
        crate::inbound::http::clients::assign_group,
        crate::inbound::http::certificates::upload_certificates,
        crate::inbound::http::focus::initial_requests,
        crate::inbound::http::focus::verification,
        crate::inbound::http::focus::documents,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error, ErrorCode, ConsoleSession, AppState, Selection, Section, GroupFilter, Focus,
        Principal, Role, UserAccount, Group, BulkAssignment, Taxpayer, ConsentNotice,
        UploadReceipt, UploadLogEntry, InitialRequestsOutcome, VerificationOutcome,
        VerificationReport, VerificationItem, DocumentView, CfdiRow, MetadataRow, Direction,
        LoginRequest, CreateUserBody, SectionRequest, FocusRequest, ConsentRequest, MemberList,
        MemberOption, CreateGroupRequest, AddMembersRequest, AssignGroupRequest, YearRequest
    )),
    tags(
        (name = "session", description = "Login, logout and console navigation"),
        (name = "users", description = "Console accounts"),
        (name = "groups", description = "Client groups"),
        (name = "clients", description = "Client registry"),
        (name = "certificates", description = "e.firma uploads and the confidentiality notice"),
        (name = "sat", description = "SAT download and verification workflows"),
        (name = "documents", description = "Stored CFDI and metadata"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
