//! Console navigation handlers.
//!
//! These endpoints drive the per-user [`ConsoleSession`] state machine:
//! section switching, the admin group filter, the confirm-before-act client
//! focus, and the client-role confidentiality acknowledgement.
//!
//! ```text
//! GET    /api/v1/session
//! PUT    /api/v1/session/section       {"section":"clients"}
//! PUT    /api/v1/session/group-filter  {"kind":"group","group_id":"..."}
//! POST   /api/v1/session/members
//! POST   /api/v1/session/focus         {"clientId":"..."}
//! DELETE /api/v1/session/focus
//! GET    /api/v1/consent-notice
//! POST   /api/v1/session/consent       {"noticeRead":true,"usageUnderstood":true}
//! ```

use actix_web::{delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ConsentNotice, ConsoleSession, Error, Focus, GroupFilter, Section, Taxpayer};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_client_id};

/// Current console state.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses((status = 200, description = "Console state", body = ConsoleSession)),
    tags = ["session"],
    operation_id = "getSession"
)]
#[get("/session")]
pub async fn current_session(session: SessionContext) -> ApiResult<web::Json<ConsoleSession>> {
    Ok(web::Json(session.console()?))
}

/// Body for `PUT /api/v1/session/section`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionRequest {
    /// Section to open.
    pub section: Section,
}

/// Switch the visible console section.
#[utoipa::path(
    put,
    path = "/api/v1/session/section",
    request_body = SectionRequest,
    responses(
        (status = 200, description = "Section changed", body = ConsoleSession),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Section not available for the role", body = Error)
    ),
    tags = ["session"],
    operation_id = "selectSection"
)]
#[put("/session/section")]
pub async fn select_section(
    session: SessionContext,
    payload: web::Json<SectionRequest>,
) -> ApiResult<web::Json<ConsoleSession>> {
    let section = payload.into_inner().section;
    let (state, ()) = session.update(|console| Ok(console.select_section(section)?))?;
    Ok(web::Json(state))
}

/// Change the admin group filter; a different filter clears the loaded
/// member list and the focused client.
#[utoipa::path(
    put,
    path = "/api/v1/session/group-filter",
    request_body = GroupFilter,
    responses(
        (status = 200, description = "Filter changed", body = ConsoleSession),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Group not found", body = Error)
    ),
    tags = ["session"],
    operation_id = "setGroupFilter"
)]
#[put("/session/group-filter")]
pub async fn set_group_filter(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GroupFilter>,
) -> ApiResult<web::Json<ConsoleSession>> {
    session.require_admin()?;
    let filter = payload.into_inner();
    if let Some(group_id) = filter.group_id() {
        state.groups.find_group(group_id).await?;
    }
    let (console, ()) = session.update(|console| Ok(console.set_group_filter(filter)?))?;
    Ok(web::Json(console))
}

/// One entry of a selection list.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberOption {
    /// Display text, RFC plus legal name.
    pub label: String,
    /// Client record.
    #[serde(flatten)]
    pub client: Taxpayer,
}

impl From<Taxpayer> for MemberOption {
    fn from(client: Taxpayer) -> Self {
        Self {
            label: client.label(),
            client,
        }
    }
}

/// Response of `POST /api/v1/session/members`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberList {
    /// Filter the members were loaded for.
    pub filter: GroupFilter,
    /// Matching clients.
    pub members: Vec<MemberOption>,
}

/// Load the clients matching the current filter so one can be focused.
#[utoipa::path(
    post,
    path = "/api/v1/session/members",
    responses(
        (status = 200, description = "Clients for the filter", body = MemberList),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["session"],
    operation_id = "loadMembers"
)]
#[post("/session/members")]
pub async fn load_members(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MemberList>> {
    session.require_admin()?;
    let mut console = session.console()?;
    let filter = console.load_members()?;
    let members = state.groups.clients_for_filter(&filter).await?;
    session.store(&console)?;
    Ok(web::Json(MemberList {
        filter,
        members: members.into_iter().map(MemberOption::from).collect(),
    }))
}

/// Body for `POST /api/v1/session/focus`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FocusRequest {
    /// Client to confirm.
    pub client_id: String,
}

/// Confirm the selected client as the target of SAT workflows.
///
/// The member list is re-read so a client removed since loading cannot be
/// focused.
#[utoipa::path(
    post,
    path = "/api/v1/session/focus",
    request_body = FocusRequest,
    responses(
        (status = 200, description = "Focused client", body = Focus),
        (status = 400, description = "Members not loaded or client not listed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["session"],
    operation_id = "focusClient"
)]
#[post("/session/focus")]
pub async fn focus_client(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FocusRequest>,
) -> ApiResult<web::Json<Focus>> {
    let client_id = parse_client_id(&payload.client_id, FieldName::new("clientId"))?;
    let console = session.console()?;
    console.require_admin()?;
    let loaded = console.app()?.selection.members_loaded_for.clone();
    let members = match loaded {
        Some(filter) => state.groups.clients_for_filter(&filter).await?,
        None => Vec::new(),
    };
    let (_, focus) = session.update(|console| {
        let focus = console.focus_client(&client_id, &members)?;
        Ok(focus.clone())
    })?;
    debug!(client_id = %focus.client_id, "client focused");
    Ok(web::Json(focus))
}

/// Drop the focused client.
#[utoipa::path(
    delete,
    path = "/api/v1/session/focus",
    responses(
        (status = 200, description = "Focus cleared", body = ConsoleSession),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["session"],
    operation_id = "clearFocus"
)]
#[delete("/session/focus")]
pub async fn clear_focus(session: SessionContext) -> ApiResult<web::Json<ConsoleSession>> {
    let (state, ()) = session.update(|console| Ok(console.clear_focus()?))?;
    Ok(web::Json(state))
}

/// Confidentiality notice rendered for the signed-in client's group.
#[utoipa::path(
    get,
    path = "/api/v1/consent-notice",
    responses(
        (status = 200, description = "Notice", body = ConsentNotice),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Client role required", body = Error)
    ),
    tags = ["certificates"],
    operation_id = "consentNotice"
)]
#[get("/consent-notice")]
pub async fn consent_notice(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ConsentNotice>> {
    let console = session.console()?;
    let principal = console.require_client()?;
    Ok(web::Json(state.uploads.consent_notice(principal).await?))
}

/// Body for `POST /api/v1/session/consent`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRequest {
    /// First checkbox.
    #[serde(default)]
    pub notice_read: bool,
    /// Second checkbox.
    #[serde(default)]
    pub usage_understood: bool,
}

/// Record both acknowledgements; uploads stay blocked until this succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/session/consent",
    request_body = ConsentRequest,
    responses(
        (status = 200, description = "Consent recorded", body = ConsoleSession),
        (status = 400, description = "An acknowledgement is missing", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Client role required", body = Error)
    ),
    tags = ["certificates"],
    operation_id = "acceptConsent"
)]
#[post("/session/consent")]
pub async fn accept_consent(
    session: SessionContext,
    payload: web::Json<ConsentRequest>,
) -> ApiResult<web::Json<ConsoleSession>> {
    let ConsentRequest {
        notice_read,
        usage_understood,
    } = payload.into_inner();
    let (state, ()) =
        session.update(|console| Ok(console.accept_consent(notice_read, usage_understood)?))?;
    Ok(web::Json(state))
}

#[cfg(test)]
mod tests;
