//! Group registry handlers (admin only).
//!
//! ```text
//! GET    /api/v1/groups
//! POST   /api/v1/groups                       {"name":"Grupo Norte"}
//! DELETE /api/v1/groups/{groupId}
//! GET    /api/v1/groups/{groupId}/members
//! POST   /api/v1/groups/{groupId}/members     {"clientIds":["..."]}
//! DELETE /api/v1/groups/{groupId}/members/{clientId}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{BulkAssignment, Error, Group, Taxpayer};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_client_id, parse_client_ids, parse_group_id,
};

/// List every group sorted by name.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    responses(
        (status = 200, description = "Groups", body = [Group]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["groups"],
    operation_id = "listGroups"
)]
#[get("/groups")]
pub async fn list_groups(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Group>>> {
    session.require_admin()?;
    Ok(web::Json(state.groups.list_groups().await?))
}

/// Body for `POST /api/v1/groups`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    /// Display name.
    pub name: String,
}

/// Create a group; its slug derives from the name.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = Group),
        (status = 400, description = "Invalid name", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 409, description = "Slug already used", body = Error)
    ),
    tags = ["groups"],
    operation_id = "createGroup"
)]
#[post("/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateGroupRequest>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let group = state.groups.create_group(&payload.name).await?;
    info!(created_by = %admin.username, slug = %group.slug, "group created");
    Ok(HttpResponse::Created().json(group))
}

/// Delete a group and detach its members.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{group_id}",
    params(("group_id" = String, Path, description = "Group UUID")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Group not found", body = Error),
        (status = 409, description = "Users still belong to the group", body = Error)
    ),
    tags = ["groups"],
    operation_id = "deleteGroup"
)]
#[delete("/groups/{group_id}")]
pub async fn delete_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let group_id = parse_group_id(&path, FieldName::new("groupId"))?;
    state.groups.delete_group(&group_id).await?;
    info!(deleted_by = %admin.username, %group_id, "group deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Clients listed in the group's membership.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}/members",
    params(("group_id" = String, Path, description = "Group UUID")),
    responses(
        (status = 200, description = "Members", body = [Taxpayer]),
        (status = 404, description = "Group not found", body = Error)
    ),
    tags = ["groups"],
    operation_id = "groupMembers"
)]
#[get("/groups/{group_id}/members")]
pub async fn group_members(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Taxpayer>>> {
    session.require_admin()?;
    let group_id = parse_group_id(&path, FieldName::new("groupId"))?;
    Ok(web::Json(state.groups.group_members(&group_id).await?))
}

/// Body for `POST /api/v1/groups/{group_id}/members`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMembersRequest {
    /// Clients to assign.
    pub client_ids: Vec<String>,
}

/// Assign several clients at once; per-client failures are reported without
/// aborting the rest.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{group_id}/members",
    params(("group_id" = String, Path, description = "Group UUID")),
    request_body = AddMembersRequest,
    responses(
        (status = 200, description = "Assignment summary", body = BulkAssignment),
        (status = 400, description = "Invalid ids", body = Error),
        (status = 404, description = "Group not found", body = Error)
    ),
    tags = ["groups"],
    operation_id = "addGroupMembers"
)]
#[post("/groups/{group_id}/members")]
pub async fn add_members(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AddMembersRequest>,
) -> ApiResult<web::Json<BulkAssignment>> {
    session.require_admin()?;
    let group_id = parse_group_id(&path, FieldName::new("groupId"))?;
    let client_ids = parse_client_ids(&payload.client_ids, FieldName::new("clientIds"))?;
    let summary = state.groups.add_clients(&group_id, &client_ids).await?;
    info!(
        %group_id,
        assigned = summary.assigned,
        failed = summary.failed.len(),
        "bulk group assignment"
    );
    Ok(web::Json(summary))
}

/// Remove one client from the group.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{group_id}/members/{client_id}",
    params(
        ("group_id" = String, Path, description = "Group UUID"),
        ("client_id" = String, Path, description = "Client UUID")
    ),
    responses(
        (status = 204, description = "Client removed"),
        (status = 400, description = "Invalid ids", body = Error),
        (status = 404, description = "Group or client not found", body = Error)
    ),
    tags = ["groups"],
    operation_id = "removeGroupMember"
)]
#[delete("/groups/{group_id}/members/{client_id}")]
pub async fn remove_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let (raw_group, raw_client) = path.into_inner();
    let group_id = parse_group_id(&raw_group, FieldName::new("groupId"))?;
    let client_id = parse_client_id(&raw_client, FieldName::new("clientId"))?;
    state.groups.remove_client(&client_id, &group_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, ConsoleSession, GroupId};
    use crate::inbound::http::test_utils::{MockPorts, admin_principal, cookie_for, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(list_groups)
            .service(create_group)
            .service(delete_group)
            .service(group_members)
            .service(add_members)
            .service(remove_member);
    }

    fn group(name: &str, slug: &str) -> Group {
        Group {
            id: GroupId::random(),
            name: name.to_owned(),
            slug: slug.to_owned(),
            member_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn creates_group_for_admin() {
        let mut ports = MockPorts::default();
        ports
            .groups
            .expect_create_group()
            .withf(|name| name == "Grupo Norte")
            .return_once(|_| Ok(group("Grupo Norte", "grupo-norte")));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/groups")
                .cookie(cookie)
                .set_json(json!({ "name": "Grupo Norte" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["slug"], "grupo-norte");
    }

    #[actix_web::test]
    async fn duplicate_slug_conflicts() {
        let mut ports = MockPorts::default();
        ports
            .groups
            .expect_create_group()
            .return_once(|_| Err(Error::conflict("group slug already exists")));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/groups")
                .cookie(cookie)
                .set_json(json!({ "name": "grupo norte" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn rejects_malformed_group_id() {
        let app =
            actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
        let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/groups/not-a-uuid")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "groupId");
    }

    #[actix_web::test]
    async fn bulk_assignment_reports_failures() {
        let target = GroupId::random();
        let failed = ClientId::random();
        let ok = ClientId::random();
        let expected = vec![ok.clone(), failed.clone()];
        let reported = failed.clone();
        let mut ports = MockPorts::default();
        ports
            .groups
            .expect_add_clients()
            .withf(move |_, ids| ids == expected.as_slice())
            .return_once(move |_, _| {
                Ok(BulkAssignment {
                    assigned: 1,
                    failed: vec![reported],
                })
            });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/groups/{target}/members"))
                .cookie(cookie)
                .set_json(json!({ "clientIds": [ok.to_string(), failed.to_string()] }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["assigned"], 1);
        assert_eq!(body["failed"][0], failed.to_string());
    }

    #[actix_web::test]
    async fn removes_member() {
        let group_id = GroupId::random();
        let client_id = ClientId::random();
        let (expected_group, expected_client) = (group_id.clone(), client_id.clone());
        let mut ports = MockPorts::default();
        ports
            .groups
            .expect_remove_client()
            .withf(move |client, group| client == &expected_client && group == &expected_group)
            .return_once(|_, _| Ok(()));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/groups/{group_id}/members/{client_id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
