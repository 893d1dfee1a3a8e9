//! Client registry handlers (admin only).
//!
//! ```text
//! GET /api/v1/clients
//! GET /api/v1/clients?ungrouped=true
//! PUT /api/v1/clients/{clientId}/group  {"groupId":"..."}
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Error, Taxpayer};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_client_id, parse_group_id};

/// Query for `GET /api/v1/clients`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientListQuery {
    /// Only clients without a group.
    #[serde(default)]
    pub ungrouped: bool,
}

/// List clients ordered by RFC.
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    params(ClientListQuery),
    responses(
        (status = 200, description = "Clients", body = [Taxpayer]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["clients"],
    operation_id = "listClients"
)]
#[get("/clients")]
pub async fn list_clients(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ClientListQuery>,
) -> ApiResult<web::Json<Vec<Taxpayer>>> {
    session.require_admin()?;
    let clients = if query.ungrouped {
        state.groups.clients_without_group().await?
    } else {
        state.groups.list_clients().await?
    };
    Ok(web::Json(clients))
}

/// Body for `PUT /api/v1/clients/{client_id}/group`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignGroupRequest {
    /// Target group id.
    pub group_id: String,
}

/// Move a client into a group, leaving any previous group.
#[utoipa::path(
    put,
    path = "/api/v1/clients/{client_id}/group",
    params(("client_id" = String, Path, description = "Client UUID")),
    request_body = AssignGroupRequest,
    responses(
        (status = 200, description = "Updated client", body = Taxpayer),
        (status = 400, description = "Invalid ids", body = Error),
        (status = 404, description = "Client or group not found", body = Error)
    ),
    tags = ["clients"],
    operation_id = "assignClientGroup"
)]
#[put("/clients/{client_id}/group")]
pub async fn assign_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AssignGroupRequest>,
) -> ApiResult<web::Json<Taxpayer>> {
    let admin = session.require_admin()?;
    let client_id = parse_client_id(&path, FieldName::new("clientId"))?;
    let group_id = parse_group_id(&payload.group_id, FieldName::new("groupId"))?;
    let client = state.groups.assign_client(&client_id, &group_id).await?;
    info!(assigned_by = %admin.username, rfc = %client.rfc, %group_id, "client assigned");
    Ok(web::Json(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, ConsoleSession, GroupId, Rfc};
    use crate::inbound::http::test_utils::{
        MockPorts, admin_principal, client_principal, cookie_for, test_app,
    };
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(list_clients).service(assign_group);
    }

    fn taxpayer(group_id: Option<GroupId>) -> Taxpayer {
        Taxpayer {
            id: ClientId::random(),
            rfc: Rfc::new("XAXX010101000").expect("valid rfc"),
            legal_name: None,
            group_id,
        }
    }

    #[rstest]
    #[case("/api/v1/clients", false)]
    #[case("/api/v1/clients?ungrouped=true", true)]
    #[actix_web::test]
    async fn lists_clients_by_filter(#[case] uri: &str, #[case] ungrouped: bool) {
        let mut ports = MockPorts::default();
        if ungrouped {
            ports
                .groups
                .expect_clients_without_group()
                .return_once(|| Ok(vec![taxpayer(None)]));
        } else {
            ports
                .groups
                .expect_list_clients()
                .return_once(|| Ok(vec![taxpayer(Some(GroupId::random()))]));
        }
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body[0].get("groupId").is_none(), ungrouped);
    }

    #[actix_web::test]
    async fn clients_cannot_browse_the_registry() {
        let app =
            actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
        let cookie =
            cookie_for(&app, &ConsoleSession::login(client_principal(GroupId::random()))).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/clients")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn assigns_client_to_group() {
        let group_id = GroupId::random();
        let moved = taxpayer(Some(group_id.clone()));
        let client_id = moved.id.clone();
        let mut ports = MockPorts::default();
        ports
            .groups
            .expect_assign_client()
            .return_once(move |_, _| Ok(moved));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/clients/{client_id}/group"))
                .cookie(cookie)
                .set_json(json!({ "groupId": group_id.to_string() }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["groupId"], group_id.to_string());
    }
}
