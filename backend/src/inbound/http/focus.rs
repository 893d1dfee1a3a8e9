//! SAT workflows and the document viewer for the focused client.
//!
//! Every handler acts on the client confirmed through
//! `POST /api/v1/session/focus`; requests without a focus are rejected.
//!
//! ```text
//! POST /api/v1/focus/initial-requests  {"year":2024}
//! POST /api/v1/focus/verification      {"year":2024}
//! GET  /api/v1/focus/documents?year=2024
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{InitialRequestsOutcome, VerificationOutcome};
use crate::domain::{ClientId, DocumentView, Error, TaxYear};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_year};

/// Fiscal year selector shared by the focus endpoints.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct YearRequest {
    /// Fiscal year between 2000 and 2100.
    pub year: Option<i32>,
}

impl YearRequest {
    fn tax_year(&self) -> Result<TaxYear, Error> {
        let field = FieldName::new("year");
        let year = self.year.ok_or_else(|| missing_field_error(field))?;
        parse_year(year, field)
    }
}

fn focused_client(session: &SessionContext) -> Result<ClientId, Error> {
    Ok(session.console()?.focus()?.client_id.clone())
}

/// Run the initial download requests for the focused client.
#[utoipa::path(
    post,
    path = "/api/v1/focus/initial-requests",
    request_body = YearRequest,
    responses(
        (status = 200, description = "Remote response", body = InitialRequestsOutcome),
        (status = 400, description = "No focused client or invalid year", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 502, description = "Remote service error", body = Error),
        (status = 504, description = "Remote service unreachable", body = Error)
    ),
    tags = ["sat"],
    operation_id = "runInitialRequests"
)]
#[post("/focus/initial-requests")]
pub async fn initial_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<YearRequest>,
) -> ApiResult<web::Json<InitialRequestsOutcome>> {
    let client_id = focused_client(&session)?;
    let year = payload.tax_year()?;
    Ok(web::Json(state.sat.run_initial_requests(&client_id, year).await?))
}

/// Authenticate with SAT and verify the focused client's pending requests.
#[utoipa::path(
    post,
    path = "/api/v1/focus/verification",
    request_body = YearRequest,
    responses(
        (status = 200, description = "Verification report", body = VerificationOutcome),
        (status = 400, description = "No focused client or invalid year", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 502, description = "Remote service error", body = Error),
        (status = 504, description = "Remote service unreachable", body = Error)
    ),
    tags = ["sat"],
    operation_id = "authenticateAndVerify"
)]
#[post("/focus/verification")]
pub async fn verification(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<YearRequest>,
) -> ApiResult<web::Json<VerificationOutcome>> {
    let client_id = focused_client(&session)?;
    let year = payload.tax_year()?;
    Ok(web::Json(
        state.sat.authenticate_and_verify(&client_id, year).await?,
    ))
}

/// CFDI and metadata stored for the focused client in the selected year.
#[utoipa::path(
    get,
    path = "/api/v1/focus/documents",
    params(YearRequest),
    responses(
        (status = 200, description = "Documents", body = DocumentView),
        (status = 400, description = "No focused client or invalid year", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["documents"],
    operation_id = "focusedDocuments"
)]
#[get("/focus/documents")]
pub async fn documents(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<YearRequest>,
) -> ApiResult<web::Json<DocumentView>> {
    let client_id = focused_client(&session)?;
    let year = query.tax_year()?;
    Ok(web::Json(state.documents.documents(&client_id, year).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppState, ConsoleSession, Focus, GroupFilter, Rfc, Selection};
    use crate::inbound::http::test_utils::{MockPorts, admin_principal, cookie_for, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(initial_requests)
            .service(verification)
            .service(documents);
    }

    fn focused_on(client_id: &ClientId) -> ConsoleSession {
        let mut session = ConsoleSession::login(admin_principal());
        if let ConsoleSession::App(AppState { selection, .. }) = &mut session {
            *selection = Selection {
                group_filter: GroupFilter::Ungrouped,
                members_loaded_for: Some(GroupFilter::Ungrouped),
                focus: Some(Focus {
                    client_id: client_id.clone(),
                    group_id: None,
                }),
            };
        }
        session
    }

    #[actix_web::test]
    async fn requests_without_focus_are_rejected() {
        let app =
            actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
        let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/focus/initial-requests")
                .cookie(cookie)
                .set_json(json!({ "year": 2024 }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(json!({}), "missing_field")]
    #[case(json!({ "year": 1999 }), "invalid_year")]
    #[actix_web::test]
    async fn year_is_validated(#[case] body: Value, #[case] code: &str) {
        let app =
            actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
        let cookie = cookie_for(&app, &focused_on(&ClientId::random())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/focus/verification")
                .cookie(cookie)
                .set_json(body)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["code"], code);
    }

    #[actix_web::test]
    async fn initial_requests_target_the_focused_client() {
        let client_id = ClientId::random();
        let expected = client_id.clone();
        let mut ports = MockPorts::default();
        ports
            .sat
            .expect_run_initial_requests()
            .withf(move |id, year| id == &expected && year.value() == 2024)
            .return_once(|_, year| {
                Ok(InitialRequestsOutcome {
                    rfc: Rfc::new("ABC010101AAA").expect("valid rfc"),
                    year,
                    api: json!({ "requests": 12 }),
                })
            });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = cookie_for(&app, &focused_on(&client_id)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/focus/initial-requests")
                .cookie(cookie)
                .set_json(json!({ "year": 2024 }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["api"]["requests"], 12);
    }

    #[actix_web::test]
    async fn verification_relays_upstream_failures() {
        let mut ports = MockPorts::default();
        ports
            .sat
            .expect_authenticate_and_verify()
            .return_once(|_, _| Err(Error::upstream_unavailable("sat api timed out")));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = cookie_for(&app, &focused_on(&ClientId::random())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/focus/verification")
                .cookie(cookie)
                .set_json(json!({ "year": 2024 }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[actix_web::test]
    async fn documents_use_the_query_year() {
        let mut ports = MockPorts::default();
        ports
            .documents
            .expect_documents()
            .withf(|_, year| year.value() == 2023)
            .return_once(|_, year| {
                Ok(DocumentView {
                    rfc: Rfc::new("ABC010101AAA").expect("valid rfc"),
                    year,
                    cfdi: Vec::new(),
                    metadata: Vec::new(),
                })
            });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = cookie_for(&app, &focused_on(&ClientId::random())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/focus/documents?year=2023")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["year"], 2023);
        assert_eq!(body["cfdi"], json!([]));
    }
}
