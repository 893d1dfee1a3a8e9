//! Handler tests for console navigation and consent.

use super::*;
use crate::domain::{ClientId, ErrorCode, GroupId, Rfc};
use crate::inbound::http::test_utils::{
    MockPorts, admin_principal, client_principal, cookie_for, session_cookie, test_app,
};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(current_session)
        .service(select_section)
        .service(set_group_filter)
        .service(load_members)
        .service(focus_client)
        .service(clear_focus)
        .service(consent_notice)
        .service(accept_consent);
}

fn taxpayer(rfc: &str, legal_name: Option<&str>) -> Taxpayer {
    Taxpayer {
        id: ClientId::random(),
        rfc: Rfc::new(rfc).expect("valid rfc"),
        legal_name: legal_name.map(str::to_owned),
        group_id: None,
    }
}

#[actix_web::test]
async fn anonymous_session_is_landing() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/session").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, json!({ "stage": "landing" }));
}

#[rstest]
#[case("users", StatusCode::FORBIDDEN)]
#[case("create_client", StatusCode::OK)]
#[actix_web::test]
async fn client_sections_are_restricted(#[case] section: &str, #[case] expected: StatusCode) {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
    let cookie = cookie_for(&app, &ConsoleSession::login(client_principal(GroupId::random()))).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/session/section")
            .cookie(cookie)
            .set_json(json!({ "section": section }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
}

#[actix_web::test]
async fn admin_switches_section() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
    let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/session/section")
            .cookie(cookie)
            .set_json(json!({ "section": "users" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["section"], "users");
}

#[actix_web::test]
async fn unknown_group_filter_is_not_found() {
    let mut ports = MockPorts::default();
    ports
        .groups
        .expect_find_group()
        .return_once(|_| Err(Error::not_found("group not found")));
    let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
    let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/session/group-filter")
            .cookie(cookie)
            .set_json(json!({ "kind": "group", "group_id": GroupId::random().to_string() }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn focus_requires_loaded_members() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
    let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/session/focus")
            .cookie(cookie)
            .set_json(json!({ "clientId": ClientId::random().to_string() }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Error = actix_test::read_body_json(response).await;
    assert_eq!(body.code(), ErrorCode::InvalidRequest);
}

#[actix_web::test]
async fn loaded_member_can_be_focused() {
    let member = taxpayer("ABC010101AAA", Some("Comercial Norte"));
    let member_id = member.id.clone();
    let listed = vec![member.clone()];
    let mut ports = MockPorts::default();
    ports
        .groups
        .expect_clients_for_filter()
        .withf(|filter| *filter == GroupFilter::Ungrouped)
        .times(2)
        .returning(move |_| Ok(listed.clone()));
    let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
    let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

    let loaded = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/session/members")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(loaded.status(), StatusCode::OK);
    let cookie = session_cookie(&loaded);
    let list: Value = actix_test::read_body_json(loaded).await;
    assert_eq!(list["filter"]["kind"], "ungrouped");
    assert_eq!(list["members"][0]["rfc"], "ABC010101AAA");
    assert_eq!(list["members"][0]["label"], member.label());

    let focused = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/session/focus")
            .cookie(cookie)
            .set_json(json!({ "clientId": member_id.to_string() }))
            .to_request(),
    )
    .await;
    assert_eq!(focused.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(focused).await;
    assert_eq!(body["clientId"], member_id.to_string());
}

#[actix_web::test]
async fn consent_needs_both_acknowledgements() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
    let cookie = cookie_for(&app, &ConsoleSession::login(client_principal(GroupId::random()))).await;

    let partial = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/session/consent")
            .cookie(cookie.clone())
            .set_json(json!({ "noticeRead": true }))
            .to_request(),
    )
    .await;
    assert_eq!(partial.status(), StatusCode::BAD_REQUEST);

    let complete = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/session/consent")
            .cookie(cookie)
            .set_json(json!({ "noticeRead": true, "usageUnderstood": true }))
            .to_request(),
    )
    .await;
    assert_eq!(complete.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(complete).await;
    assert_eq!(body["consentConfirmed"], true);
}

#[actix_web::test]
async fn consent_notice_is_for_clients_only() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(), routes)).await;
    let cookie = cookie_for(&app, &ConsoleSession::login(admin_principal())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/consent-notice")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn consent_notice_names_the_group() {
    let mut ports = MockPorts::default();
    ports
        .uploads
        .expect_consent_notice()
        .withf(|principal| principal.username == "contador")
        .return_once(|_| Ok(ConsentNotice::render("Despacho", "Grupo Norte")));
    let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
    let cookie = cookie_for(&app, &ConsoleSession::login(client_principal(GroupId::random()))).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/consent-notice")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert!(body["body"].as_str().is_some_and(|text| text.contains("Grupo Norte")));
}
