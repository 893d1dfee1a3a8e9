//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::build_console_services;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use satisfacture::Trace;
#[cfg(debug_assertions)]
use satisfacture::doc::ApiDoc;
use satisfacture::inbound::http::certificates::upload_certificates;
use satisfacture::inbound::http::clients::{assign_group, list_clients};
use satisfacture::inbound::http::console::{
    accept_consent, clear_focus, consent_notice, current_session, focus_client, load_members,
    select_section, set_group_filter,
};
use satisfacture::inbound::http::focus::{documents, initial_requests, verification};
use satisfacture::inbound::http::groups::{
    add_members, create_group, delete_group, group_members, list_groups, remove_member,
};
use satisfacture::inbound::http::error::payload_configs;
use satisfacture::inbound::http::health::{HealthState, live, ready};
use satisfacture::inbound::http::state::HttpState;
use satisfacture::inbound::http::users::{create_user, list_users, login, logout};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

/// Mount every console endpoint on `cfg`.
fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(logout)
        .service(current_session)
        .service(select_section)
        .service(set_group_filter)
        .service(load_members)
        .service(focus_client)
        .service(clear_focus)
        .service(consent_notice)
        .service(accept_consent)
        .service(list_users)
        .service(create_user)
        .service(list_groups)
        .service(create_group)
        .service(delete_group)
        .service(group_members)
        .service(add_members)
        .service(remove_member)
        .service(list_clients)
        .service(assign_group)
        .service(upload_certificates)
        .service(initial_requests)
        .service(verification)
        .service(documents);
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .configure(payload_configs)
        .configure(api_routes);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        http_state,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
