//! Console entry-point: loads settings, prepares the database, wires services
//! and serves the REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use satisfacture::inbound::http::health::HealthState;
use satisfacture::inbound::http::session_config::fingerprint::key_fingerprint;
use satisfacture::inbound::http::session_config::{BuildMode, session_settings_from_env};
use satisfacture::outbound::persistence::{DbPool, run_pending_migrations};
use satisfacture::outbound::sat_api::SatApiHttpGateway;
use satisfacture::settings::ConsoleSettings;

use server::{ServerConfig, build_console_services, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ConsoleSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let pool_config = settings.pool_config()?;
    let applied = run_pending_migrations(pool_config.database_url()?)
        .await
        .wrap_err("database migrations failed")?;
    info!(applied, "database schema ready");
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to create database pool")?;

    let sat_api_url = settings.sat_api_base_url()?;
    info!(base_url = %sat_api_url, "using SAT API");
    let gateway = SatApiHttpGateway::new(sat_api_url).wrap_err("failed to build SAT API client")?;

    let services = build_console_services(&pool, gateway, settings.firm_name());
    services
        .seed_bootstrap_admin(&settings.bootstrap_admin())
        .await
        .map_err(|err| eyre!("failed to seed bootstrap admin: {}", err.message()))?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(session, settings.bind_addr()?, services.http_state);
    let server = create_server(health_state, config)?;
    server.await?;
    Ok(())
}
