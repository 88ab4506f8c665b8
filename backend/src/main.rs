//! Backend entry-point: loads settings, wires adapters and serves the REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use forum_backend::config::AppSettings;
use forum_backend::inbound::http::health::HealthState;
use forum_backend::outbound::persistence::{DbPool, PoolConfig};
use forum_backend::outbound::security::JwtTokenIssuer;

use server::{ServerConfig, create_server};

/// Resolve the token signing secret.
///
/// Release builds refuse to start without one; debug builds fall back to a
/// random secret so tokens do not survive a restart.
fn jwt_secret(settings: &AppSettings) -> std::io::Result<String> {
    if let Some(secret) = settings.jwt_secret() {
        return Ok(secret.to_owned());
    }
    if cfg!(debug_assertions) {
        warn!("FORUM_JWT_SECRET unset; using an ephemeral secret (dev only)");
        return Ok(format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()));
    }
    Err(std::io::Error::other(
        "FORUM_JWT_SECRET must be set in release builds",
    ))
}

async fn build_server_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let normalizer = settings.normalizer().map_err(std::io::Error::other)?;
    let policy = settings.identity_policy().map_err(std::io::Error::other)?;
    let expiry = settings.token_expiry().map_err(std::io::Error::other)?;
    let tokens = JwtTokenIssuer::new(jwt_secret(settings)?.as_bytes(), expiry)
        .map_err(std::io::Error::other)?;

    let config = ServerConfig::new(bind_addr, normalizer, policy, tokens);
    match settings.database_url() {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(std::io::Error::other)?;
            Ok(config.with_db_pool(pool))
        }
        None => Ok(config),
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let config = build_server_config(&settings).await?;
    info!(
        bind_addr = %config.bind_addr,
        persistent = config.db_pool.is_some(),
        "starting forum backend"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
