//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use approvals::inbound::http::health::HealthState;
use approvals::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, MailDelivery, ServerConfig, create_server};

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

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = server_config(&settings).await?;
    info!(bind_addr = %config.bind_addr(), "starting approvals server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).wrap_err("failed to start server")?;
    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated with an error")
}

/// Release builds refuse to start without Google credentials.
fn google_client(settings: &AppSettings) -> Result<Option<server::GoogleClient>> {
    if cfg!(debug_assertions) {
        return Ok(settings.google_client()?);
    }
    Ok(Some(settings.required_google_client()?))
}

async fn server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let mut config = ServerConfig::new(
        settings.bind_addr()?,
        settings.frontend_url()?,
        settings.google_redirect_url()?,
    )
    .with_admin_email(settings.admin_email()?)
    .with_google(google_client(settings)?);

    let mail = match settings.mail_relay_url()? {
        Some(endpoint) => MailDelivery::Relay {
            endpoint,
            from: settings.mail_from()?,
            api_key: settings.mail_api_key(),
        },
        None => MailDelivery::Log,
    };
    config = config.with_mail(mail, settings.notification_timeout());

    match settings.database_url() {
        Some(url) => {
            let owned = url.to_owned();
            tokio::task::spawn_blocking(move || run_pending_migrations(&owned))
                .await
                .wrap_err("migration task panicked")?
                .wrap_err("failed to apply database migrations")?;
            let mut pool_config = PoolConfig::new(url);
            if let Some(max) = settings.database_max_connections() {
                pool_config = pool_config.with_max_size(max);
            }
            let pool = DbPool::new(pool_config)
                .await
                .wrap_err("failed to build database pool")?;
            config = config.with_db_pool(pool);
        }
        None if cfg!(debug_assertions) => {
            warn!("APPROVALS_DATABASE_URL not set; using in-memory stores (dev only)");
        }
        None => return Err(eyre!("APPROVALS_DATABASE_URL must be set in release builds")),
    }
    Ok(config)
}
