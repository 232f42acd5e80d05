use std::sync::Arc;
use std::time::Duration;

use identity_service::config::Config;
use identity_service::domain::identity::ports::Notifier;
use identity_service::domain::identity::service::IdentityService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::notifications::LogNotifier;
use identity_service::outbound::notifications::SmtpNotifier;
use identity_service::outbound::repositories::PostgresCredentialStore;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_token_ttl_minutes = config.jwt.access_token_ttl_minutes,
        code_ttl_minutes = config.identity.code_ttl_minutes,
        refresh_token_ttl_days = config.identity.refresh_token_ttl_days,
        mail_enabled = config.mail.enabled,
        "Configuration loaded"
    );

    let random: Arc<dyn auth::SecureRandom> = Arc::new(auth::OsRandom);
    let token_issuer = auth::TokenIssuer::new(
        config.jwt.secret.expose_secret().as_bytes(),
        config.jwt.access_token_ttl(),
        Arc::clone(&random),
    )?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(config.database.url.expose_secret())
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let store = Arc::new(PostgresCredentialStore::new(pg_pool));
    let code_generator = auth::CodeGenerator::new(random);
    let settings = config.identity.settings();

    let http_application = if config.mail.enabled {
        tracing::info!(smtp_host = %config.mail.smtp_host, "SMTP notifications enabled");
        let notifier = Arc::new(SmtpNotifier::new(&config.mail)?);
        let service = Arc::new(IdentityService::new(
            store,
            notifier,
            Arc::new(token_issuer),
            code_generator,
            settings,
        ));
        spawn_purge_task(Arc::clone(&service), config.identity.purge_interval());
        create_router(service)
    } else {
        tracing::warn!("Mail disabled, one-time codes will not be delivered");
        let service = Arc::new(IdentityService::new(
            store,
            Arc::new(LogNotifier),
            Arc::new(token_issuer),
            code_generator,
            settings,
        ));
        spawn_purge_task(Arc::clone(&service), config.identity.purge_interval());
        create_router(service)
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

/// Periodically delete expired codes and refresh tokens.
fn spawn_purge_task<N>(
    service: Arc<IdentityService<PostgresCredentialStore, N>>,
    interval: Option<Duration>,
) where
    N: Notifier,
{
    let Some(interval) = interval else {
        tracing::info!("Expired credential purge disabled");
        return;
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match service.purge_expired().await {
                Ok((codes, tokens)) => {
                    tracing::debug!(codes, refresh_tokens = tokens, "Expired credentials purged")
                }
                Err(e) => tracing::error!("Failed to purge expired credentials: {}", e),
            }
        }
    });
}
