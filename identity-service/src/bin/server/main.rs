use std::net::SocketAddr;
use std::sync::Arc;

use auth::JwtHandler;
use identity_service::config::Config;
use identity_service::domain::identity::service::AuthService;
use identity_service::domain::identity::token::TokenIssuer;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use identity_service::outbound::repositories::PostgresIdentityStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Clock skew tolerated when validating inbound bearer tokens.
const TOKEN_LEEWAY_SECONDS: u64 = 30;

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
    config.validate()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_issuer = %config.jwt.issuer,
        jwt_audience = %config.jwt.audience,
        jwt_expires_minutes = config.jwt.expires_minutes,
        rate_limiting = config.rate_limit.enabled,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_issuer = TokenIssuer::new(
        &config.jwt.secret,
        &config.jwt.issuer,
        &config.jwt.audience,
        config.jwt.expires_minutes,
    )?;
    let jwt_handler = Arc::new(
        JwtHandler::new(config.jwt.secret.as_bytes())
            .with_issuer(&config.jwt.issuer)
            .with_audience(&config.jwt.audience)
            .with_leeway(TOKEN_LEEWAY_SECONDS),
    );

    let store = Arc::new(PostgresIdentityStore::new(pg_pool));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&store),
        token_issuer,
        config.cpf.pepper.clone(),
    ));

    let state = AppState {
        auth_service,
        store,
        jwt_handler,
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let application = create_router(state, config.rate_limit.enabled);
    axum::serve(
        http_listener,
        application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
