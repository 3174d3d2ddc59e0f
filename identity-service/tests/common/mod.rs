use std::net::SocketAddr;
use std::sync::Arc;

use auth::JwtHandler;
use identity_service::domain::identity::service::AuthService;
use identity_service::domain::identity::token::TokenIssuer;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use identity_service::outbound::repositories::InMemoryIdentityStore;

pub const JWT_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const CPF_PEPPER: &str = "test-cpf-pepper-secret";
pub const JWT_ISSUER: &str = "aurum-auth";
pub const JWT_AUDIENCE: &str = "aurum-app";

/// Test application that spawns a real server on a random port, backed by
/// the in-memory store.
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
    pub store: Arc<InMemoryIdentityStore>,
}

impl TestApp {
    /// Spawn the application with rate limiting disabled (the default for
    /// functional tests, which would otherwise trip the register quota).
    pub async fn spawn() -> Self {
        Self::spawn_with(false).await
    }

    /// Spawn the application with per-route rate limiting enabled.
    pub async fn spawn_with_rate_limiting() -> Self {
        Self::spawn_with(true).await
    }

    async fn spawn_with(rate_limiting_enabled: bool) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(InMemoryIdentityStore::new());

        let token_issuer = TokenIssuer::new(JWT_SECRET, JWT_ISSUER, JWT_AUDIENCE, 240)
            .expect("Failed to build token issuer");
        let jwt_handler = Arc::new(
            JwtHandler::new(JWT_SECRET.as_bytes())
                .with_issuer(JWT_ISSUER)
                .with_audience(JWT_AUDIENCE)
                .with_leeway(30),
        );

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&store),
            token_issuer,
            CPF_PEPPER.to_string(),
        ));

        let state = AppState {
            auth_service,
            store: Arc::clone(&store),
            jwt_handler,
        };

        let application = create_router(state, rate_limiting_enabled);
        tokio::spawn(async move {
            axum::serve(
                listener,
                application.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server crashed");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET.as_bytes())
                .with_issuer(JWT_ISSUER)
                .with_audience(JWT_AUDIENCE)
                .with_leeway(30),
            store,
        }
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }
}
