use std::sync::Arc;
use std::time::Duration;

use auth::JwtHandler;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::check_cpf::check_cpf;
use super::handlers::health::health;
use super::handlers::health::health_db;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use super::rate_limit::enforce;
use super::rate_limit::RouteRateLimiter;
use crate::domain::identity::service::AuthService;
use crate::identity::ports::IdentityStore;

/// Shared application state.
///
/// Generic over the store so the test suite can wire the in-memory
/// implementation behind the same router.
pub struct AppState<S: IdentityStore> {
    pub auth_service: Arc<AuthService<S>>,
    pub store: Arc<S>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl<S: IdentityStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            store: Arc::clone(&self.store),
            jwt_handler: Arc::clone(&self.jwt_handler),
        }
    }
}

pub fn create_router<S: IdentityStore>(
    state: AppState<S>,
    rate_limiting_enabled: bool,
) -> Router {
    let check_cpf_routes = limited(
        Router::new().route("/auth/check-cpf", post(check_cpf::<S>)),
        RouteRateLimiter::for_check_cpf(),
        rate_limiting_enabled,
    );
    let register_routes = limited(
        Router::new().route("/auth/register", post(register::<S>)),
        RouteRateLimiter::for_register(),
        rate_limiting_enabled,
    );
    let login_routes = limited(
        Router::new().route("/auth/login", post(login::<S>)),
        RouteRateLimiter::for_login(),
        rate_limiting_enabled,
    );

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/health/db", get(health_db::<S>));

    let protected_routes = Router::new()
        .route("/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(check_cpf_routes)
        .merge(register_routes)
        .merge(login_routes)
        .merge(health_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn limited<S: IdentityStore>(
    routes: Router<AppState<S>>,
    limiter: Arc<RouteRateLimiter>,
    enabled: bool,
) -> Router<AppState<S>> {
    if enabled {
        routes.route_layer(middleware::from_fn_with_state(limiter, enforce))
    } else {
        routes
    }
}
