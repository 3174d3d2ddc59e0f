use std::net::IpAddr;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::Quota;
use governor::RateLimiter;

use crate::inbound::http::handlers::ApiError;

/// Per-route admission control, keyed by client IP.
///
/// One limiter guards one route; the quotas mirror what the gateway would
/// enforce for an anonymous auth surface.
pub struct RouteRateLimiter {
    limiter: RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>,
}

impl RouteRateLimiter {
    fn new(quota: Quota) -> Arc<Self> {
        Arc::new(Self {
            limiter: RateLimiter::keyed(quota),
        })
    }

    /// 10 requests per minute per client.
    pub fn for_check_cpf() -> Arc<Self> {
        Self::new(Quota::per_minute(nonzero(10)))
    }

    /// 3 requests per 5 minutes per client.
    pub fn for_register() -> Arc<Self> {
        let quota = Quota::with_period(Duration::from_secs(100))
            .unwrap_or_else(|| Quota::per_minute(nonzero(1)))
            .allow_burst(nonzero(3));
        Self::new(quota)
    }

    /// 5 requests per minute per client.
    pub fn for_login() -> Arc<Self> {
        Self::new(Quota::per_minute(nonzero(5)))
    }

    pub fn check(&self, client: IpAddr) -> bool {
        self.limiter.check_key(&client).is_ok()
    }
}

fn nonzero(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

/// Middleware enforcing a [`RouteRateLimiter`] before the handler runs.
pub async fn enforce(
    State(limiter): State<Arc<RouteRateLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    if !limiter.check(addr.ip()) {
        tracing::warn!(client = %addr.ip(), path = %req.uri().path(), "Rate limit exceeded");
        return ApiError::TooManyRequests.into_response();
    }

    next.run(req).await
}
