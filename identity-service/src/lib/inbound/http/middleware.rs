use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::identity::models::CustomerId;
use crate::domain::identity::token::AccessClaims;
use crate::identity::ports::IdentityStore;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the authenticated identity extracted from the
/// bearer token. Values are claim snapshots, not live store reads.
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer {
    pub customer_id: CustomerId,
    pub cpf_last4: String,
    pub status: String,
}

/// Middleware that validates bearer tokens and adds the customer identity
/// to request extensions.
pub async fn authenticate<S: IdentityStore>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let claims: AccessClaims = state.jwt_handler.decode(token).map_err(|e| {
        tracing::warn!(error = %e, "Bearer token validation failed");
        ApiError::Unauthorized("Invalid or expired token".to_string()).into_response()
    })?;

    let customer_id = CustomerId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Token 'sub' claim is not a customer id");
        ApiError::Unauthorized("Invalid token format".to_string()).into_response()
    })?;

    req.extensions_mut().insert(AuthenticatedCustomer {
        customer_id,
        cpf_last4: claims.cpf_last4,
        status: claims.customer_status,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::Unauthorized("Missing Authorization header".to_string()).into_response()
        })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        ApiError::Unauthorized("Invalid Authorization header".to_string()).into_response()
    })?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
        .into_response()
    })
}
