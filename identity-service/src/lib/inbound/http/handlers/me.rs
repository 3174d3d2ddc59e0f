use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedCustomer;

/// Echo the identity baked into the bearer token. Everything here comes
/// from validated claims; the store is not consulted.
pub async fn me(
    Extension(customer): Extension<AuthenticatedCustomer>,
) -> Result<ApiSuccess<MeResponseData>, ApiError> {
    Ok(ApiSuccess::new(
        StatusCode::OK,
        MeResponseData {
            customer_id: customer.customer_id.to_string(),
            cpf_last4: customer.cpf_last4,
            status: customer.status,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponseData {
    pub customer_id: String,
    pub cpf_last4: String,
    pub status: String,
}
