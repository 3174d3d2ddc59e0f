use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::RegistrationReceipt;
use crate::domain::identity::ports::AuthServicePort;
use crate::identity::ports::IdentityStore;
use crate::inbound::http::router::AppState;

pub async fn register<S: IdentityStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .auth_service
        .register(body.into_command())
        .await
        .map_err(ApiError::from)
        .map(|ref receipt| ApiSuccess::new(StatusCode::CREATED, receipt.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    full_name: String,
    #[serde(default)]
    email: String,
    cpf: String,
    birth_date: NaiveDate,
    phone: String,
    password: String,
    confirm_password: String,
}

impl RegisterRequestBody {
    /// Field-level validation happens in the registration workflow, not
    /// here, so the mapping is mechanical.
    fn into_command(self) -> RegisterCommand {
        RegisterCommand {
            full_name: self.full_name,
            email: self.email,
            cpf: self.cpf,
            birth_date: self.birth_date,
            phone: self.phone,
            password: self.password,
            confirm_password: self.confirm_password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponseData {
    pub customer_id: String,
    pub status: String,
    pub message: String,
}

impl From<&RegistrationReceipt> for RegisterResponseData {
    fn from(receipt: &RegistrationReceipt) -> Self {
        Self {
            customer_id: receipt.customer_id.to_string(),
            status: receipt.status.to_string(),
            message: receipt.message.clone(),
        }
    }
}
