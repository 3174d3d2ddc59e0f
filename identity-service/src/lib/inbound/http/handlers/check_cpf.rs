use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::CpfCheck;
use crate::domain::identity::ports::AuthServicePort;
use crate::identity::ports::IdentityStore;
use crate::inbound::http::router::AppState;

pub async fn check_cpf<S: IdentityStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<CheckCpfRequestBody>,
) -> Result<ApiSuccess<CheckCpfResponseData>, ApiError> {
    state
        .auth_service
        .check_cpf(&body.cpf)
        .await
        .map_err(ApiError::from)
        .map(|ref check| ApiSuccess::new(StatusCode::OK, check.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckCpfRequestBody {
    cpf: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckCpfResponseData {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_status: Option<String>,
}

impl From<&CpfCheck> for CheckCpfResponseData {
    fn from(check: &CpfCheck) -> Self {
        Self {
            exists: check.exists,
            customer_status: check.status.map(|s| s.to_string()),
        }
    }
}
