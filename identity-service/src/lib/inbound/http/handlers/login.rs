use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::LoginCommand;
use crate::domain::identity::ports::AuthServicePort;
use crate::domain::identity::token::IssuedToken;
use crate::domain::identity::token::TOKEN_TYPE;
use crate::identity::ports::IdentityStore;
use crate::inbound::http::router::AppState;

pub async fn login<S: IdentityStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    state
        .auth_service
        .login(LoginCommand {
            cpf: body.cpf,
            password: body.password,
        })
        .await
        .map_err(ApiError::from)
        .map(|ref issued| ApiSuccess::new(StatusCode::OK, issued.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    cpf: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<&IssuedToken> for LoginResponseData {
    fn from(issued: &IssuedToken) -> Self {
        Self {
            access_token: issued.access_token.clone(),
            token_type: TOKEN_TYPE.to_string(),
            expires_in: issued.expires_in,
        }
    }
}
