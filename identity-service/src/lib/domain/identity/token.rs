use auth::JwtError;
use auth::JwtHandler;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::identity::models::CustomerId;
use crate::domain::identity::models::ProfileStatus;
use crate::identity::errors::ConfigurationError;

/// Label returned alongside access tokens.
pub const TOKEN_TYPE: &str = "Bearer";

/// Claim set embedded in access tokens.
///
/// Carries no raw CPF digits and no password material; `cpf_last4` and the
/// customer status snapshot are the only business fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Customer id
    pub sub: String,

    /// UX-safe CPF fragment
    pub cpf_last4: String,

    /// Customer status at issuance time, not a live reference
    pub customer_status: String,

    /// Unique token id, reserved for a future revocation list
    pub jti: String,

    pub iss: String,
    pub aud: String,

    /// Not valid before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signed token plus its remaining lifetime at issuance.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

/// Builds and signs time-bounded access tokens.
///
/// Stateless: every call to [`issue`](TokenIssuer::issue) is independent and
/// nothing is persisted.
pub struct TokenIssuer {
    jwt: JwtHandler,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Minimum signing-secret length for HS256.
    pub const MIN_SECRET_BYTES: usize = 32;

    /// Create a token issuer, validating its configuration up front.
    ///
    /// # Errors
    /// * `MissingJwtSecret` / `JwtSecretTooShort` - Secret absent or under
    ///   32 bytes
    /// * `MissingJwtIssuer` / `MissingJwtAudience` - Names absent
    pub fn new(
        secret: &str,
        issuer: &str,
        audience: &str,
        expires_minutes: i64,
    ) -> Result<Self, ConfigurationError> {
        if secret.trim().is_empty() {
            return Err(ConfigurationError::MissingJwtSecret);
        }
        if secret.len() < Self::MIN_SECRET_BYTES {
            return Err(ConfigurationError::JwtSecretTooShort {
                min: Self::MIN_SECRET_BYTES,
                actual: secret.len(),
            });
        }
        if issuer.trim().is_empty() {
            return Err(ConfigurationError::MissingJwtIssuer);
        }
        if audience.trim().is_empty() {
            return Err(ConfigurationError::MissingJwtAudience);
        }

        Ok(Self {
            jwt: JwtHandler::new(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            lifetime: Duration::minutes(expires_minutes),
        })
    }

    /// Issue a signed token for an authenticated customer.
    ///
    /// `expires_in` is the remaining lifetime in seconds computed from the
    /// actual `exp` claim, so callers and token agree on the same instant.
    ///
    /// # Errors
    /// * `JwtError` - Signing failed
    pub fn issue(
        &self,
        customer_id: CustomerId,
        cpf_last4: &str,
        customer_status: ProfileStatus,
    ) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let expires = now + self.lifetime;

        let claims = AccessClaims {
            sub: customer_id.to_string(),
            cpf_last4: cpf_last4.to_string(),
            customer_status: customer_status.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            nbf: now.timestamp(),
            exp: expires.timestamp(),
        };

        let access_token = self.jwt.encode(&claims)?;

        Ok(IssuedToken {
            access_token,
            expires_in: (expires - now).num_seconds(),
        })
    }
}
