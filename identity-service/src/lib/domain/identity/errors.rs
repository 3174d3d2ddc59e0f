use thiserror::Error;

/// Error for CPF normalization/validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CpfError {
    #[error("CPF must have exactly {expected} digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Error for CustomerId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CustomerIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for parsing lifecycle statuses loaded from storage
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("Unknown status: {0}")]
    Unknown(String),
}

/// Missing or unusable server-side security settings.
///
/// Raised at startup, never from a request path; the caller aborts the
/// process rather than serving with a weak or absent secret.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("JWT secret is not configured")]
    MissingJwtSecret,

    #[error("JWT secret must be at least {min} bytes, got {actual}")]
    JwtSecretTooShort { min: usize, actual: usize },

    #[error("JWT issuer is not configured")]
    MissingJwtIssuer,

    #[error("JWT audience is not configured")]
    MissingJwtAudience,

    #[error("CPF pepper is not configured")]
    MissingCpfPepper,
}

/// Errors surfaced by the identity store port.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Unique-constraint violation on the CPF lookup hash. Distinct so the
    /// registration workflow can translate it into the same conflict it
    /// reports from its pre-check.
    #[error("CPF hash is already present")]
    DuplicateCpfHash,

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Top-level error for the auth workflows.
#[derive(Debug, Error)]
pub enum AuthError {
    // Input validation; messages are safe to expose field by field
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Password confirmation does not match")]
    PasswordConfirmationMismatch,

    #[error("Invalid CPF: {0}")]
    InvalidCpf(#[from] CpfError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Business failures
    #[error("CPF already registered")]
    CpfAlreadyRegistered,

    /// One generic message for unknown CPF, malformed CPF, and wrong
    /// password. Callers must not learn which factor failed.
    #[error("Invalid CPF or password")]
    InvalidCredentials,

    // Infrastructure failures; detail is logged, never returned verbatim
    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::JwtError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateCpfHash => AuthError::CpfAlreadyRegistered,
            StoreError::CorruptRecord(msg) | StoreError::DatabaseError(msg) => {
                AuthError::DatabaseError(msg)
            }
        }
    }
}
