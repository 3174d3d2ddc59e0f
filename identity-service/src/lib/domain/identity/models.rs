use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use sha2::Digest;
use sha2::Sha256;
use uuid::Uuid;

use crate::identity::errors::CpfError;
use crate::identity::errors::CustomerIdError;
use crate::identity::errors::EmailError;
use crate::identity::errors::StatusError;

/// Credential aggregate entity.
///
/// One identity's authentication material, stored in `identity.users`.
/// Never mutated after registration; login and existence checks only read it.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: CustomerId,
    pub cpf: Cpf,
    /// Peppered lookup digest; unique across all credentials and fixed for
    /// the lifetime of the row.
    pub cpf_hash: String,
    pub cpf_last4: String,
    pub password_hash: String,
    pub status: CredentialStatus,
    pub created_at: DateTime<Utc>,
}

/// Business-facing customer record, tied 1:1 to a [`Credential`] by id.
///
/// Status transitions after registration belong to the onboarding back
/// office; this service only ever writes the initial PENDING state.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: CustomerId,
    pub full_name: String,
    pub email: Option<EmailAddress>,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer unique identifier type, shared by Credential and Profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
    /// Generate a new random customer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a customer ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, CustomerIdError> {
        Uuid::parse_str(s)
            .map(CustomerId)
            .map_err(|e| CustomerIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// CPF value type.
///
/// Holds the normalized 11-digit form. Construction strips formatting and
/// enforces length only; check digits are not verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpf(String);

impl Cpf {
    const LENGTH: usize = 11;

    /// Normalize raw input and validate its length.
    ///
    /// # Errors
    /// * `InvalidLength` - Input does not contain exactly 11 digits
    pub fn new(raw: &str) -> Result<Self, CpfError> {
        let digits = Self::normalize(raw);
        if digits.len() != Self::LENGTH {
            return Err(CpfError::InvalidLength {
                expected: Self::LENGTH,
                actual: digits.len(),
            });
        }
        Ok(Self(digits))
    }

    /// Strip every non-digit character. Blank input yields an empty string.
    pub fn normalize(raw: &str) -> String {
        raw.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Get the normalized digit sequence.
    pub fn as_digits(&self) -> &str {
        &self.0
    }

    /// Trailing four digits, safe for display and token claims.
    pub fn last_four(&self) -> &str {
        &self.0[self.0.len().saturating_sub(4)..]
    }

    /// Deterministic lookup digest: SHA-256 over `pepper || digits`,
    /// lowercase hex.
    ///
    /// Same digits and pepper always produce the same value, so the store
    /// can index credentials by it without the raw digits being the
    /// searchable form. The pepper must be validated non-empty at startup
    /// before this is ever called.
    pub fn lookup_hash(&self, pepper: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(pepper.as_bytes());
        hasher.update(self.0.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Credential lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Active,
    Disabled,
}

impl CredentialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialStatus::Active => "ACTIVE",
            CredentialStatus::Disabled => "DISABLED",
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(CredentialStatus::Active),
            "DISABLED" => Ok(CredentialStatus::Disabled),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }
}

/// Profile lifecycle status.
///
/// PENDING at registration; later transitions are written by the onboarding
/// processes, so every variant they produce must be readable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    Pending,
    Active,
    Rejected,
    Suspended,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Pending => "PENDING",
            ProfileStatus::Active => "ACTIVE",
            ProfileStatus::Rejected => "REJECTED",
            ProfileStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ProfileStatus::Pending),
            "ACTIVE" => Ok(ProfileStatus::Active),
            "REJECTED" => Ok(ProfileStatus::Rejected),
            "SUSPENDED" => Ok(ProfileStatus::Suspended),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }
}

/// Command to register a new customer.
///
/// Fields arrive raw; the registration workflow owns validation so that
/// every rejection carries a field-level reason.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub full_name: String,
    /// Optional; blank is treated as absent.
    pub email: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

/// Command to authenticate an existing customer.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub cpf: String,
    pub password: String,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct RegistrationReceipt {
    pub customer_id: CustomerId,
    pub status: ProfileStatus,
    pub message: String,
}

/// Outcome of a CPF existence check.
///
/// Malformed input is reported as absence on purpose, so a caller cannot
/// distinguish it from a CPF that was never registered.
#[derive(Debug, Clone)]
pub struct CpfCheck {
    pub exists: bool,
    pub status: Option<ProfileStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_formatting() {
        assert_eq!(Cpf::normalize("529.982.247-25"), "52998224725");
        assert_eq!(Cpf::normalize("  529 982 247 25 "), "52998224725");
        assert_eq!(Cpf::normalize(""), "");
        assert_eq!(Cpf::normalize("abc"), "");
    }

    #[test]
    fn test_normalize_is_ordered_subsequence() {
        let raw = "5a2b9!98.22_47-2x5";
        let digits = Cpf::normalize(raw);

        assert!(digits.chars().all(|c| c.is_ascii_digit()));

        // every output digit appears in the input, in order
        let mut input = raw.chars();
        for d in digits.chars() {
            assert!(input.any(|c| c == d));
        }
    }

    #[test]
    fn test_cpf_length_is_enforced() {
        assert!(Cpf::new("529.982.247-25").is_ok());
        assert!(matches!(
            Cpf::new("1234567"),
            Err(CpfError::InvalidLength { actual: 7, .. })
        ));
        assert!(matches!(
            Cpf::new(""),
            Err(CpfError::InvalidLength { actual: 0, .. })
        ));
    }

    #[test]
    fn test_last_four() {
        let cpf = Cpf::new("52998224725").unwrap();
        assert_eq!(cpf.last_four(), "4725");
    }

    #[test]
    fn test_lookup_hash_is_deterministic() {
        let cpf = Cpf::new("52998224725").unwrap();

        let first = cpf.lookup_hash("pepper-secret");
        let second = cpf.lookup_hash("pepper-secret");
        assert_eq!(first, second);

        // lowercase hex of a 32-byte digest
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_lookup_hash_depends_on_pepper() {
        let cpf = Cpf::new("52998224725").unwrap();
        assert_ne!(cpf.lookup_hash("pepper-a"), cpf.lookup_hash("pepper-b"));
    }

    #[test]
    fn test_lookup_hash_depends_on_digits() {
        let a = Cpf::new("52998224725").unwrap();
        let b = Cpf::new("52998224726").unwrap();
        assert_ne!(a.lookup_hash("pepper"), b.lookup_hash("pepper"));
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(
            "PENDING".parse::<ProfileStatus>().unwrap(),
            ProfileStatus::Pending
        );
        assert_eq!(ProfileStatus::Active.to_string(), "ACTIVE");
        assert!("pending".parse::<ProfileStatus>().is_err());
        assert_eq!(
            "DISABLED".parse::<CredentialStatus>().unwrap(),
            CredentialStatus::Disabled
        );
    }
}
