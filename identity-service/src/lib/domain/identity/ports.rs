use async_trait::async_trait;

use crate::domain::identity::models::CpfCheck;
use crate::domain::identity::models::Credential;
use crate::domain::identity::models::CustomerId;
use crate::domain::identity::models::LoginCommand;
use crate::domain::identity::models::Profile;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::RegistrationReceipt;
use crate::domain::identity::token::IssuedToken;
use crate::identity::errors::AuthError;
use crate::identity::errors::StoreError;

/// Port for the auth workflows.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new customer: validate input, reject duplicate CPFs, and
    /// persist the credential/profile pair atomically.
    ///
    /// # Errors
    /// * `MissingField` / `PasswordConfirmationMismatch` / `InvalidCpf` /
    ///   `InvalidEmail` - Input validation failed
    /// * `CpfAlreadyRegistered` - A credential with this CPF already exists
    /// * `DatabaseError` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<RegistrationReceipt, AuthError>;

    /// Authenticate a customer and issue a bearer token.
    ///
    /// # Errors
    /// * `MissingField` - CPF or password was blank
    /// * `InvalidCredentials` - Unknown or malformed CPF, or wrong password;
    ///   deliberately indistinguishable
    /// * `DatabaseError` - Store operation failed
    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, AuthError>;

    /// Report whether a CPF is registered, and the profile status if so.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn check_cpf(&self, raw_cpf: &str) -> Result<CpfCheck, AuthError>;
}

/// Durable storage port for credentials and profiles.
///
/// Reads go through the store directly; writes only happen inside an
/// [`IdentityTxn`] so a credential and its profile always land together.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// Retrieve the credential whose CPF lookup hash matches exactly.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_credential_by_cpf_hash(
        &self,
        cpf_hash: &str,
    ) -> Result<Option<Credential>, StoreError>;

    /// Check whether any credential carries this CPF lookup hash.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn credential_exists(&self, cpf_hash: &str) -> Result<bool, StoreError>;

    /// Retrieve the profile paired with a credential.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_profile(&self, id: &CustomerId) -> Result<Option<Profile>, StoreError>;

    /// Open a write transaction.
    ///
    /// Dropping the returned transaction without calling `commit` rolls
    /// every staged insert back; no partial credential/profile pair is ever
    /// visible to readers.
    ///
    /// # Errors
    /// * `DatabaseError` - Transaction could not be opened
    async fn begin(&self) -> Result<Box<dyn IdentityTxn>, StoreError>;

    /// Cheap connectivity probe for health reporting.
    ///
    /// # Errors
    /// * `DatabaseError` - Store is unreachable
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Write transaction over the identity store.
#[async_trait]
pub trait IdentityTxn: Send {
    /// Stage a credential insert.
    ///
    /// # Errors
    /// * `DuplicateCpfHash` - The CPF lookup hash is already taken
    /// * `DatabaseError` - Store operation failed
    async fn insert_credential(&mut self, credential: &Credential) -> Result<(), StoreError>;

    /// Stage a profile insert.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn insert_profile(&mut self, profile: &Profile) -> Result<(), StoreError>;

    /// Make the staged inserts durable.
    ///
    /// The store's unique constraint on the CPF lookup hash is the
    /// authoritative duplicate guard; a violation surfaces here (or on the
    /// staging insert) as `DuplicateCpfHash`, never as a generic error.
    ///
    /// # Errors
    /// * `DuplicateCpfHash` - Another transaction registered the CPF first
    /// * `DatabaseError` - Commit failed; all staged writes are rolled back
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
