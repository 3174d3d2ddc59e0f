use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::identity::models::Cpf;
use crate::domain::identity::models::CpfCheck;
use crate::domain::identity::models::Credential;
use crate::domain::identity::models::CredentialStatus;
use crate::domain::identity::models::CustomerId;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::LoginCommand;
use crate::domain::identity::models::Profile;
use crate::domain::identity::models::ProfileStatus;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::RegistrationReceipt;
use crate::domain::identity::token::IssuedToken;
use crate::domain::identity::token::TokenIssuer;
use crate::identity::errors::AuthError;
use crate::identity::ports::AuthServicePort;
use crate::identity::ports::IdentityStore;

/// Domain service implementing the registration, login, and CPF existence
/// workflows against an [`IdentityStore`].
///
/// Stateless per invocation; the store is the only shared mutable resource.
pub struct AuthService<S>
where
    S: IdentityStore,
{
    store: Arc<S>,
    password_hasher: auth::PasswordHasher,
    token_issuer: TokenIssuer,
    cpf_pepper: String,
}

impl<S> AuthService<S>
where
    S: IdentityStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// The pepper must already be validated non-empty by configuration
    /// loading; it is accepted as-is here.
    pub fn new(store: Arc<S>, token_issuer: TokenIssuer, cpf_pepper: String) -> Self {
        Self {
            store,
            password_hasher: auth::PasswordHasher::new(),
            token_issuer,
            cpf_pepper,
        }
    }
}

#[async_trait]
impl<S> AuthServicePort for AuthService<S>
where
    S: IdentityStore,
{
    async fn register(&self, command: RegisterCommand) -> Result<RegistrationReceipt, AuthError> {
        // validate input
        if command.full_name.trim().is_empty() {
            return Err(AuthError::MissingField { field: "fullName" });
        }
        if command.cpf.trim().is_empty() {
            return Err(AuthError::MissingField { field: "cpf" });
        }
        if command.phone.trim().is_empty() {
            return Err(AuthError::MissingField { field: "phone" });
        }
        if command.password.is_empty() {
            return Err(AuthError::MissingField { field: "password" });
        }
        if command.password != command.confirm_password {
            return Err(AuthError::PasswordConfirmationMismatch);
        }

        let cpf = Cpf::new(&command.cpf)?;

        let email = match command.email.trim() {
            "" => None,
            trimmed => Some(EmailAddress::new(trimmed.to_string())?),
        };

        // uniqueness pre-check
        let cpf_hash = cpf.lookup_hash(&self.cpf_pepper);
        if self.store.credential_exists(&cpf_hash).await? {
            return Err(AuthError::CpfAlreadyRegistered);
        }

        // persist the pair
        let id = CustomerId::new();
        let now = Utc::now();

        let credential = Credential {
            id,
            cpf_hash,
            cpf_last4: cpf.last_four().to_string(),
            password_hash: self.password_hasher.hash(&command.password)?,
            cpf,
            status: CredentialStatus::Active,
            created_at: now,
        };

        let profile = Profile {
            id,
            full_name: command.full_name.trim().to_string(),
            email,
            birth_date: command.birth_date,
            phone: command.phone.trim().to_string(),
            status: ProfileStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        // The uniqueness pre-check above races with concurrent registrations
        // of the same CPF; the store's unique index decides, and its
        // violation maps to the same CpfAlreadyRegistered. An early `?`
        // drops the transaction, which rolls both inserts back.
        let mut txn = self.store.begin().await?;
        txn.insert_credential(&credential).await?;
        txn.insert_profile(&profile).await?;
        txn.commit().await?;

        tracing::info!(customer_id = %id, "Customer registered");

        Ok(RegistrationReceipt {
            customer_id: id,
            status: ProfileStatus::Pending,
            message: "Registration created. Your account is under review.".to_string(),
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, AuthError> {
        if command.cpf.trim().is_empty() {
            return Err(AuthError::MissingField { field: "cpf" });
        }
        if command.password.is_empty() {
            return Err(AuthError::MissingField { field: "password" });
        }

        // From here on every failure is the same InvalidCredentials, so a
        // caller cannot tell which factor was wrong.
        let Ok(cpf) = Cpf::new(&command.cpf) else {
            return Err(AuthError::InvalidCredentials);
        };

        let cpf_hash = cpf.lookup_hash(&self.cpf_pepper);
        let Some(credential) = self.store.find_credential_by_cpf_hash(&cpf_hash).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .password_hasher
            .verify(&command.password, &credential.password_hash)
        {
            return Err(AuthError::InvalidCredentials);
        }

        // Missing profile should not happen given the paired insert; default
        // the status rather than failing the login.
        let status = self
            .store
            .find_profile(&credential.id)
            .await?
            .map(|profile| profile.status)
            .unwrap_or(ProfileStatus::Pending);

        let issued = self
            .token_issuer
            .issue(credential.id, &credential.cpf_last4, status)?;

        tracing::debug!(customer_id = %credential.id, "Customer authenticated");

        Ok(issued)
    }

    async fn check_cpf(&self, raw_cpf: &str) -> Result<CpfCheck, AuthError> {
        // Malformed input reads as absence, indistinguishable from a CPF
        // that was never registered.
        let Ok(cpf) = Cpf::new(raw_cpf) else {
            return Ok(CpfCheck {
                exists: false,
                status: None,
            });
        };

        let cpf_hash = cpf.lookup_hash(&self.cpf_pepper);
        let Some(credential) = self.store.find_credential_by_cpf_hash(&cpf_hash).await? else {
            return Ok(CpfCheck {
                exists: false,
                status: None,
            });
        };

        let status = self
            .store
            .find_profile(&credential.id)
            .await?
            .map(|profile| profile.status);

        Ok(CpfCheck {
            exists: true,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::repositories::InMemoryIdentityStore;

    const PEPPER: &str = "test-pepper-secret";
    const CPF: &str = "529.982.247-25";

    fn service(store: Arc<InMemoryIdentityStore>) -> AuthService<InMemoryIdentityStore> {
        let token_issuer = TokenIssuer::new(
            "test-secret-key-for-jwt-signing-at-least-32-bytes",
            "aurum-auth",
            "aurum-app",
            240,
        )
        .expect("valid token config");

        AuthService::new(store, token_issuer, PEPPER.to_string())
    }

    fn register_command() -> RegisterCommand {
        RegisterCommand {
            full_name: "  Maria Silva  ".to_string(),
            email: "maria@example.com".to_string(),
            cpf: CPF.to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            phone: "+55 11 98888-7777".to_string(),
            password: "s3nha-forte".to_string(),
            confirm_password: "s3nha-forte".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_persists_credential_and_profile_pair() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(Arc::clone(&store));

        let receipt = service.register(register_command()).await.unwrap();
        assert_eq!(receipt.status, ProfileStatus::Pending);

        let cpf_hash = Cpf::new(CPF).unwrap().lookup_hash(PEPPER);
        let credential = store
            .find_credential_by_cpf_hash(&cpf_hash)
            .await
            .unwrap()
            .expect("credential persisted");
        assert_eq!(credential.id, receipt.customer_id);
        assert_eq!(credential.status, CredentialStatus::Active);
        assert_eq!(credential.cpf_last4, "4725");
        assert!(credential.password_hash.starts_with("$argon2"));

        let profile = store
            .find_profile(&receipt.customer_id)
            .await
            .unwrap()
            .expect("profile persisted");
        assert_eq!(profile.full_name, "Maria Silva");
        assert_eq!(profile.status, ProfileStatus::Pending);
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(store);

        let command = RegisterCommand {
            full_name: "   ".to_string(),
            ..register_command()
        };
        let result = service.register(command).await;
        assert!(matches!(
            result,
            Err(AuthError::MissingField { field: "fullName" })
        ));

        let command = RegisterCommand {
            phone: String::new(),
            ..register_command()
        };
        assert!(matches!(
            service.register(command).await,
            Err(AuthError::MissingField { field: "phone" })
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_password_mismatch() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(store);

        let command = RegisterCommand {
            confirm_password: "different".to_string(),
            ..register_command()
        };
        assert!(matches!(
            service.register(command).await,
            Err(AuthError::PasswordConfirmationMismatch)
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_short_cpf() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(store);

        let command = RegisterCommand {
            cpf: "1234567".to_string(),
            ..register_command()
        };
        assert!(matches!(
            service.register(command).await,
            Err(AuthError::InvalidCpf(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_cpf_conflicts() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(Arc::clone(&store));

        service.register(register_command()).await.unwrap();

        let result = service.register(register_command()).await;
        assert!(matches!(result, Err(AuthError::CpfAlreadyRegistered)));

        // exactly one pair persisted
        assert_eq!(store.credential_count(), 1);
        assert_eq!(store.profile_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration_yields_one_success() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = Arc::new(service(Arc::clone(&store)));

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.register(register_command()).await })
        };
        let second = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.register(register_command()).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::CpfAlreadyRegistered)))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(store.credential_count(), 1);
        assert_eq!(store.profile_count(), 1);
    }

    #[tokio::test]
    async fn test_login_issues_token_with_profile_status() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(store);

        service.register(register_command()).await.unwrap();

        let issued = service
            .login(LoginCommand {
                cpf: "52998224725".to_string(),
                password: "s3nha-forte".to_string(),
            })
            .await
            .unwrap();

        assert!(!issued.access_token.is_empty());
        assert!((issued.expires_in - 14400).abs() <= 1);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(store);

        service.register(register_command()).await.unwrap();

        let wrong_password = service
            .login(LoginCommand {
                cpf: CPF.to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_cpf = service
            .login(LoginCommand {
                cpf: "111.444.777-35".to_string(),
                password: "s3nha-forte".to_string(),
            })
            .await
            .unwrap_err();
        let malformed_cpf = service
            .login(LoginCommand {
                cpf: "123".to_string(),
                password: "s3nha-forte".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_cpf.to_string());
        assert_eq!(unknown_cpf.to_string(), malformed_cpf.to_string());
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_cpf, AuthError::InvalidCredentials));
        assert!(matches!(malformed_cpf, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_rejects_blank_input() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(store);

        assert!(matches!(
            service
                .login(LoginCommand {
                    cpf: String::new(),
                    password: "x".to_string(),
                })
                .await,
            Err(AuthError::MissingField { field: "cpf" })
        ));
        assert!(matches!(
            service
                .login(LoginCommand {
                    cpf: CPF.to_string(),
                    password: String::new(),
                })
                .await,
            Err(AuthError::MissingField { field: "password" })
        ));
    }

    #[tokio::test]
    async fn test_check_cpf_reports_existence_and_status() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(store);

        let absent = service.check_cpf(CPF).await.unwrap();
        assert!(!absent.exists);
        assert!(absent.status.is_none());

        service.register(register_command()).await.unwrap();

        let present = service.check_cpf("529-982-247.25").await.unwrap();
        assert!(present.exists);
        assert_eq!(present.status, Some(ProfileStatus::Pending));
    }

    #[tokio::test]
    async fn test_check_cpf_malformed_input_reads_as_absent() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let service = service(store);

        let result = service.check_cpf("12345678").await.unwrap();
        assert!(!result.exists);
        assert!(result.status.is_none());
    }
}
