use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::identity::models::Credential;
use crate::domain::identity::models::CustomerId;
use crate::domain::identity::models::Profile;
use crate::domain::identity::ports::IdentityStore;
use crate::domain::identity::ports::IdentityTxn;
use crate::identity::errors::StoreError;

/// In-memory identity store.
///
/// Backs the unit and integration test suites; commits enforce the same
/// cpf_hash uniqueness the Postgres schema does, so duplicate-registration
/// races behave like production.
#[derive(Clone, Default)]
pub struct InMemoryIdentityStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    credentials: Vec<Credential>,
    profiles: Vec<Profile>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed credentials (test assertions).
    pub fn credential_count(&self) -> usize {
        self.tables.lock().expect("store lock poisoned").credentials.len()
    }

    /// Number of committed profiles (test assertions).
    pub fn profile_count(&self) -> usize {
        self.tables.lock().expect("store lock poisoned").profiles.len()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_credential_by_cpf_hash(
        &self,
        cpf_hash: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables
            .credentials
            .iter()
            .find(|c| c.cpf_hash == cpf_hash)
            .cloned())
    }

    async fn credential_exists(&self, cpf_hash: &str) -> Result<bool, StoreError> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables.credentials.iter().any(|c| c.cpf_hash == cpf_hash))
    }

    async fn find_profile(&self, id: &CustomerId) -> Result<Option<Profile>, StoreError> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables.profiles.iter().find(|p| p.id == *id).cloned())
    }

    async fn begin(&self) -> Result<Box<dyn IdentityTxn>, StoreError> {
        Ok(Box::new(InMemoryTxn {
            tables: Arc::clone(&self.tables),
            staged_credentials: Vec::new(),
            staged_profiles: Vec::new(),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Staged writes applied atomically at commit; dropping the value discards
/// them, which is the rollback path.
struct InMemoryTxn {
    tables: Arc<Mutex<Tables>>,
    staged_credentials: Vec<Credential>,
    staged_profiles: Vec<Profile>,
}

#[async_trait]
impl IdentityTxn for InMemoryTxn {
    async fn insert_credential(&mut self, credential: &Credential) -> Result<(), StoreError> {
        self.staged_credentials.push(credential.clone());
        Ok(())
    }

    async fn insert_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        self.staged_profiles.push(profile.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store lock poisoned");

        // unique index equivalent: reject the whole transaction, nothing
        // partial becomes visible
        for staged in &self.staged_credentials {
            if tables
                .credentials
                .iter()
                .any(|c| c.cpf_hash == staged.cpf_hash)
            {
                return Err(StoreError::DuplicateCpfHash);
            }
        }

        tables.credentials.extend(self.staged_credentials);
        tables.profiles.extend(self.staged_profiles);

        Ok(())
    }
}
