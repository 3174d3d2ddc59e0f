use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Row;
use sqlx::Transaction;

use crate::domain::identity::models::Cpf;
use crate::domain::identity::models::Credential;
use crate::domain::identity::models::CustomerId;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Profile;
use crate::domain::identity::ports::IdentityStore;
use crate::domain::identity::ports::IdentityTxn;
use crate::identity::errors::StoreError;

/// Postgres-backed identity store.
///
/// `identity.users` holds credentials with a unique index on `cpf_hash`;
/// `core.customers` holds the paired profiles.
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn find_credential_by_cpf_hash(
        &self,
        cpf_hash: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, cpf, cpf_hash, cpf_last4, password_hash, status, created_at
            FROM identity.users
            WHERE cpf_hash = $1
            "#,
        )
        .bind(cpf_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        row.map(credential_from_row).transpose()
    }

    async fn credential_exists(&self, cpf_hash: &str) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (SELECT 1 FROM identity.users WHERE cpf_hash = $1) AS present
            "#,
        )
        .bind(cpf_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        row.try_get("present")
            .map_err(|e| StoreError::DatabaseError(e.to_string()))
    }

    async fn find_profile(&self, id: &CustomerId) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, birth_date, phone, status, created_at, updated_at
            FROM core.customers
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        row.map(profile_from_row).transpose()
    }

    async fn begin(&self) -> Result<Box<dyn IdentityTxn>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        Ok(Box::new(PgIdentityTxn { tx }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

/// Write transaction over the Postgres store.
///
/// Wraps a sqlx transaction, so dropping it without commit rolls back.
struct PgIdentityTxn {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl IdentityTxn for PgIdentityTxn {
    async fn insert_credential(&mut self, credential: &Credential) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO identity.users (id, cpf, cpf_hash, cpf_last4, password_hash, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(credential.id.0)
        .bind(credential.cpf.as_digits())
        .bind(&credential.cpf_hash)
        .bind(&credential.cpf_last4)
        .bind(&credential.password_hash)
        .bind(credential.status.as_str())
        .bind(credential.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn insert_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO core.customers (id, full_name, email, birth_date, phone, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(profile.id.0)
        .bind(&profile.full_name)
        .bind(profile.email.as_ref().map(|e| e.as_str().to_string()))
        .bind(profile.birth_date)
        .bind(&profile.phone)
        .bind(profile.status.as_str())
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_write_error)
    }
}

/// Map write failures, keeping the cpf_hash unique violation distinct so the
/// registration workflow can report it as a conflict.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_cpf_hash_key") {
            return StoreError::DuplicateCpfHash;
        }
    }
    StoreError::DatabaseError(e.to_string())
}

fn credential_from_row(row: PgRow) -> Result<Credential, StoreError> {
    let cpf: String = get(&row, "cpf")?;
    let status: String = get(&row, "status")?;

    Ok(Credential {
        id: CustomerId(get(&row, "id")?),
        cpf: Cpf::new(&cpf).map_err(|e| StoreError::CorruptRecord(e.to_string()))?,
        cpf_hash: get(&row, "cpf_hash")?,
        cpf_last4: get(&row, "cpf_last4")?,
        password_hash: get(&row, "password_hash")?,
        status: status
            .parse()
            .map_err(|e: crate::identity::errors::StatusError| {
                StoreError::CorruptRecord(e.to_string())
            })?,
        created_at: get(&row, "created_at")?,
    })
}

fn profile_from_row(row: PgRow) -> Result<Profile, StoreError> {
    let email: Option<String> = get(&row, "email")?;
    let status: String = get(&row, "status")?;

    Ok(Profile {
        id: CustomerId(get(&row, "id")?),
        full_name: get(&row, "full_name")?,
        email: email
            .map(EmailAddress::new)
            .transpose()
            .map_err(|e| StoreError::CorruptRecord(e.to_string()))?,
        birth_date: get(&row, "birth_date")?,
        phone: get(&row, "phone")?,
        status: status
            .parse()
            .map_err(|e: crate::identity::errors::StatusError| {
                StoreError::CorruptRecord(e.to_string())
            })?,
        created_at: get(&row, "created_at")?,
        updated_at: get(&row, "updated_at")?,
    })
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::DatabaseError(e.to_string()))
}
