use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::credentials::errors::CredentialError;
use crate::storage::GENERIC_DATA_STORE;
use crate::utils::base64url_encode;

use super::postgres::*;
use super::sqlite::*;

pub struct CredentialStore;

fn credential_digest(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    base64url_encode(&digest)
}

impl CredentialStore {
    /// Initialize the credentials table
    pub(crate) async fn init() -> Result<(), CredentialError> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_credential_tables_sqlite(pool).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_credential_tables_postgres(pool).await?;
                Ok(())
            }
            _ => Err(CredentialError::Storage(
                "Unsupported database type".to_string(),
            )),
        }
    }

    /// Store (or replace) the credential for an account
    #[tracing::instrument(skip(plaintext), fields(account_id = %account_id))]
    pub async fn set_credential(account_id: &str, plaintext: &str) -> Result<(), CredentialError> {
        let digest = credential_digest(plaintext);
        let store = GENERIC_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            upsert_digest_sqlite(pool, account_id, &digest).await
        } else if let Some(pool) = store.as_postgres() {
            upsert_digest_postgres(pool, account_id, &digest).await
        } else {
            Err(CredentialError::Storage(
                "Unsupported database type".to_string(),
            ))
        };

        match &result {
            Ok(()) => tracing::info!("Credential stored"),
            Err(e) => tracing::error!(error = %e, "Credential store failed"),
        }

        result
    }

    /// Check a plaintext against the stored credential. Accounts without a
    /// stored credential never verify.
    #[tracing::instrument(skip(plaintext), fields(account_id = %account_id))]
    pub async fn verify(account_id: &str, plaintext: &str) -> Result<bool, CredentialError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let stored = if let Some(pool) = store.as_sqlite() {
            get_digest_sqlite(pool, account_id).await?
        } else if let Some(pool) = store.as_postgres() {
            get_digest_postgres(pool, account_id).await?
        } else {
            return Err(CredentialError::Storage(
                "Unsupported database type".to_string(),
            ));
        };

        let Some(stored) = stored else {
            return Ok(false);
        };

        let candidate = credential_digest(plaintext);
        Ok(candidate.as_bytes().ct_eq(stored.as_bytes()).into())
    }

    #[cfg(test)]
    pub(crate) async fn delete_all_credentials() -> Result<(), CredentialError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_all_credentials_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            delete_all_credentials_postgres(pool).await
        } else {
            Err(CredentialError::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }
}
