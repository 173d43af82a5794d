use sqlx::{Pool, Postgres};

use crate::credentials::errors::CredentialError;
use crate::storage::validate_postgres_table_schema;

use super::config::DB_TABLE_CREDENTIALS;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), CredentialError> {
    let table_name = DB_TABLE_CREDENTIALS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            account_id TEXT PRIMARY KEY,
            digest TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn validate_credential_tables_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), CredentialError> {
    let credentials_table = DB_TABLE_CREDENTIALS.as_str();

    let expected_columns = vec![
        ("account_id", "text"),
        ("digest", "text"),
        ("created_at", "timestamp with time zone"),
        ("updated_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        credentials_table,
        &expected_columns,
        CredentialError::Storage,
    )
    .await
}

pub(super) async fn upsert_digest_postgres(
    pool: &Pool<Postgres>,
    account_id: &str,
    digest: &str,
) -> Result<(), CredentialError> {
    let table_name = DB_TABLE_CREDENTIALS.as_str();
    let now = chrono::Utc::now();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (account_id, digest, created_at, updated_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (account_id) DO UPDATE SET
            digest = EXCLUDED.digest,
            updated_at = $5
        "#
    ))
    .bind(account_id)
    .bind(digest)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_digest_postgres(
    pool: &Pool<Postgres>,
    account_id: &str,
) -> Result<Option<String>, CredentialError> {
    let table_name = DB_TABLE_CREDENTIALS.as_str();

    sqlx::query_scalar(&format!(
        r#"
        SELECT digest FROM {table_name} WHERE account_id = $1
        "#
    ))
    .bind(account_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))
}

#[cfg(test)]
pub(super) async fn delete_all_credentials_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), CredentialError> {
    let table_name = DB_TABLE_CREDENTIALS.as_str();

    sqlx::query(&format!("DELETE FROM {table_name}"))
        .execute(pool)
        .await
        .map_err(|e| CredentialError::Storage(e.to_string()))?;

    Ok(())
}
