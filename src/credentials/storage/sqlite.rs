use sqlx::{Pool, Sqlite};

use crate::credentials::errors::CredentialError;
use crate::storage::validate_sqlite_table_schema;

use super::config::DB_TABLE_CREDENTIALS;

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), CredentialError> {
    let table_name = DB_TABLE_CREDENTIALS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            account_id TEXT PRIMARY KEY,
            digest TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn validate_credential_tables_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<(), CredentialError> {
    let credentials_table = DB_TABLE_CREDENTIALS.as_str();

    let expected_columns = vec![
        ("account_id", "TEXT"),
        ("digest", "TEXT"),
        ("created_at", "TIMESTAMP"),
        ("updated_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(
        pool,
        credentials_table,
        &expected_columns,
        CredentialError::Storage,
    )
    .await
}

pub(super) async fn upsert_digest_sqlite(
    pool: &Pool<Sqlite>,
    account_id: &str,
    digest: &str,
) -> Result<(), CredentialError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_CREDENTIALS.as_str();
    let now = chrono::Utc::now();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (account_id, digest, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (account_id) DO UPDATE SET
            digest = excluded.digest,
            updated_at = ?
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

pub(super) async fn get_digest_sqlite(
    pool: &Pool<Sqlite>,
    account_id: &str,
) -> Result<Option<String>, CredentialError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_CREDENTIALS.as_str();

    sqlx::query_scalar(&format!(
        r#"
        SELECT digest FROM {table_name} WHERE account_id = ?
        "#
    ))
    .bind(account_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))
}

#[cfg(test)]
pub(super) async fn delete_all_credentials_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<(), CredentialError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_CREDENTIALS.as_str();

    sqlx::query(&format!("DELETE FROM {table_name}"))
        .execute(pool)
        .await
        .map_err(|e| CredentialError::Storage(e.to_string()))?;

    Ok(())
}
