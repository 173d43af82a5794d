use sqlx::{Pool, Postgres};

use crate::accountdb::{
    errors::AccountError,
    types::{Account, AccountSearchField},
};
use crate::storage::validate_postgres_table_schema;

use super::config::DB_TABLE_ACCOUNTS;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), AccountError> {
    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            sequence_number BIGSERIAL PRIMARY KEY,
            id TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE,
            enabled BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    Ok(())
}

/// Validates that the accounts table schema matches what we expect
pub(super) async fn validate_account_tables_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), AccountError> {
    let accounts_table = DB_TABLE_ACCOUNTS.as_str();

    let expected_columns = vec![
        ("sequence_number", "bigint"),
        ("id", "text"),
        ("username", "text"),
        ("email", "text"),
        ("is_admin", "boolean"),
        ("enabled", "boolean"),
        ("created_at", "timestamp with time zone"),
        ("updated_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(pool, accounts_table, &expected_columns, AccountError::Storage)
        .await
}

pub(super) async fn get_account_by_field_postgres(
    pool: &Pool<Postgres>,
    field: &AccountSearchField,
) -> Result<Option<Account>, AccountError> {
    let table_name = DB_TABLE_ACCOUNTS.as_str();

    let (column, value) = match field {
        AccountSearchField::Id(id) => ("id", id),
        AccountSearchField::Username(username) => ("username", username),
        AccountSearchField::Email(email) => ("email", email),
    };

    sqlx::query_as::<_, Account>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE {column} = $1
        "#
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

pub(super) async fn upsert_account_postgres(
    pool: &Pool<Postgres>,
    account: Account,
) -> Result<Account, AccountError> {
    let table_name = DB_TABLE_ACCOUNTS.as_str();
    let now = chrono::Utc::now();

    sqlx::query_as::<_, Account>(&format!(
        r#"
        INSERT INTO {table_name} (id, username, email, is_admin, enabled, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE SET
            username = EXCLUDED.username,
            email = EXCLUDED.email,
            is_admin = EXCLUDED.is_admin,
            enabled = EXCLUDED.enabled,
            updated_at = $8
        RETURNING *
        "#
    ))
    .bind(&account.id)
    .bind(&account.username)
    .bind(&account.email)
    .bind(account.is_admin)
    .bind(account.enabled)
    .bind(now) // created_at
    .bind(now) // updated_at
    .bind(now) // updated_at for the UPDATE part
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

pub(super) async fn count_enabled_admins_postgres(
    pool: &Pool<Postgres>,
) -> Result<i64, AccountError> {
    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name} WHERE is_admin AND enabled
        "#
    ))
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

/// Guarded disable: the last-admin check runs inside the UPDATE so two
/// racing disables cannot leave zero enabled admins
pub(super) async fn disable_account_postgres(
    pool: &Pool<Postgres>,
    id: &str,
) -> Result<Option<Account>, AccountError> {
    let table_name = DB_TABLE_ACCOUNTS.as_str();
    let now = chrono::Utc::now();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET enabled = FALSE, updated_at = $1
        WHERE id = $2
          AND (NOT is_admin OR NOT enabled
               OR (SELECT COUNT(*) FROM {table_name}
                   WHERE is_admin AND enabled) > 1)
        "#
    ))
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    let account =
        get_account_by_field_postgres(pool, &AccountSearchField::Id(id.to_string())).await?;

    match account {
        None => Err(AccountError::NotFound),
        Some(_) if result.rows_affected() == 0 => Ok(None),
        Some(account) => Ok(Some(account)),
    }
}

#[cfg(test)]
pub(super) async fn delete_all_accounts_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), AccountError> {
    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query(&format!("DELETE FROM {table_name}"))
        .execute(pool)
        .await
        .map_err(|e| AccountError::Storage(e.to_string()))?;

    Ok(())
}
