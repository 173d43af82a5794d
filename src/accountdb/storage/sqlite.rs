use sqlx::{Pool, Sqlite};

use crate::accountdb::{
    errors::AccountError,
    types::{Account, AccountSearchField},
};
use crate::storage::validate_sqlite_table_schema;

use super::config::DB_TABLE_ACCOUNTS;

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), AccountError> {
    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            sequence_number INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            is_admin BOOLEAN NOT NULL DEFAULT false,
            enabled BOOLEAN NOT NULL DEFAULT true,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    Ok(())
}

/// Validates that the accounts table schema matches what we expect
pub(super) async fn validate_account_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), AccountError> {
    let accounts_table = DB_TABLE_ACCOUNTS.as_str();

    let expected_columns = vec![
        ("sequence_number", "INTEGER"),
        ("id", "TEXT"),
        ("username", "TEXT"),
        ("email", "TEXT"),
        ("is_admin", "BOOLEAN"),
        ("enabled", "BOOLEAN"),
        ("created_at", "TIMESTAMP"),
        ("updated_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(pool, accounts_table, &expected_columns, AccountError::Storage)
        .await
}

pub(super) async fn get_account_by_field_sqlite(
    pool: &Pool<Sqlite>,
    field: &AccountSearchField,
) -> Result<Option<Account>, AccountError> {
    // Ensure tables exist before any operations
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();

    let (column, value) = match field {
        AccountSearchField::Id(id) => ("id", id),
        AccountSearchField::Username(username) => ("username", username),
        AccountSearchField::Email(email) => ("email", email),
    };

    sqlx::query_as::<_, Account>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE {column} = ?
        "#
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

pub(super) async fn upsert_account_sqlite(
    pool: &Pool<Sqlite>,
    account: Account,
) -> Result<Account, AccountError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();
    let now = chrono::Utc::now();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (id, username, email, is_admin, enabled, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            username = excluded.username,
            email = excluded.email,
            is_admin = excluded.is_admin,
            enabled = excluded.enabled,
            updated_at = ?
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
    .execute(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    // Fetch the account to get the sequence_number
    sqlx::query_as::<_, Account>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(&account.id)
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

pub(super) async fn count_enabled_admins_sqlite(pool: &Pool<Sqlite>) -> Result<i64, AccountError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name} WHERE is_admin = true AND enabled = true
        "#
    ))
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

/// Guarded disable: the last-admin check runs inside the UPDATE so two
/// racing disables cannot leave zero enabled admins
pub(super) async fn disable_account_sqlite(
    pool: &Pool<Sqlite>,
    id: &str,
) -> Result<Option<Account>, AccountError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();
    let now = chrono::Utc::now();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET enabled = false, updated_at = ?
        WHERE id = ?
          AND (is_admin = false OR enabled = false
               OR (SELECT COUNT(*) FROM {table_name}
                   WHERE is_admin = true AND enabled = true) > 1)
        "#
    ))
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    let account = get_account_by_field_sqlite(pool, &AccountSearchField::Id(id.to_string())).await?;

    match account {
        None => Err(AccountError::NotFound),
        Some(_) if result.rows_affected() == 0 => Ok(None),
        Some(account) => Ok(Some(account)),
    }
}

#[cfg(test)]
pub(super) async fn delete_all_accounts_sqlite(pool: &Pool<Sqlite>) -> Result<(), AccountError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_ACCOUNTS.as_str();

    sqlx::query(&format!("DELETE FROM {table_name}"))
        .execute(pool)
        .await
        .map_err(|e| AccountError::Storage(e.to_string()))?;

    Ok(())
}
