use sqlx::{Pool, Sqlite};

use crate::stars::{errors::StarError, types::Star};
use crate::storage::validate_sqlite_table_schema;

use super::config::DB_TABLE_STARS;

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), StarError> {
    let table_name = DB_TABLE_STARS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            account_id TEXT NOT NULL,
            repository_id TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            UNIQUE (account_id, repository_id)
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| StarError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn validate_star_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), StarError> {
    let stars_table = DB_TABLE_STARS.as_str();

    let expected_columns = vec![
        ("account_id", "TEXT"),
        ("repository_id", "TEXT"),
        ("created_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(pool, stars_table, &expected_columns, StarError::Storage).await
}

/// Insert a star, relying on the UNIQUE constraint for atomic duplicate
/// detection. Zero affected rows means the pair already exists.
pub(super) async fn insert_star_sqlite(
    pool: &Pool<Sqlite>,
    account_id: &str,
    repository_id: &str,
) -> Result<Star, StarError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_STARS.as_str();
    let now = chrono::Utc::now();

    let result = sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (account_id, repository_id, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (account_id, repository_id) DO NOTHING
        "#
    ))
    .bind(account_id)
    .bind(repository_id)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| StarError::Storage(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(StarError::AlreadyStarred {
            account_id: account_id.to_string(),
            repository_id: repository_id.to_string(),
        });
    }

    Ok(Star {
        account_id: account_id.to_string(),
        repository_id: repository_id.to_string(),
        created_at: now,
    })
}

pub(super) async fn delete_star_sqlite(
    pool: &Pool<Sqlite>,
    account_id: &str,
    repository_id: &str,
) -> Result<(), StarError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_STARS.as_str();

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE account_id = ? AND repository_id = ?
        "#
    ))
    .bind(account_id)
    .bind(repository_id)
    .execute(pool)
    .await
    .map_err(|e| StarError::Storage(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(StarError::NotStarred {
            account_id: account_id.to_string(),
            repository_id: repository_id.to_string(),
        });
    }

    Ok(())
}

pub(super) async fn count_stars_for_repository_sqlite(
    pool: &Pool<Sqlite>,
    repository_id: &str,
) -> Result<i64, StarError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_STARS.as_str();

    sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name} WHERE repository_id = ?
        "#
    ))
    .bind(repository_id)
    .fetch_one(pool)
    .await
    .map_err(|e| StarError::Storage(e.to_string()))
}

#[cfg(test)]
pub(super) async fn delete_all_stars_sqlite(pool: &Pool<Sqlite>) -> Result<(), StarError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_STARS.as_str();

    sqlx::query(&format!("DELETE FROM {table_name}"))
        .execute(pool)
        .await
        .map_err(|e| StarError::Storage(e.to_string()))?;

    Ok(())
}
