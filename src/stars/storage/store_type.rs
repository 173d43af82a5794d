use crate::stars::{errors::StarError, types::Star};
use crate::storage::GENERIC_DATA_STORE;

use super::postgres::*;
use super::sqlite::*;

pub struct StarStore;

impl StarStore {
    /// Initialize the stars table
    pub(crate) async fn init() -> Result<(), StarError> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_star_tables_sqlite(pool).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_star_tables_postgres(pool).await?;
                Ok(())
            }
            _ => Err(StarError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Star a repository on behalf of an account
    #[tracing::instrument]
    pub async fn create_star(account_id: &str, repository_id: &str) -> Result<Star, StarError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            insert_star_sqlite(pool, account_id, repository_id).await
        } else if let Some(pool) = store.as_postgres() {
            insert_star_postgres(pool, account_id, repository_id).await
        } else {
            Err(StarError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(_) => tracing::info!("Star created"),
            Err(StarError::AlreadyStarred { .. }) => {
                tracing::debug!("Duplicate star rejected");
            }
            Err(e) => tracing::error!(error = %e, "Star creation failed"),
        }

        result
    }

    /// Remove an existing star
    #[tracing::instrument]
    pub async fn delete_star(account_id: &str, repository_id: &str) -> Result<(), StarError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_star_sqlite(pool, account_id, repository_id).await
        } else if let Some(pool) = store.as_postgres() {
            delete_star_postgres(pool, account_id, repository_id).await
        } else {
            Err(StarError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn count_stars_for_repository(repository_id: &str) -> Result<i64, StarError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            count_stars_for_repository_sqlite(pool, repository_id).await
        } else if let Some(pool) = store.as_postgres() {
            count_stars_for_repository_postgres(pool, repository_id).await
        } else {
            Err(StarError::Storage("Unsupported database type".to_string()))
        }
    }

    #[cfg(test)]
    pub(crate) async fn delete_all_stars() -> Result<(), StarError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_all_stars_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            delete_all_stars_postgres(pool).await
        } else {
            Err(StarError::Storage("Unsupported database type".to_string()))
        }
    }
}
