use crate::storage::GENERIC_DATA_STORE;

use crate::accountdb::{
    errors::AccountError,
    types::{Account, AccountSearchField},
};

use super::postgres::*;
use super::sqlite::*;

pub struct AccountStore;

impl AccountStore {
    /// Initialize the accounts table
    pub(crate) async fn init() -> Result<(), AccountError> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_account_tables_sqlite(pool).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_account_tables_postgres(pool).await?;
                Ok(())
            }
            _ => Err(AccountError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Get an account by its ID
    #[tracing::instrument(fields(account_id = %id))]
    pub async fn get_account(id: &str) -> Result<Option<Account>, AccountError> {
        Self::get_account_by(AccountSearchField::Id(id.to_string())).await
    }

    #[tracing::instrument(fields(account_field = %field))]
    pub(crate) async fn get_account_by(
        field: AccountSearchField,
    ) -> Result<Option<Account>, AccountError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            get_account_by_field_sqlite(pool, &field).await
        } else if let Some(pool) = store.as_postgres() {
            get_account_by_field_postgres(pool, &field).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(Some(_)) => {
                tracing::debug!(found = true, "Account lookup completed");
            }
            Ok(None) => {
                tracing::debug!(found = false, "Account lookup completed - not found");
            }
            Err(e) => {
                tracing::error!(error = %e, "Account lookup failed");
            }
        }

        result
    }

    /// Create or update an account
    #[tracing::instrument(skip(account), fields(account_id = %account.id))]
    pub async fn upsert_account(account: Account) -> Result<Account, AccountError> {
        tracing::debug!(username = %account.username, "Upserting account");
        let store = GENERIC_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            upsert_account_sqlite(pool, account).await
        } else if let Some(pool) = store.as_postgres() {
            upsert_account_postgres(pool, account).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(account) => {
                tracing::info!(
                    account_id = %account.id,
                    is_admin = account.is_admin,
                    enabled = account.enabled,
                    "Account upsert completed"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Account upsert failed");
            }
        }

        result
    }

    /// Number of accounts that are both admin and enabled
    ///
    /// Queried fresh on every evaluation; the value is global aggregate
    /// state and must not be cached across requests.
    pub async fn count_enabled_admins() -> Result<i64, AccountError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            count_enabled_admins_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            count_enabled_admins_postgres(pool).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Set `enabled = false` on the account, unless it is the last enabled
    /// admin. Returns `Ok(None)` when the in-statement guard blocked the
    /// write, `Err(AccountError::NotFound)` when the id does not resolve.
    #[tracing::instrument(fields(account_id = %id))]
    pub async fn disable_account(id: &str) -> Result<Option<Account>, AccountError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            disable_account_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            disable_account_postgres(pool, id).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(Some(_)) => tracing::info!("Account disabled"),
            Ok(None) => tracing::debug!("Disable blocked by last-admin guard"),
            Err(e) => tracing::error!(error = %e, "Account disable failed"),
        }

        result
    }

    #[cfg(test)]
    pub(crate) async fn delete_all_accounts() -> Result<(), AccountError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_all_accounts_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            delete_all_accounts_postgres(pool).await
        } else {
            Err(AccountError::Storage("Unsupported database type".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_environment, reset_stores};
    use serial_test::serial;

    fn test_account(suffix: &str) -> Account {
        Account::new(
            format!("account-{suffix}"),
            format!("user-{suffix}"),
            format!("user-{suffix}@example.com"),
        )
    }

    #[tokio::test]
    #[serial]
    async fn test_accountstore_init_is_idempotent() {
        init_test_environment().await;

        assert!(AccountStore::init().await.is_ok());
        assert!(AccountStore::init().await.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_accountstore_upsert_and_get() {
        init_test_environment().await;
        reset_stores().await;

        let created = AccountStore::upsert_account(test_account("create"))
            .await
            .expect("Failed to create account");

        assert!(created.sequence_number.is_some());
        assert!(created.enabled);
        assert!(!created.is_admin);

        let by_id = AccountStore::get_account(&created.id)
            .await
            .expect("lookup failed")
            .expect("account should exist");
        assert_eq!(by_id, created);

        let by_username =
            AccountStore::get_account_by(AccountSearchField::Username(created.username.clone()))
                .await
                .expect("lookup failed")
                .expect("account should exist");
        assert_eq!(by_username.id, created.id);

        let by_email = AccountStore::get_account_by(AccountSearchField::Email(
            "user-create@example.com".to_string(),
        ))
        .await
        .expect("lookup failed")
        .expect("account should exist");
        assert_eq!(by_email.id, created.id);

        let missing = AccountStore::get_account("no-such-account")
            .await
            .expect("lookup failed");
        assert!(missing.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_accountstore_upsert_updates_existing_row() {
        init_test_environment().await;
        reset_stores().await;

        let created = AccountStore::upsert_account(test_account("update"))
            .await
            .expect("Failed to create account");

        let mut changed = created.clone();
        changed.email = "changed@example.com".to_string();
        changed.is_admin = true;

        let updated = AccountStore::upsert_account(changed)
            .await
            .expect("Failed to update account");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.sequence_number, created.sequence_number);
        assert_eq!(updated.email, "changed@example.com");
        assert!(updated.is_admin);
    }

    #[tokio::test]
    #[serial]
    async fn test_count_enabled_admins() {
        init_test_environment().await;
        reset_stores().await;

        assert_eq!(AccountStore::count_enabled_admins().await.expect("count"), 0);

        let mut admin = test_account("admin");
        admin.is_admin = true;
        AccountStore::upsert_account(admin).await.expect("create admin");

        let regular = test_account("regular");
        AccountStore::upsert_account(regular).await.expect("create regular");

        assert_eq!(AccountStore::count_enabled_admins().await.expect("count"), 1);

        // A disabled admin no longer counts
        let mut disabled_admin = test_account("disabled-admin");
        disabled_admin.is_admin = true;
        disabled_admin.enabled = false;
        AccountStore::upsert_account(disabled_admin)
            .await
            .expect("create disabled admin");

        assert_eq!(AccountStore::count_enabled_admins().await.expect("count"), 1);
    }

    #[tokio::test]
    #[serial]
    async fn test_disable_account_guard_blocks_last_admin() {
        init_test_environment().await;
        reset_stores().await;

        let mut admin = test_account("sole-admin");
        admin.is_admin = true;
        let admin = AccountStore::upsert_account(admin).await.expect("create admin");

        let outcome = AccountStore::disable_account(&admin.id)
            .await
            .expect("disable should not error");
        assert!(outcome.is_none(), "sole enabled admin must not be disabled");

        let still_enabled = AccountStore::get_account(&admin.id)
            .await
            .expect("lookup failed")
            .expect("account should exist");
        assert!(still_enabled.enabled);
    }

    #[tokio::test]
    #[serial]
    async fn test_disable_account_allows_admin_when_another_remains() {
        init_test_environment().await;
        reset_stores().await;

        let mut admin1 = test_account("admin1");
        admin1.is_admin = true;
        AccountStore::upsert_account(admin1).await.expect("create admin1");

        let mut admin2 = test_account("admin2");
        admin2.is_admin = true;
        let admin2 = AccountStore::upsert_account(admin2).await.expect("create admin2");

        let disabled = AccountStore::disable_account(&admin2.id)
            .await
            .expect("disable should not error")
            .expect("guard should permit with a second enabled admin");
        assert!(!disabled.enabled);

        assert_eq!(AccountStore::count_enabled_admins().await.expect("count"), 1);
    }

    #[tokio::test]
    #[serial]
    async fn test_disable_account_regular_user() {
        init_test_environment().await;
        reset_stores().await;

        let regular = AccountStore::upsert_account(test_account("plain"))
            .await
            .expect("create account");

        let disabled = AccountStore::disable_account(&regular.id)
            .await
            .expect("disable should not error")
            .expect("regular accounts are never guarded");
        assert!(!disabled.enabled);

        // Disabling an already-disabled account stays a success
        let again = AccountStore::disable_account(&regular.id)
            .await
            .expect("disable should not error")
            .expect("already-disabled account is a no-op success");
        assert!(!again.enabled);
    }

    #[tokio::test]
    #[serial]
    async fn test_disable_account_not_found() {
        init_test_environment().await;
        reset_stores().await;

        let result = AccountStore::disable_account("no-such-account").await;
        assert!(matches!(result, Err(AccountError::NotFound)));
    }
}
