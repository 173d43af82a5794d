//! Shared setup for the integration suite
//!
//! The integration tests exercise the crate through its public API only, so
//! table cleanup goes through a direct SQLite connection instead of the
//! crate-internal test helpers.

use std::sync::Once;

use sqlx::sqlite::SqlitePoolOptions;

const TEST_DB_PATH: &str = "/tmp/account_policy_it.db";

/// Point the stores at a dedicated integration-test database and initialize
/// them. The database file is removed once per process so every run starts
/// from empty tables.
pub async fn setup() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        unsafe {
            std::env::set_var("GENERIC_DATA_STORE_TYPE", "sqlite");
            std::env::set_var("GENERIC_DATA_STORE_URL", format!("sqlite:{TEST_DB_PATH}"));
        }
        let _ = std::fs::remove_file(TEST_DB_PATH);
    });

    account_policy::init()
        .await
        .expect("store initialization failed");
}

/// Empty all tables between serial tests.
pub async fn reset() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{TEST_DB_PATH}"))
        .await
        .expect("failed to open the test database");

    for table in ["acp_stars", "acp_credentials", "acp_accounts"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&pool)
            .await
            .expect("failed to empty test table");
    }

    pool.close().await;
}
