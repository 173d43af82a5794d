//! Shared test initialization and cleanup helpers
//!
//! Centralized setup used by every database-backed test module: environment
//! loading from `.env_test`, one-time removal of the SQLite test database
//! file, store initialization, and a `reset_stores` helper that empties all
//! tables between serial tests.

use std::sync::Once;

use crate::accountdb::AccountStore;
use crate::credentials::CredentialStore;
use crate::stars::StarStore;

/// Centralized test initialization for all tests across the entire crate
///
/// Loads `.env_test` (falling back to `.env`) once, removes any stale SQLite
/// test database file once, and initializes all stores. Safe to call at the
/// top of every test.
pub async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        // Defaults so the suite also runs without an env file checked out
        if std::env::var("GENERIC_DATA_STORE_TYPE").is_err() {
            unsafe { std::env::set_var("GENERIC_DATA_STORE_TYPE", "sqlite") };
        }
        if std::env::var("GENERIC_DATA_STORE_URL").is_err() {
            unsafe {
                std::env::set_var("GENERIC_DATA_STORE_URL", "sqlite:/tmp/account_policy_test.db")
            };
        }

        // Start from a clean database file
        if let Some(db_path) = extract_sqlite_file_path() {
            let _ = std::fs::remove_file(&db_path);
        }
    });

    ensure_stores_initialized().await;
}

/// Initialize the stores, logging failures instead of panicking so a single
/// misconfigured test environment produces readable errors.
async fn ensure_stores_initialized() {
    if let Err(e) = AccountStore::init().await {
        eprintln!("Warning: Failed to initialize AccountStore: {e}");
    }
    if let Err(e) = CredentialStore::init().await {
        eprintln!("Warning: Failed to initialize CredentialStore: {e}");
    }
    if let Err(e) = StarStore::init().await {
        eprintln!("Warning: Failed to initialize StarStore: {e}");
    }
}

/// Empty all tables. Serial tests call this after `init_test_environment`
/// so state from an earlier test never leaks into the enabled-admin count.
pub async fn reset_stores() {
    if let Err(e) = AccountStore::delete_all_accounts().await {
        eprintln!("Warning: Failed to reset accounts: {e}");
    }
    if let Err(e) = CredentialStore::delete_all_credentials().await {
        eprintln!("Warning: Failed to reset credentials: {e}");
    }
    if let Err(e) = StarStore::delete_all_stars().await {
        eprintln!("Warning: Failed to reset stars: {e}");
    }
}

/// Extract the file path from a SQLite database URL
///
/// Supports `sqlite:/path/to/file.db`, `sqlite://path`, and
/// `sqlite:file:path?options`. Returns None for in-memory or non-SQLite URLs.
fn extract_sqlite_file_path_from_url(url: &str) -> Option<String> {
    let path = url.strip_prefix("sqlite:")?;

    if let Some(file_path) = path.strip_prefix("file:") {
        let path_only = file_path.split('?').next()?;
        if path_only.contains(":memory:") {
            return None;
        }
        Some(path_only.to_string())
    } else {
        let path = path.strip_prefix("//").unwrap_or(path);
        if path.contains(":memory:") {
            return None;
        }
        Some(path.to_string())
    }
}

fn extract_sqlite_file_path() -> Option<String> {
    std::env::var("GENERIC_DATA_STORE_URL")
        .ok()
        .and_then(|url| extract_sqlite_file_path_from_url(&url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sqlite_file_path_from_url() {
        assert_eq!(
            extract_sqlite_file_path_from_url("sqlite:/tmp/test.db"),
            Some("/tmp/test.db".to_string())
        );
        assert_eq!(
            extract_sqlite_file_path_from_url("sqlite:./test.db"),
            Some("./test.db".to_string())
        );
        assert_eq!(
            extract_sqlite_file_path_from_url("sqlite:file:/tmp/test.db?mode=rwc"),
            Some("/tmp/test.db".to_string())
        );
        assert_eq!(extract_sqlite_file_path_from_url("sqlite::memory:"), None);
        assert_eq!(
            extract_sqlite_file_path_from_url("postgresql://localhost/test"),
            None
        );
        assert_eq!(extract_sqlite_file_path_from_url(""), None);
        assert_eq!(
            extract_sqlite_file_path_from_url("sqlite:///tmp/test.db"),
            Some("/tmp/test.db".to_string())
        );
    }
}
