use std::{env, sync::LazyLock};

use crate::storage::DB_TABLE_PREFIX;

/// Credentials table name
pub(crate) static DB_TABLE_CREDENTIALS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_CREDENTIALS")
        .unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "credentials"))
});
