use std::{env, sync::LazyLock};

use crate::storage::DB_TABLE_PREFIX;

/// Stars table name
pub(crate) static DB_TABLE_STARS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_STARS").unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "stars"))
});
