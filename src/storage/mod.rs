mod data_store;
mod errors;
mod schema_validation;

pub(crate) use data_store::{DB_TABLE_PREFIX, GENERIC_DATA_STORE};
pub use errors::StorageError;
pub(crate) use schema_validation::{validate_postgres_table_schema, validate_sqlite_table_schema};

pub(crate) async fn init() -> Result<(), StorageError> {
    let _ = *GENERIC_DATA_STORE;
    Ok(())
}
