mod errors;
mod storage;
mod types;

pub use errors::AccountError;
pub use storage::AccountStore;
pub use types::Account;
pub(crate) use types::AccountSearchField;

pub(crate) async fn init() -> Result<(), AccountError> {
    AccountStore::init().await
}
