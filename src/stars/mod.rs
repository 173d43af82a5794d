mod errors;
mod storage;
mod types;

pub use errors::StarError;
pub use storage::StarStore;
pub use types::Star;

pub(crate) async fn init() -> Result<(), StarError> {
    StarStore::init().await
}
