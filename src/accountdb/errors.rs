use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum AccountError {
    #[error("Account not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),
}
