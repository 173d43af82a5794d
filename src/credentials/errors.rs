use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum CredentialError {
    #[error("Storage error: {0}")]
    Storage(String),
}
