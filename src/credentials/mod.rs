//! Credential collaborator
//!
//! The rest of the crate treats credentials as opaque: it can set one and
//! ask whether a plaintext matches, nothing else. Internally a SHA-256
//! digest is stored and compared in constant time.

mod errors;
mod storage;

pub use errors::CredentialError;
pub use storage::CredentialStore;

pub(crate) async fn init() -> Result<(), CredentialError> {
    CredentialStore::init().await
}
