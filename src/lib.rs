//! account-policy - Account authorization policy engine
//!
//! This crate implements the account-mutation policy for a multi-user
//! service: registration with a guarded admin flag, atomic profile updates,
//! account disabling with a last-admin guard, and the repository star
//! relation. Credential material is handled by an opaque collaborator that
//! only exposes `set_credential` and `verify`.

mod accountdb;
mod coordination;
mod credentials;
mod policy;
mod stars;
mod storage;
#[cfg(test)]
mod test_utils;
mod utils;

pub use accountdb::{Account, AccountError, AccountStore};
pub use coordination::{
    CoordinationError, FieldError, RegistrationRequest, UpdateRequest, delete_account,
    disable_account, register_account, star_repository, unstar_repository, update_account,
};
pub use credentials::{CredentialError, CredentialStore};
pub use policy::{AccountAction, Decision, DenyReason, decide, registration_admin_flag};
pub use stars::{Star, StarError, StarStore};
pub use storage::StorageError;

/// Initialize the data store and the tables every store needs
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    storage::init().await?;
    accountdb::init().await?;
    credentials::init().await?;
    stars::init().await?;
    Ok(())
}
