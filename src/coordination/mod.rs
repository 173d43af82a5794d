//! Account operation coordination
//!
//! High-level entry points that stitch the pure policy, the account store
//! and the credential collaborator together:
//! - `registration`: account creation with the guarded admin flag
//! - `account`: profile update, disable and delete
//! - `star`: starring and unstarring repositories
//! - `errors`: the caller-visible error kinds

mod account;
mod errors;
mod registration;
mod star;
mod validation;

pub use account::{UpdateRequest, delete_account, disable_account, update_account};
pub use errors::{CoordinationError, FieldError};
pub use registration::{RegistrationRequest, register_account};
pub use star::{star_repository, unstar_repository};
