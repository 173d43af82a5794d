use crate::accountdb::Account;
use crate::stars::{Star, StarError, StarStore};

use super::errors::{CoordinationError, FieldError};

/// Star a repository on behalf of the actor
///
/// A duplicate star is a validation-level rejection, not a storage error;
/// the star count for the repository is unchanged by it.
#[tracing::instrument(skip(actor), fields(account_id = %actor.id, repository_id = %repository_id))]
pub async fn star_repository(
    actor: &Account,
    repository_id: &str,
) -> Result<Star, CoordinationError> {
    match StarStore::create_star(&actor.id, repository_id).await {
        Ok(star) => Ok(star),
        Err(StarError::AlreadyStarred { .. }) => Err(CoordinationError::Validation(vec![
            FieldError::new("repository", "has already been starred"),
        ])
        .log()),
        Err(e) => Err(e.into()),
    }
}

/// Remove the actor's star from a repository
#[tracing::instrument(skip(actor), fields(account_id = %actor.id, repository_id = %repository_id))]
pub async fn unstar_repository(
    actor: &Account,
    repository_id: &str,
) -> Result<(), CoordinationError> {
    match StarStore::delete_star(&actor.id, repository_id).await {
        Ok(()) => Ok(()),
        Err(StarError::NotStarred { .. }) => Err(CoordinationError::ResourceNotFound {
            resource_type: "Star".to_string(),
            resource_id: format!("{}/{}", actor.id, repository_id),
        }
        .log()),
        Err(e) => Err(e.into()),
    }
}
