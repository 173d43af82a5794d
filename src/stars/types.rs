use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A star set by an account on a repository
///
/// The (account, repository) pair is unique: an account can star a given
/// repository at most once. Stars are created and deleted, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Star {
    pub account_id: String,
    pub repository_id: String,
    pub created_at: DateTime<Utc>,
}
