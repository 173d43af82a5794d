use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum StarError {
    #[error("Account {account_id} has already starred repository {repository_id}")]
    AlreadyStarred {
        account_id: String,
        repository_id: String,
    },

    #[error("Account {account_id} has not starred repository {repository_id}")]
    NotStarred {
        account_id: String,
        repository_id: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}
