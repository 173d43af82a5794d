use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents a user account in the system
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Account {
    /// Database-assigned sequence number (primary key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<i64>,
    /// Unique opaque account identifier
    pub id: String,
    /// Unique login name
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Whether the account has administrator privileges
    pub is_admin: bool,
    /// Whether the account is currently enabled
    pub enabled: bool,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new enabled, non-admin account
    pub fn new(id: String, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            sequence_number: None,
            id,
            username,
            email,
            is_admin: false,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// An account counts toward the last-admin guard only while it is
    /// both an admin and enabled
    pub fn is_enabled_admin(&self) -> bool {
        self.is_admin && self.enabled
    }
}

/// Lookup key for account queries
#[derive(Debug, Clone)]
pub(crate) enum AccountSearchField {
    Id(String),
    Username(String),
    Email(String),
}

impl std::fmt::Display for AccountSearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::Username(username) => write!(f, "username={username}"),
            Self::Email(email) => write!(f, "email={email}"),
        }
    }
}
