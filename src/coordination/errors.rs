use thiserror::Error;

use crate::accountdb::AccountError;
use crate::credentials::CredentialError;
use crate::policy::DenyReason;
use crate::stars::StarError;
use crate::utils::UtilError;

/// A field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors surfaced by the coordination layer
///
/// `Validation` is the 422-equivalent rejection, `Unauthorized` the
/// 403-equivalent one; both leave the stores unchanged.
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// One or more submitted fields were rejected
    #[error("Validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// The actor lacks permission for the requested mutation
    #[error("Unauthorized: {0}")]
    Unauthorized(DenyReason),

    /// Resource not found with context
    #[error("Resource not found: {resource_type} {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// Error from the account store
    #[error("Account error: {0}")]
    Account(AccountError),

    /// Error from the credential collaborator
    #[error("Credential error: {0}")]
    Credential(CredentialError),

    /// Error from the star store
    #[error("Star error: {0}")]
    Star(StarError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(UtilError),
}

impl CoordinationError {
    /// Log the error and return self, allowing method chaining at rejection
    /// sites that want explicit logging.
    pub fn log(self) -> Self {
        match &self {
            Self::Validation(errors) => {
                tracing::debug!("Validation failed: {}", join_field_errors(errors))
            }
            Self::Unauthorized(reason) => tracing::debug!("Unauthorized: {}", reason),
            Self::ResourceNotFound {
                resource_type,
                resource_id,
            } => tracing::debug!("Resource not found: {} {}", resource_type, resource_id),
            Self::Account(err) => tracing::error!("Account error: {}", err),
            Self::Credential(err) => tracing::error!("Credential error: {}", err),
            Self::Star(err) => tracing::error!("Star error: {}", err),
            Self::Utils(err) => tracing::error!("Utils error: {}", err),
        }
        self
    }
}

// Store-level errors are unexpected here, so the From impls log eagerly.

impl From<AccountError> for CoordinationError {
    fn from(err: AccountError) -> Self {
        let error = Self::Account(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<CredentialError> for CoordinationError {
    fn from(err: CredentialError) -> Self {
        let error = Self::Credential(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<StarError> for CoordinationError {
    fn from(err: StarError) -> Self {
        let error = Self::Star(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::Utils(err);
        tracing::error!("{}", error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<CoordinationError>();
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = CoordinationError::Validation(vec![
            FieldError::new("email", "is invalid"),
            FieldError::new("password", "can't be blank"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: email is invalid, password can't be blank"
        );
    }

    #[test]
    fn test_unauthorized_display() {
        let err = CoordinationError::Unauthorized(DenyReason::DeletionUnsupported);
        assert_eq!(
            err.to_string(),
            "Unauthorized: account deletion is not supported"
        );
    }

    #[test]
    fn test_resource_not_found_display() {
        let err = CoordinationError::ResourceNotFound {
            resource_type: "Account".to_string(),
            resource_id: "123".to_string(),
        };
        assert_eq!(err.to_string(), "Resource not found: Account 123");
    }

    #[test]
    fn test_from_account_error() {
        let err: CoordinationError = AccountError::NotFound.into();
        assert!(matches!(
            err,
            CoordinationError::Account(AccountError::NotFound)
        ));
    }

    #[test]
    fn test_from_star_error() {
        let star_err = StarError::Storage("db gone".to_string());
        let err: CoordinationError = star_err.into();
        assert!(matches!(err, CoordinationError::Star(_)));
    }

    #[test]
    fn test_log_returns_self() {
        let err = CoordinationError::Unauthorized(DenyReason::NotPermitted).log();
        assert!(matches!(err, CoordinationError::Unauthorized(_)));
    }
}
