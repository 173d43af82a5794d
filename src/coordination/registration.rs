use serde::Deserialize;

use crate::accountdb::{Account, AccountSearchField, AccountStore};
use crate::credentials::CredentialStore;
use crate::policy::registration_admin_flag;
use crate::utils::gen_random_string;

use super::errors::{CoordinationError, FieldError};
use super::validation::{check_password_pair, email_format_valid};

/// Create-account request shape
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    /// Honored only while the system has no enabled admin
    #[serde(default)]
    pub admin: Option<bool>,
}

/// Register a new account
///
/// All fields are validated before anything is written. The submitted admin
/// flag is resolved against the current enabled-admin count; the new
/// account always starts enabled.
#[tracing::instrument(skip(request), fields(username = %request.username))]
pub async fn register_account(request: RegistrationRequest) -> Result<Account, CoordinationError> {
    let mut errors = Vec::new();

    if request.username.is_empty() {
        errors.push(FieldError::new("username", "can't be blank"));
    } else if AccountStore::get_account_by(AccountSearchField::Username(request.username.clone()))
        .await?
        .is_some()
    {
        errors.push(FieldError::new("username", "has already been taken"));
    }

    if !email_format_valid(&request.email) {
        errors.push(FieldError::new("email", "is invalid"));
    } else if AccountStore::get_account_by(AccountSearchField::Email(request.email.clone()))
        .await?
        .is_some()
    {
        errors.push(FieldError::new("email", "has already been taken"));
    }

    check_password_pair(&request.password, &request.password_confirmation, &mut errors);

    if !errors.is_empty() {
        return Err(CoordinationError::Validation(errors).log());
    }

    let enabled_admins = AccountStore::count_enabled_admins().await?;
    let is_admin = registration_admin_flag(request.admin, enabled_admins);
    if request.admin == Some(true) && !is_admin {
        tracing::debug!("Submitted admin flag ignored, an enabled admin already exists");
    }

    let id = gen_new_account_id().await?;
    let mut account = Account::new(id, request.username, request.email);
    account.is_admin = is_admin;

    // The two writes are sequential, not transactional: a credential-store
    // failure leaves the account row in place with no credential, and the
    // error is surfaced to the caller.
    let account = AccountStore::upsert_account(account).await?;
    CredentialStore::set_credential(&account.id, &request.password).await?;

    tracing::info!(account_id = %account.id, is_admin = account.is_admin, "Account registered");

    Ok(account)
}

// generate a unique account ID, with built-in collision detection
pub(super) async fn gen_new_account_id() -> Result<String, CoordinationError> {
    // Try up to 3 times to generate a unique ID
    for _ in 0..3 {
        let id = gen_random_string(32)?;

        match AccountStore::get_account(&id).await? {
            None => return Ok(id),
            Some(_) => continue,
        }
    }

    // Reaching this point with 256-bit random ids means the store itself is
    // misbehaving; report it as a storage-level failure.
    Err(CoordinationError::Account(
        crate::accountdb::AccountError::Storage(
            "Failed to generate a unique account ID after multiple attempts".to_string(),
        ),
    )
    .log())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_environment, reset_stores};
    use serial_test::serial;

    fn request(username: &str, admin: Option<bool>) -> RegistrationRequest {
        RegistrationRequest {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password: "12341234".to_string(),
            password_confirmation: "12341234".to_string(),
            admin,
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_defaults_admin_to_false_when_omitted() {
        init_test_environment().await;
        reset_stores().await;

        let account = register_account(request("administrator", None))
            .await
            .expect("registration should succeed");

        assert!(!account.is_admin);
        assert!(account.enabled);
    }

    #[tokio::test]
    #[serial]
    async fn test_honors_admin_flag_when_no_admin_exists() {
        init_test_environment().await;
        reset_stores().await;

        let account = register_account(request("administrator", Some(true)))
            .await
            .expect("registration should succeed");

        assert!(account.is_admin);
    }

    #[tokio::test]
    #[serial]
    async fn test_ignores_admin_flag_when_an_admin_exists() {
        init_test_environment().await;
        reset_stores().await;

        register_account(request("administrator", Some(true)))
            .await
            .expect("first registration should succeed");

        let account = register_account(request("wonnabeadministrator", Some(true)))
            .await
            .expect("second registration should succeed");

        assert!(!account.is_admin);
    }

    #[tokio::test]
    #[serial]
    async fn test_admin_flag_honored_again_once_admin_is_disabled() {
        init_test_environment().await;
        reset_stores().await;

        let admin = register_account(request("administrator", Some(true)))
            .await
            .expect("registration should succeed");

        // Another enabled admin joins, then the first one is disabled
        register_account(request("second", Some(true)))
            .await
            .expect("registration should succeed");
        crate::accountdb::AccountStore::disable_account(&admin.id)
            .await
            .expect("disable should not error")
            .expect("a second enabled admin exists");

        // One enabled admin remains, so the flag is still ignored
        let third = register_account(request("third", Some(true)))
            .await
            .expect("registration should succeed");
        assert!(!third.is_admin);
    }

    #[tokio::test]
    #[serial]
    async fn test_rejects_duplicate_username_and_email() {
        init_test_environment().await;
        reset_stores().await;

        register_account(request("alice", None))
            .await
            .expect("first registration should succeed");

        let duplicate_username = RegistrationRequest {
            email: "fresh@test.com".to_string(),
            ..request("alice", None)
        };
        let err = register_account(duplicate_username)
            .await
            .expect_err("duplicate username must be rejected");
        match err {
            CoordinationError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.field == "username"));
            }
            other => panic!("expected validation error, got {other}"),
        }

        let duplicate_email = RegistrationRequest {
            username: "alice2".to_string(),
            ..request("alice", None)
        };
        let err = register_account(duplicate_email)
            .await
            .expect_err("duplicate email must be rejected");
        match err {
            CoordinationError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.field == "email"));
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_rejects_invalid_email_and_weak_password() {
        init_test_environment().await;
        reset_stores().await;

        let bad = RegistrationRequest {
            username: "bob".to_string(),
            email: "invalidone".to_string(),
            password: "short".to_string(),
            password_confirmation: "different".to_string(),
            admin: None,
        };

        let err = register_account(bad)
            .await
            .expect_err("invalid request must be rejected");
        match err {
            CoordinationError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
                assert!(fields.contains(&"email"));
                assert!(fields.contains(&"password"));
                assert!(fields.contains(&"password_confirmation"));
            }
            other => panic!("expected validation error, got {other}"),
        }

        // Nothing was written
        let lookup = crate::accountdb::AccountStore::get_account_by(
            AccountSearchField::Username("bob".to_string()),
        )
        .await
        .expect("lookup failed");
        assert!(lookup.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_registered_credential_verifies() {
        init_test_environment().await;
        reset_stores().await;

        let account = register_account(request("carol", None))
            .await
            .expect("registration should succeed");

        assert!(
            CredentialStore::verify(&account.id, "12341234")
                .await
                .expect("verify")
        );
    }
}
