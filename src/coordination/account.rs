use serde::Deserialize;

use crate::accountdb::{Account, AccountError, AccountSearchField, AccountStore};
use crate::credentials::CredentialStore;
use crate::policy::{AccountAction, Decision, DenyReason, decide};

use super::errors::{CoordinationError, FieldError};
use super::validation::{check_password_pair, email_format_valid};

/// Update-account request shape
///
/// Every field is optional; a password change is attempted whenever
/// `password` or `password_confirmation` is present, even empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_confirmation: Option<String>,
    #[serde(default)]
    pub current_password: Option<String>,
}

/// Update the actor's own profile
///
/// The whole request is validated before any write: a failing password
/// check rejects a co-submitted email as well, and an invalid email leaves
/// the stored one untouched. No partial field commit happens.
#[tracing::instrument(skip(actor, request), fields(account_id = %actor.id))]
pub async fn update_account(
    actor: &Account,
    request: UpdateRequest,
) -> Result<Account, CoordinationError> {
    let mut errors = Vec::new();

    let password_attempted =
        request.password.is_some() || request.password_confirmation.is_some();

    let new_password = if password_attempted {
        let current_password = request.current_password.as_deref().unwrap_or("");
        if current_password.is_empty() {
            errors.push(FieldError::new("current_password", "can't be blank"));
        } else if !CredentialStore::verify(&actor.id, current_password).await? {
            errors.push(FieldError::new("current_password", "is invalid"));
        }

        let password = request.password.as_deref().unwrap_or("");
        let password_confirmation = request.password_confirmation.as_deref().unwrap_or("");
        check_password_pair(password, password_confirmation, &mut errors);

        Some(password.to_string())
    } else {
        None
    };

    if let Some(email) = &request.email {
        if !email_format_valid(email) {
            errors.push(FieldError::new("email", "is invalid"));
        } else if let Some(existing) =
            AccountStore::get_account_by(AccountSearchField::Email(email.clone())).await?
        {
            if existing.id != actor.id {
                errors.push(FieldError::new("email", "has already been taken"));
            }
        }
    }

    if !errors.is_empty() {
        return Err(CoordinationError::Validation(errors).log());
    }

    // Work from the stored row, not the caller's snapshot, and write only
    // the submitted fields; a stale snapshot must not clobber the rest.
    let current = AccountStore::get_account(&actor.id).await?.ok_or_else(|| {
        CoordinationError::ResourceNotFound {
            resource_type: "Account".to_string(),
            resource_id: actor.id.clone(),
        }
        .log()
    })?;

    let account = match request.email {
        Some(email) => {
            let mut updated = current;
            updated.email = email;
            AccountStore::upsert_account(updated).await?
        }
        None => current,
    };

    // Writes to the account and credential stores are sequential, not
    // transactional: a credential-store failure here leaves the email
    // change applied and surfaces the error to the caller.
    if let Some(password) = new_password {
        CredentialStore::set_credential(&account.id, &password).await?;
        tracing::info!(account_id = %account.id, "Password changed");
    }

    Ok(account)
}

/// Disable the target account on behalf of `actor`
///
/// The pure policy decides first; the store write then re-checks the
/// last-admin guard atomically, so a racing disable surfaces as the same
/// authorization rejection instead of leaving zero enabled admins.
#[tracing::instrument(skip(actor), fields(actor_id = %actor.id, target_id = %target_id))]
pub async fn disable_account(
    actor: &Account,
    target_id: &str,
) -> Result<Account, CoordinationError> {
    let target = AccountStore::get_account(target_id).await?.ok_or_else(|| {
        CoordinationError::ResourceNotFound {
            resource_type: "Account".to_string(),
            resource_id: target_id.to_string(),
        }
        .log()
    })?;

    let enabled_admins = AccountStore::count_enabled_admins().await?;
    match decide(actor, &target, AccountAction::Disable, enabled_admins) {
        Decision::Allow => {}
        Decision::Deny(reason) => return Err(CoordinationError::Unauthorized(reason).log()),
    }

    match AccountStore::disable_account(target_id).await {
        Ok(Some(account)) => Ok(account),
        // Lost the race against a concurrent disable of the other admin
        Ok(None) => Err(CoordinationError::Unauthorized(DenyReason::LastEnabledAdmin).log()),
        Err(AccountError::NotFound) => Err(CoordinationError::ResourceNotFound {
            resource_type: "Account".to_string(),
            resource_id: target_id.to_string(),
        }
        .log()),
        Err(e) => Err(e.into()),
    }
}

/// Account deletion is not a supported operation; the record is never
/// removed for any actor or role.
#[tracing::instrument(skip(actor), fields(actor_id = %actor.id, target_id = %target_id))]
pub async fn delete_account(
    actor: &Account,
    target_id: &str,
) -> Result<(), CoordinationError> {
    let target = AccountStore::get_account(target_id).await?.ok_or_else(|| {
        CoordinationError::ResourceNotFound {
            resource_type: "Account".to_string(),
            resource_id: target_id.to_string(),
        }
        .log()
    })?;

    let enabled_admins = AccountStore::count_enabled_admins().await?;
    match decide(actor, &target, AccountAction::Delete, enabled_admins) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(CoordinationError::Unauthorized(reason).log()),
    }
}
