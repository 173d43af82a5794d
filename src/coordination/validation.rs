//! Field validation shared by registration and profile update

use super::errors::FieldError;

/// Minimum accepted password length
pub(super) const MIN_PASSWORD_LENGTH: usize = 8;

/// Loose email shape check: one `@`, non-empty local part and domain,
/// no whitespace anywhere.
pub(super) fn email_format_valid(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        _ => false,
    }
}

/// Validate a new password against its confirmation, pushing field errors
/// onto `errors`.
pub(super) fn check_password_pair(
    password: &str,
    password_confirmation: &str,
    errors: &mut Vec<FieldError>,
) {
    if password.is_empty() {
        errors.push(FieldError::new("password", "can't be blank"));
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new("password", "is too short"));
    }

    if password != password_confirmation {
        errors.push(FieldError::new(
            "password_confirmation",
            "doesn't match password",
        ));
    }
}
