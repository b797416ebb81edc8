//! Login and registration form validation.
//!
//! Errors are reported per field so a front end can show them inline.

use std::collections::BTreeMap;

use crate::models::RegisterData;

const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 20;
const PASSWORD_MIN_LENGTH: usize = 6;
const PASSWORD_MAX_LENGTH: usize = 50;
const NAME_MIN_LENGTH: usize = 2;
const NAME_MAX_LENGTH: usize = 50;

/// Field name to message. Only failing fields are present.
pub type FormErrors = BTreeMap<&'static str, String>;

fn check_length(
    errors: &mut FormErrors,
    field: &'static str,
    label: &str,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> bool {
    let len = value.chars().count();
    if len == 0 {
        errors.insert(field, format!("{} is required", label));
        return false;
    }
    if len < min {
        errors.insert(field, format!("{} must be at least {} characters", label, min));
        return false;
    }
    if let Some(max) = max {
        if len > max {
            errors.insert(field, format!("{} must not exceed {} characters", label, max));
            return false;
        }
    }
    true
}

/// `local@domain.tld` shape: one `@`, no whitespace, a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn validate_login(username: &str, password: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();
    check_length(
        &mut errors,
        "username",
        "Username",
        username,
        USERNAME_MIN_LENGTH,
        Some(USERNAME_MAX_LENGTH),
    );
    check_length(&mut errors, "password", "Password", password, PASSWORD_MIN_LENGTH, None);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_register(data: &RegisterData) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    check_length(&mut errors, "firstName", "First name", &data.first_name, NAME_MIN_LENGTH, Some(NAME_MAX_LENGTH));
    check_length(&mut errors, "lastName", "Last name", &data.last_name, NAME_MIN_LENGTH, Some(NAME_MAX_LENGTH));

    if check_length(
        &mut errors,
        "username",
        "Username",
        &data.username,
        USERNAME_MIN_LENGTH,
        Some(USERNAME_MAX_LENGTH),
    ) && !data
        .username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        errors.insert(
            "username",
            "Username can only contain letters, numbers, and underscores".to_string(),
        );
    }

    if data.email.is_empty() {
        errors.insert("email", "Email is required".to_string());
    } else if !is_valid_email(&data.email) {
        errors.insert("email", "Please enter a valid email address".to_string());
    }

    if check_length(
        &mut errors,
        "password",
        "Password",
        &data.password,
        PASSWORD_MIN_LENGTH,
        Some(PASSWORD_MAX_LENGTH),
    ) {
        let password = &data.password;
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.insert("password", "Password must contain at least one lowercase letter".to_string());
        } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.insert("password", "Password must contain at least one uppercase letter".to_string());
        } else if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.insert("password", "Password must contain at least one number".to_string());
        }
    }

    if data.confirm_password.is_empty() {
        errors.insert("confirmPassword", "Please confirm your password".to_string());
    } else if data.confirm_password != data.password {
        errors.insert("confirmPassword", "Passwords must match".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
