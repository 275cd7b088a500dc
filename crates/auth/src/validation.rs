use app_config::PasswordConfig;
use app_error::{AppError, AppResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // This pattern checks for a valid email format with proper domain
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^([a-z0-9_+]([a-z0-9_+.]*[a-z0-9_+])?)@([a-z0-9]+([\-\.]{1}[a-z0-9]+)*\.[a-z]{2,6})"
    ).unwrap();
}

/// Validates an email address
pub fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Email cannot be empty".to_string(),
        ));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::validation("email", "Invalid email format"));
    }

    Ok(())
}

/// Validates a display name
pub fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Name cannot be empty".to_string(),
        ));
    }

    if name.trim().len() > 100 {
        return Err(AppError::validation("name", "cannot exceed 100 characters"));
    }

    Ok(())
}

/// Validates a password against the injected policy. The policy is part of
/// the startup configuration, never re-read per request.
pub fn validate_password(password: &str, policy: &PasswordConfig) -> AppResult<()> {
    if password.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Password cannot be empty".to_string(),
        ));
    }

    if password.len() < policy.min_length {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {} characters long",
            policy.min_length
        )));
    }

    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| {
        matches!(
            c,
            '@' | '$'
                | '!'
                | '%'
                | '*'
                | '?'
                | '&'
                | '#'
                | '^'
                | '-'
                | '_'
                | '+'
                | '='
                | '.'
                | ','
                | ':'
                | ';'
        )
    });

    let mut missing = Vec::new();

    if policy.require_lowercase && !has_lowercase {
        missing.push("lowercase letter");
    }

    if policy.require_uppercase && !has_uppercase {
        missing.push("uppercase letter");
    }

    if policy.require_number && !has_digit {
        missing.push("number");
    }

    if policy.require_special && !has_special {
        missing.push("special character (@$!%*?&#^-_+=.,:;)");
    }

    if !missing.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Password must contain at least one {}",
            missing.join(", one ")
        )));
    }

    Ok(())
}

/// Sanitizes a string input by trimming whitespace
pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}
