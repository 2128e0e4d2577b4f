use crate::models::MAX_HABIT_NAME_LEN;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Input problems caught before any request leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("Habit name must be at most {} characters", MAX_HABIT_NAME_LEN)]
    NameTooLong,

    #[error("New description must be different from the current one")]
    UnchangedDescription,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub fn validate_login(email: &str, password: &str) -> Result<Credentials, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    if password.is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

pub fn validate_registration(
    email: &str,
    password: &str,
    confirmation: &str,
) -> Result<Credentials, ValidationError> {
    let credentials = validate_login(email, password)?;
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(credentials)
}

pub fn validate_habit(name: &str, description: &str, tags: &str) -> Result<HabitDraft, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required("Habit name"));
    }
    if name.chars().count() > MAX_HABIT_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }

    let description = Some(description.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    let tags = parse_tags(tags);

    Ok(HabitDraft {
        name: name.to_string(),
        description,
        tags: (!tags.is_empty()).then_some(tags),
    })
}

/// Splits a comma-separated field, keeping the first occurrence of each tag.
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|tag| !tag.is_empty()) {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

pub fn validate_evolution(current: Option<&str>, proposed: &str) -> Result<String, ValidationError> {
    let proposed = proposed.trim();
    if proposed.is_empty() {
        return Err(ValidationError::Required("New description"));
    }
    if current.map(str::trim) == Some(proposed) {
        return Err(ValidationError::UnchangedDescription);
    }
    Ok(proposed.to_string())
}
