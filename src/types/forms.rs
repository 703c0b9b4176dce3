//! Submitted HTML forms and their validation.
//!
//! Fields are optional so that a missing field becomes a user-facing
//! `Validation` error instead of an extractor rejection.

use serde::Deserialize;

use crate::error::AppError;

pub const AGE_MIN: i64 = 1;
pub const AGE_MAX: i64 = 150;
pub const NAME_MAX_CHARS: usize = 100;
pub const GRADE_MAX_CHARS: usize = 10;
pub const USERNAME_MAX_CHARS: usize = 80;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct StudentForm {
    pub name: Option<String>,
    pub age: Option<String>,
    pub grade: Option<String>,
}

/// A student that passed validation and may be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub age: i64,
    pub grade: String,
}

impl StudentForm {
    pub fn validate(self) -> Result<NewStudent, AppError> {
        let name = required(self.name, "Name")?;
        let age = required(self.age, "Age")?;
        let grade = required(self.grade, "Grade")?;

        if name.chars().count() > NAME_MAX_CHARS {
            return Err(AppError::validation(format!(
                "Name must be at most {NAME_MAX_CHARS} characters."
            )));
        }
        if grade.chars().count() > GRADE_MAX_CHARS {
            return Err(AppError::validation(format!(
                "Grade must be at most {GRADE_MAX_CHARS} characters."
            )));
        }

        let age: i64 = age
            .parse()
            .map_err(|_| AppError::validation("Age must be a whole number."))?;
        if !(AGE_MIN..=AGE_MAX).contains(&age) {
            return Err(AppError::validation(format!(
                "Age must be between {AGE_MIN} and {AGE_MAX}."
            )));
        }

        Ok(NewStudent { name, age, grade })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CredentialsForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl CredentialsForm {
    pub fn validate(self) -> Result<Credentials, AppError> {
        let username = required(self.username, "Username")?;
        if username.chars().count() > USERNAME_MAX_CHARS {
            return Err(AppError::validation(format!(
                "Username must be at most {USERNAME_MAX_CHARS} characters."
            )));
        }
        // passwords are taken verbatim, whitespace included
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::validation("Password is required."))?;
        Ok(Credentials { username, password })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("{field} is required.")))
}
