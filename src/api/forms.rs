//! Request bodies, and the checks they must pass before anything touches the datastore.
use crate::twoface::{Describe, ExternalError, Fallible};
use anyhow::anyhow;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

fn invalid(text: &'static str) -> crate::twoface::TfError {
    anyhow!("form validation failed: {}", text).describe(ExternalError::invalid_field(text))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Fallible<()> {
        if self.username.is_empty() {
            return Err(invalid("Username is required."));
        }
        if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid(
                "Username should be one word, letters, numbers, and underscores only.",
            ));
        }
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(invalid("Password is required."));
        }
        if self.password.chars().count() < 2 {
            return Err(invalid("Password must be at least 2 characters long."));
        }
        if self.password != self.password2 {
            return Err(invalid("Passwords must match."));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Fallible<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(invalid("Password is required."));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PostForm {
    pub content: String,
}

impl PostForm {
    /// The datastore would happily keep a blank post, but the API won't accept one.
    pub fn validate(&self) -> Fallible<()> {
        if self.content.trim().is_empty() {
            return Err(invalid("Post content is required."));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Fallible<()> {
    if email.is_empty() {
        return Err(invalid("Email is required."));
    }
    if !EmailAddress::is_valid(email) {
        return Err(invalid("Invalid email address."));
    }
    Ok(())
}
