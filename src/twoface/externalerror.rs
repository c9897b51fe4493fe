use actix_web::http::StatusCode;
use std::fmt;

/// Used to create HTTP responses with the given text and status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalError {
    /// A user-facing explanation of what caused the error.
    pub cause: Cause,
    /// Error text that will describe the problem to the user.
    pub text: &'static str,
}

/// A user-facing explanation of what caused the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    ServerError,
    UserBadAuth,
    UserForbidden,
    UserConflict,
    UserInvalidField,
    NotFound,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        // Make fmt::Display the same as fmt::Debug, i.e. each variant's name.
        write!(f, "{:?}", self)
    }
}

impl From<Cause> for StatusCode {
    /// Causes can be mapped to HTTP status codes. ExternalError doesn't use status codes directly,
    /// because some components (e.g. the Datastore) shouldn't need to know about HTTP codes.
    fn from(cause: Cause) -> StatusCode {
        match cause {
            Cause::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Cause::UserInvalidField => StatusCode::BAD_REQUEST,
            Cause::UserBadAuth => StatusCode::UNAUTHORIZED,
            Cause::UserForbidden => StatusCode::FORBIDDEN,
            Cause::UserConflict => StatusCode::CONFLICT,
            Cause::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl ExternalError {
    /// A username or email collided with an existing account.
    pub const USER_EXISTS: Self = Self {
        cause: Cause::UserConflict,
        text: "User already exists",
    };

    /// Deliberately the same for unknown emails and wrong passwords.
    pub const BAD_CREDENTIALS: Self = Self {
        cause: Cause::UserBadAuth,
        text: "Your email or password doesn't match!",
    };

    pub const NOT_LOGGED_IN: Self = Self {
        cause: Cause::UserBadAuth,
        text: "You need to log in first",
    };

    pub const ADMINS_ONLY: Self = Self {
        cause: Cause::UserForbidden,
        text: "Only admins can do that",
    };

    pub const NOT_FOUND: Self = Self {
        cause: Cause::NotFound,
        text: "Not found",
    };

    /// A form field failed validation. The text names the problem.
    pub const fn invalid_field(text: &'static str) -> Self {
        Self {
            cause: Cause::UserInvalidField,
            text,
        }
    }
}

impl fmt::Display for ExternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}: {}", self.cause, self.text)
    }
}

impl Default for ExternalError {
    // Default to ServerError and a very vague generic message.
    fn default() -> Self {
        Self {
            cause: Cause::ServerError,
            text: "Internal server error",
        }
    }
}
