pub mod extractors;
pub mod login;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;
use crate::models::UserProfile;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenKind, TokenPair, TokenService};

fn validate_login_type(kind: &str) -> Result<(), ValidationError> {
    match kind {
        "email" | "refresh" => Ok(()),
        "" => Err(field_error("required", "Type is required!")),
        _ => Err(field_error("invalid_type", "Type must be email or refresh")),
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Represents the payload of `POST /users/login`.
///
/// `type` selects the branch: `email` needs `email` and `password`, `refresh`
/// needs `refreshToken`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(rename = "type", default)]
    #[validate(custom = "validate_login_type")]
    pub kind: String,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// A login request after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginMethod {
    Email { email: String, password: String },
    Refresh { refresh_token: Option<String> },
}

impl TryFrom<LoginRequest> for LoginMethod {
    type Error = AppError;

    fn try_from(request: LoginRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        if request.kind == "refresh" {
            // An absent token is reported by the login flow as 401, not here.
            return Ok(LoginMethod::Refresh {
                refresh_token: request.refresh_token,
            });
        }

        let email = request.email.filter(|e| !e.trim().is_empty());
        let password = request.password.filter(|p| !p.is_empty());
        let mut errors = ValidationErrors::new();
        if email.is_none() {
            errors.add("email", field_error("required", "Email is required!"));
        }
        if password.is_none() {
            errors.add("password", field_error("required", "Password is required!"));
        }
        match (email, password) {
            (Some(email), Some(password)) => Ok(LoginMethod::Email { email, password }),
            _ => Err(errors.into()),
        }
    }
}

/// Body of a successful login: the user's profile merged with a token pair.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    #[serde(flatten)]
    pub tokens: TokenPair,
}
