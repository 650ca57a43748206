//! Credential login: email/password or refresh token in, fresh token pair out.

use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenService;
use crate::auth::{LoginMethod, LoginResponse};
use crate::error::AppError;
use crate::models::User;
use crate::store::UserRepository;

pub async fn login(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    tokens: &TokenService,
    method: LoginMethod,
) -> Result<LoginResponse, AppError> {
    let user = match method {
        LoginMethod::Email { email, password } => {
            login_with_email(users, hasher, &email, &password).await?
        }
        LoginMethod::Refresh { refresh_token } => {
            login_with_refresh_token(users, tokens, refresh_token.as_deref()).await?
        }
    };

    let pair = tokens.issue_pair(&user)?;
    log::info!("Login Successful!");
    Ok(LoginResponse {
        user: user.into(),
        tokens: pair,
    })
}

async fn login_with_email(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = users
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if hasher.verify(password, &user.password_hash).await? {
        Ok(user)
    } else {
        Err(AppError::Unauthorized("Wrong Password".into()))
    }
}

async fn login_with_refresh_token(
    users: &dyn UserRepository,
    tokens: &TokenService,
    refresh_token: Option<&str>,
) -> Result<User, AppError> {
    let refresh_token = refresh_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("refreshToken is not defined".into()))?;

    let claims = tokens.verify_refresh(refresh_token)?;

    // The account may have been deleted since the refresh token was issued.
    users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))
}
