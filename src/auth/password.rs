use crate::error::AppError;
use actix_web::web;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Salted one-way password hashing.
///
/// bcrypt is CPU-bound, so both operations run on the blocking thread pool and the
/// calling request suspends until they finish.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes with a fresh random salt; two calls on the same input never return the same string.
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let cost = self.cost;
        let password = password.to_owned();
        web::block(move || hash(password, cost))
            .await
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))?
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    /// `Ok(false)` means a wrong password; a malformed stored hash is an error.
    pub async fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hashed_password = hashed_password.to_owned();
        web::block(move || verify(password, &hashed_password))
            .await
            .map_err(|e| {
                AppError::InternalServerError(format!("Failed to verify password: {}", e))
            })?
            .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
