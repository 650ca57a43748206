use crate::error::AppError;
use crate::models::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the two token flavours a JWT is.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, the user's id.
    pub sub: Uuid,
    /// Only present on access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub kind: TokenKind,
    /// Unique token id, so two tokens minted within the same second still differ.
    pub jti: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies HS256 tokens with a single shared secret.
///
/// Built once at startup from configuration and shared read-only by the
/// middleware and the login flow.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Fails when the secret is empty: tokens are never signed with a blank key.
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, AppError> {
        if secret.trim().is_empty() {
            return Err(AppError::InternalServerError(
                "JWT secret is not configured".into(),
            ));
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
        })
    }

    /// Signs `{sub, email}` with the short-lived access TTL.
    pub fn issue_access_token(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        self.sign(user_id, Some(email.to_string()), TokenKind::Access, self.access_ttl)
    }

    /// Signs `{sub}` with the long-lived refresh TTL.
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, AppError> {
        self.sign(user_id, None, TokenKind::Refresh, self.refresh_ttl)
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user.id, &user.email)?,
            refresh_token: self.issue_refresh_token(user.id)?,
        })
    }

    /// Checks signature, expiry and that the token is an access token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        self.verify_kind(token, TokenKind::Access)
    }

    /// Checks signature, expiry and that the token is a refresh token.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        self.verify_kind(token, TokenKind::Refresh)
    }

    fn sign(
        &self,
        user_id: Uuid,
        email: Option<String>,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: user_id,
            email,
            kind,
            jti: Uuid::new_v4(),
            iat: now.timestamp().max(0) as usize,
            exp: expiration.timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        if claims.kind != expected {
            log::debug!("token rejected: expected {:?}, got {:?}", expected, claims.kind);
            return Err(AppError::Unauthorized("Unauthorized".into()));
        }
        Ok(claims)
    }
}
