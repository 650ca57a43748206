use std::{path::PathBuf, sync::Arc};

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::error::AppError;
use crate::store::{InMemoryStore, PgStore, TaskRepository, UserRepository};

/// Where uploaded files go and how large they may be.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

/// Shared, read-only application state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
    pub uploads: UploadSettings,
}

impl AppState {
    pub fn new<R>(store: Arc<R>, config: &Config) -> Result<Self, AppError>
    where
        R: UserRepository + TaskRepository + 'static,
    {
        let tokens = TokenService::new(
            &config.jwt_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        )?;
        Ok(Self {
            users: store.clone(),
            tasks: store,
            tokens: Arc::new(tokens),
            hasher: PasswordHasher::new(config.bcrypt_cost),
            uploads: UploadSettings {
                dir: config.upload_dir.clone(),
                max_bytes: config.max_upload_bytes,
            },
        })
    }

    pub fn in_memory(config: &Config) -> Result<Self, AppError> {
        Self::new(Arc::new(InMemoryStore::new()), config)
    }

    pub fn postgres(store: PgStore, config: &Config) -> Result<Self, AppError> {
        Self::new(Arc::new(store), config)
    }
}
