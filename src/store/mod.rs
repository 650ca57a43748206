//! Persistence collaborators.
//!
//! Handlers and the login flow only see these traits. Every task operation takes
//! the caller's id alongside the task id, so an implementation cannot be asked
//! for a task without its owner.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskChanges, TaskStatus, User, UserChanges};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. Fails with `BadRequest` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    /// Returns `None` when no user has this id.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError>;
    /// Removes the user and every task they own, returning the removed user.
    async fn delete(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: Task) -> Result<Task, AppError>;
    /// Newest first.
    async fn list_for_owner(
        &self,
        owner: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, AppError>;
    async fn find_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError>;
    async fn update_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError>;
    async fn set_status_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, AppError>;
    /// Returns `false` when nothing matched `(id, owner)`.
    async fn delete_for_owner(&self, id: Uuid, owner: Uuid) -> Result<bool, AppError>;
}
