use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskChanges, TaskStatus, User, UserChanges};

/// Process-local store used by the test suites and when no `DATABASE_URL` is set.
/// Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            age: user.age,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        if let Some(email) = &changes.email {
            if email_taken(&users, email, Some(id)) {
                return Err(AppError::BadRequest("Email already registered".into()));
            }
        }
        Ok(users.get_mut(&id).map(|user| {
            changes.apply(user);
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let removed = self.users.write().await.remove(&id);
        if removed.is_some() {
            self.tasks.write().await.retain(|_, t| t.user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn create(&self, task: Task) -> Result<Task, AppError> {
        // Held across the insert so a concurrent user delete cannot leave an orphan.
        let users = self.users.read().await;
        if !users.contains_key(&task.user_id) {
            return Err(AppError::NotFound("User not found".into()));
        }
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_for_owner(
        &self,
        owner: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| t.user_id == owner && status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self
            .tasks
            .read()
            .await
            .get(&id)
            .filter(|t| t.user_id == owner)
            .cloned())
    }

    async fn update_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .get_mut(&id)
            .filter(|t| t.user_id == owner)
            .map(|task| {
                changes.apply(task);
                task.clone()
            }))
    }

    async fn set_status_for_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .get_mut(&id)
            .filter(|t| t.user_id == owner)
            .map(|task| {
                task.status = status;
                task.updated_at = Utc::now();
                task.clone()
            }))
    }

    async fn delete_for_owner(&self, id: Uuid, owner: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks.write().await;
        let owned = tasks.get(&id).map_or(false, |t| t.user_id == owner);
        if owned {
            tasks.remove(&id);
        }
        Ok(owned)
    }
}
