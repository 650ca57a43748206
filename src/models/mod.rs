pub mod task;
pub mod user;

pub use task::{Task, TaskChanges, TaskInput, TaskQuery, TaskStatus, TaskStatusInput, TaskUpdateInput};
pub use user::{NewUser, User, UserChanges, UserInput, UserProfile, UserUpdateInput};
