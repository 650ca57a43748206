#![doc = "The `taskdesk` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, persistence layer, authentication"]
#![doc = "mechanisms, routing configuration, and error handling for the TaskDesk API."]
#![doc = "It is used by the main binary (`main.rs`) and by the integration tests to"]
#![doc = "construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
