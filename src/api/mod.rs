//! HTTP API for the task scheduler.
//!
//! ## Endpoints
//!
//! - `GET /api/nextdate?now=&date=&repeat=` - Next occurrence (plain text)
//! - `POST /api/signin` - Exchange the password for a token
//! - `GET /api/health` - Health check
//! - `POST /api/task` - Create a task
//! - `GET /api/task?id=` - Get a task
//! - `PUT /api/task` - Edit a task
//! - `DELETE /api/task?id=` - Delete a task
//! - `POST /api/task/done?id=` - Complete a task
//! - `GET /api/tasks?search=` - List upcoming tasks
//!
//! Anything else is served from the web directory.

mod auth;
mod error;
mod routes;
pub mod task_store;
mod tasks;
pub mod types;

pub use error::ApiError;
pub use routes::{router, serve, AppState, Clock};
