//! # Task Scheduler
//!
//! Personal to-do scheduler with recurring tasks.
//!
//! ## Modules
//! - `task`: dates, recurrence rules, validation and the task lifecycle
//! - `api`: HTTP handlers, authentication and task storage
//! - `config`: environment configuration

pub mod api;
pub mod config;
pub mod task;

pub use config::Config;
pub use task::{next_occurrence, RecurrenceRule, Task};
