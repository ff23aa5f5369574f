//! Task module - the scheduling core.
//!
//! This module is pure:
//! - no I/O, no clock reads (the current date is always a parameter)
//! - recurrence rules are a closed enum parsed once at validation time
//! - every failure is a typed error returned to the caller

pub mod date;
mod error;
pub mod lifecycle;
mod model;
pub mod rule;
pub mod validate;

pub use date::{format_date, parse_date};
pub use error::{DateFormatError, RuleError, ValidationError};
pub use lifecycle::{complete_task, schedule_on_create, schedule_on_edit, Completion, StoredSchedule};
pub use model::{NewTask, Task, TaskDraft, TaskId, ValidTask};
pub use rule::{next_occurrence, RecurrenceRule};
pub use validate::{parse_task_id, validate_for_create, validate_for_edit};
