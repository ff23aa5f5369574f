//! Task records as stored and as submitted by clients.
//!
//! # Invariants
//! - `Task::date` is always an 8-digit `YYYYMMDD` string.
//! - `Task::title` is never empty.
//! - `Task::repeat` is empty or parses as a [`RecurrenceRule`].

use chrono::NaiveDate;

use super::date::format_date;
use super::rule::RecurrenceRule;

/// Storage-assigned task identifier. Immutable once assigned.
pub type TaskId = i64;

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

/// Field values for a task that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

impl NewTask {
    /// Attach a storage id.
    pub fn with_id(self, id: TaskId) -> Task {
        Task {
            id,
            date: self.date,
            title: self.title,
            comment: self.comment,
            repeat: self.repeat,
        }
    }
}

/// A candidate record exactly as a client sent it. Any field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Only meaningful for edits.
    pub id: String,
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

/// A draft that passed field validation.
///
/// The rule is parsed here once; later stages use `rule` and only carry
/// `repeat` through to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    /// `None` when the client omitted the date.
    pub date: Option<NaiveDate>,
    pub title: String,
    pub comment: String,
    pub rule: RecurrenceRule,
    pub repeat: String,
}

impl ValidTask {
    /// Build the storable record with the scheduled `date`.
    pub fn into_new_task(self, date: NaiveDate) -> NewTask {
        NewTask {
            date: format_date(date),
            title: self.title,
            comment: self.comment,
            repeat: self.repeat,
        }
    }
}
