//! Scheduling decisions for task creation, edits and completion.
//!
//! # State Machine
//! ```text
//! [no repeat]  --complete--> (deleted)
//! [has repeat] --complete--> [has repeat, date = next occurrence]
//! ```
//! A task only loses its rule through an explicit edit.
//!
//! Everything here is pure: "today" is always an argument.

use std::cmp::max;

use chrono::NaiveDate;

use super::date::{add_days, parse_date};
use super::error::{RuleError, ValidationError};
use super::model::{Task, ValidTask};
use super::rule::RecurrenceRule;

/// Result of marking a task done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// One-shot task, remove it.
    Delete,
    /// Recurring task, move it to this date.
    Reschedule(NaiveDate),
}

/// The scheduling-relevant part of a stored task, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSchedule {
    pub date: NaiveDate,
    pub rule: RecurrenceRule,
}

impl StoredSchedule {
    /// Parse the date and rule of a stored record.
    ///
    /// Stored records were validated on write, so an error here means the
    /// storage invariant is broken.
    pub fn from_task(task: &Task) -> Result<Self, ValidationError> {
        Ok(Self {
            date: parse_date(&task.date)?,
            rule: RecurrenceRule::parse(&task.repeat)?,
        })
    }
}

/// Date a newly created task is stored with.
///
/// - no date: today
/// - past date, one-shot: today
/// - past date, recurring: next occurrence not before today
/// - today or later: unchanged
///
/// Fails only when the next occurrence is past year 9999.
pub fn schedule_on_create(today: NaiveDate, task: &ValidTask) -> Result<NaiveDate, RuleError> {
    let date = task.date.unwrap_or(today);
    if date >= today {
        return Ok(date);
    }
    Ok(task.rule.advance(today, date)?.unwrap_or(today))
}

/// Date an edited task is stored with. Edits replace fields verbatim; only a
/// missing date is filled in.
pub fn schedule_on_edit(today: NaiveDate, task: &ValidTask) -> NaiveDate {
    task.date.unwrap_or(today)
}

/// Decide what marking a task done does.
///
/// # Postcondition
/// `Reschedule(d)` implies `d >= today` and `d > schedule.date`, so
/// completing the same task repeatedly always moves it forward. For a stored
/// date before today, `d` is the next occurrence not before today.
///
/// A recurring task whose next occurrence is past year 9999 cannot be
/// rescheduled and yields [`RuleError::BeyondLastDate`].
pub fn complete_task(today: NaiveDate, schedule: &StoredSchedule) -> Result<Completion, RuleError> {
    let reference = max(today, add_days(schedule.date, 1));
    Ok(match schedule.rule.advance(reference, schedule.date)? {
        Some(next) => Completion::Reschedule(next),
        None => Completion::Delete,
    })
}

/// A task is overdue once its date is strictly before today.
pub fn is_overdue(today: NaiveDate, date: NaiveDate) -> bool {
    date < today
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::date::format_date;
    use crate::task::rule::next_occurrence;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn valid(date: &str, repeat: &str) -> ValidTask {
        ValidTask {
            date: if date.is_empty() { None } else { Some(d(date)) },
            title: "Title".to_string(),
            comment: String::new(),
            rule: RecurrenceRule::parse(repeat).unwrap(),
            repeat: repeat.to_string(),
        }
    }

    fn schedule(date: &str, repeat: &str) -> StoredSchedule {
        StoredSchedule {
            date: d(date),
            rule: RecurrenceRule::parse(repeat).unwrap(),
        }
    }

    #[test]
    fn create_without_date_uses_today() {
        let today = d("20240201");
        assert_eq!(format_date(schedule_on_create(today, &valid("", "")).unwrap()), "20240201");
        assert_eq!(format_date(schedule_on_create(today, &valid("", "d 5")).unwrap()), "20240201");
    }

    #[test]
    fn create_past_one_shot_snaps_to_today() {
        let today = d("20240201");
        assert_eq!(format_date(schedule_on_create(today, &valid("20231220", "")).unwrap()), "20240201");
    }

    #[test]
    fn create_past_recurring_advances() {
        let today = d("20240201");
        assert_eq!(format_date(schedule_on_create(today, &valid("20240102", "y")).unwrap()), "20250102");
        assert_eq!(format_date(schedule_on_create(today, &valid("20240125", "d 7")).unwrap()), "20240201");
        assert_eq!(format_date(schedule_on_create(today, &valid("20240125", "d 5")).unwrap()), "20240204");
    }

    #[test]
    fn create_future_date_is_kept() {
        let today = d("20240201");
        assert_eq!(format_date(schedule_on_create(today, &valid("20240301", "d 3")).unwrap()), "20240301");
        assert_eq!(format_date(schedule_on_create(today, &valid("20240201", "")).unwrap()), "20240201");
    }

    #[test]
    fn edit_keeps_past_dates() {
        let today = d("20240201");
        assert_eq!(format_date(schedule_on_edit(today, &valid("20230101", "y"))), "20230101");
        assert_eq!(format_date(schedule_on_edit(today, &valid("", "y"))), "20240201");
    }

    #[test]
    fn completing_one_shot_deletes() {
        let today = d("20240201");
        for date in ["20230101", "20240201", "20250101"] {
            assert_eq!(complete_task(today, &schedule(date, "")).unwrap(), Completion::Delete);
        }
    }

    #[test]
    fn completing_past_recurring_matches_next_occurrence() {
        let today = d("20240201");
        for (date, repeat) in [("20240101", "d 3"), ("20230615", "y"), ("20240125", "d 7")] {
            let expected = next_occurrence(today, d(date), repeat).unwrap();
            assert_eq!(
                complete_task(today, &schedule(date, repeat)).unwrap(),
                Completion::Reschedule(expected)
            );
        }
    }

    #[test]
    fn completing_current_or_future_recurring_moves_one_step() {
        let today = d("20240201");
        assert_eq!(
            complete_task(today, &schedule("20240201", "d 1")).unwrap(),
            Completion::Reschedule(d("20240202"))
        );
        assert_eq!(
            complete_task(today, &schedule("20240301", "d 10")).unwrap(),
            Completion::Reschedule(d("20240311"))
        );
        assert_eq!(
            complete_task(today, &schedule("20240201", "y")).unwrap(),
            Completion::Reschedule(d("20250201"))
        );
    }

    #[test]
    fn repeated_completion_never_stalls() {
        let today = d("20240201");
        let mut current = schedule("20240115", "d 2");
        for _ in 0..20 {
            let Completion::Reschedule(next) = complete_task(today, &current).unwrap() else {
                panic!("recurring task deleted");
            };
            assert!(next >= today);
            assert!(next > current.date);
            current.date = next;
        }
    }

    #[test]
    fn completion_past_year_9999_is_an_error() {
        let today = d("20240201");
        assert_eq!(
            complete_task(today, &schedule("99991231", "d 1")),
            Err(RuleError::BeyondLastDate)
        );
        assert_eq!(
            complete_task(today, &schedule("99990601", "y")),
            Err(RuleError::BeyondLastDate)
        );
        assert_eq!(
            complete_task(today, &schedule("99991230", "d 1")),
            Ok(Completion::Reschedule(d("99991231")))
        );
        // One-shot tasks are still just deleted.
        assert_eq!(complete_task(today, &schedule("99991231", "")), Ok(Completion::Delete));
    }

    #[test]
    fn create_past_year_9999_is_an_error() {
        let today = d("99991201");
        assert_eq!(
            schedule_on_create(today, &valid("99990601", "y")),
            Err(RuleError::BeyondLastDate)
        );
        assert_eq!(
            schedule_on_create(today, &valid("99991231", "d 1")),
            Ok(d("99991231"))
        );
    }

    #[test]
    fn stored_schedule_rejects_corrupt_records() {
        let mut task = Task {
            id: 1,
            date: "20240101".to_string(),
            title: "t".to_string(),
            comment: String::new(),
            repeat: "w 1".to_string(),
        };
        assert!(StoredSchedule::from_task(&task).is_err());
        task.repeat = "d 2".to_string();
        task.date = "2024-01-01".to_string();
        assert!(StoredSchedule::from_task(&task).is_err());
        task.date = "20240101".to_string();
        assert_eq!(StoredSchedule::from_task(&task).unwrap(), schedule("20240101", "d 2"));
    }

    #[test]
    fn overdue_is_strict() {
        let today = d("20240201");
        assert!(is_overdue(today, d("20240131")));
        assert!(!is_overdue(today, today));
        assert!(!is_overdue(today, d("20240202")));
    }
}
