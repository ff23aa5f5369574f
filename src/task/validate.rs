//! Field-level validation of client-submitted task records.
//!
//! Existence of the record being edited is not checked here; the store
//! reports `NotFound` for that.

use super::date::parse_date;
use super::error::ValidationError;
use super::model::{TaskDraft, TaskId, ValidTask};
use super::rule::RecurrenceRule;

/// Validate a draft for creation.
///
/// Checks run in order: title, date, repeat.
pub fn validate_for_create(draft: &TaskDraft) -> Result<ValidTask, ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    let date = if draft.date.is_empty() {
        None
    } else {
        Some(parse_date(&draft.date)?)
    };

    let rule = RecurrenceRule::parse(&draft.repeat)?;

    Ok(ValidTask {
        date,
        title: draft.title.clone(),
        comment: draft.comment.clone(),
        rule,
        repeat: draft.repeat.clone(),
    })
}

/// Validate a draft for an edit: the create checks plus a usable id.
pub fn validate_for_edit(draft: &TaskDraft) -> Result<(TaskId, ValidTask), ValidationError> {
    let id = parse_task_id(&draft.id)?;
    let task = validate_for_create(draft)?;
    Ok((id, task))
}

/// Parse a task identifier from its wire form.
pub fn parse_task_id(raw: &str) -> Result<TaskId, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingId);
    }
    raw.parse::<TaskId>()
        .map_err(|_| ValidationError::BadId(raw.to_string()))
}
