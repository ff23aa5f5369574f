//! Error types for the scheduling core.

/// A date string that is not a valid `YYYYMMDD` calendar date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date '{input}': expected YYYYMMDD")]
pub struct DateFormatError {
    pub input: String,
}

impl DateFormatError {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Errors produced while parsing or applying a recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("empty recurrence rule")]
    EmptyRule,

    #[error("unsupported recurrence rule '{0}'")]
    InvalidRuleSyntax(String),

    #[error("day interval {0} is out of range 1..=400")]
    IntervalOutOfRange(i64),

    /// The next occurrence has no `YYYYMMDD` form.
    #[error("next occurrence falls after 99991231")]
    BeyondLastDate,
}

/// Field-level validation failures for a task record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("task title is required")]
    MissingTitle,

    #[error("task identifier is required")]
    MissingId,

    #[error("invalid task identifier '{0}'")]
    BadId(String),

    #[error(transparent)]
    BadDateFormat(#[from] DateFormatError),

    #[error("invalid repeat rule: {0}")]
    BadRuleFormat(RuleError),

    #[error("invalid repeat rule: day interval {0} is out of range 1..=400")]
    IntervalOutOfRange(i64),

    #[error("task cannot be scheduled after 99991231")]
    BeyondLastDate,
}

impl From<RuleError> for ValidationError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::IntervalOutOfRange(n) => ValidationError::IntervalOutOfRange(n),
            RuleError::BeyondLastDate => ValidationError::BeyondLastDate,
            other => ValidationError::BadRuleFormat(other),
        }
    }
}
