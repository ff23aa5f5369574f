//! Recurrence rules and next-occurrence computation.
//!
//! # Grammar
//! ```text
//! ""              -> None               (one-shot task)
//! "y"             -> Yearly
//! "d <n>"         -> EveryNDays(n)      1 <= n <= 400
//! "d <n>,<m>,..." -> EveryNDaysMultiSelect  (feature `multi-day-rules`)
//! ```
//!
//! # Boundary
//! Stepping starts at the anchor and continues while the candidate is
//! *before* the reference date. The first candidate that is not before the
//! reference is returned, so a candidate equal to the reference is accepted
//! and an anchor at or after the reference comes back unchanged.

use std::fmt;
use std::num::IntErrorKind;

use chrono::{Days, NaiveDate};

use super::date::{add_years, is_representable};
use super::error::RuleError;

/// Largest accepted day interval.
pub const MAX_DAY_INTERVAL: u32 = 400;

/// A parsed `repeat` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// Empty rule: the task happens once.
    #[default]
    None,
    /// Same calendar day every year.
    Yearly,
    /// Every `n` days from the anchor.
    EveryNDays(u32),
    /// Several day intervals from the same anchor; the earliest wins.
    /// Intervals are sorted and deduplicated.
    EveryNDaysMultiSelect(Vec<u32>),
}

impl RecurrenceRule {
    /// Parse rule text. The empty string is the one-shot rule.
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        if text.is_empty() {
            return Ok(Self::None);
        }
        if text == "y" {
            return Ok(Self::Yearly);
        }
        let Some(body) = text.strip_prefix("d ") else {
            return Err(RuleError::InvalidRuleSyntax(text.to_string()));
        };
        if body.contains(',') {
            return parse_multi(body, text);
        }
        parse_interval(body, text).map(Self::EveryNDays)
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// First occurrence reachable from `anchor` that is not before `reference`.
    ///
    /// Returns `Ok(None)` for the one-shot rule and
    /// [`RuleError::BeyondLastDate`] when the occurrence is past year 9999.
    ///
    /// # Postcondition
    /// `result >= reference` and `result >= anchor`.
    pub fn advance(
        &self,
        reference: NaiveDate,
        anchor: NaiveDate,
    ) -> Result<Option<NaiveDate>, RuleError> {
        let next = match self {
            Self::None => return Ok(None),
            Self::Yearly => {
                // Chained one year at a time so a Feb 29 anchor keeps the
                // Mar 1 it normalised to.
                let mut candidate = anchor;
                while candidate < reference {
                    candidate = add_years(candidate, 1);
                }
                candidate
            }
            Self::EveryNDays(n) => step_days(reference, anchor, *n),
            Self::EveryNDaysMultiSelect(intervals) => {
                let Some(earliest) = intervals
                    .iter()
                    .map(|n| step_days(reference, anchor, *n))
                    .min()
                else {
                    return Ok(None);
                };
                earliest
            }
        };
        if !is_representable(next) {
            return Err(RuleError::BeyondLastDate);
        }
        Ok(Some(next))
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Yearly => write!(f, "y"),
            Self::EveryNDays(n) => write!(f, "d {}", n),
            Self::EveryNDaysMultiSelect(intervals) => {
                let joined: Vec<String> = intervals.iter().map(|n| n.to_string()).collect();
                write!(f, "d {}", joined.join(","))
            }
        }
    }
}

/// Compute the next occurrence of `rule` from `anchor`, not before `reference`.
///
/// Recurrence only makes sense for repeating tasks: the empty rule is an
/// error here, callers handle one-shot tasks before calling.
pub fn next_occurrence(
    reference: NaiveDate,
    anchor: NaiveDate,
    rule: &str,
) -> Result<NaiveDate, RuleError> {
    if rule.is_empty() {
        return Err(RuleError::EmptyRule);
    }
    RecurrenceRule::parse(rule)?
        .advance(reference, anchor)?
        .ok_or(RuleError::EmptyRule)
}

/// Smallest `anchor + k * n` (k >= 0) that is not before `reference`.
fn step_days(reference: NaiveDate, anchor: NaiveDate, n: u32) -> NaiveDate {
    if anchor >= reference {
        return anchor;
    }
    let gap = (reference - anchor).num_days().unsigned_abs();
    let n = u64::from(n.max(1));
    let steps = gap.div_ceil(n);
    match steps.checked_mul(n) {
        Some(total) => anchor.checked_add_days(Days::new(total)).unwrap_or(NaiveDate::MAX),
        None => NaiveDate::MAX,
    }
}

fn parse_interval(piece: &str, text: &str) -> Result<u32, RuleError> {
    // `i64::from_str` takes a leading '+', the grammar does not.
    if piece.starts_with('+') {
        return Err(RuleError::InvalidRuleSyntax(text.to_string()));
    }
    let value = match piece.parse::<i64>() {
        Ok(v) => v,
        Err(e) => {
            return Err(match e.kind() {
                IntErrorKind::PosOverflow => RuleError::IntervalOutOfRange(i64::MAX),
                IntErrorKind::NegOverflow => RuleError::IntervalOutOfRange(i64::MIN),
                _ => RuleError::InvalidRuleSyntax(text.to_string()),
            })
        }
    };
    if !(1..=i64::from(MAX_DAY_INTERVAL)).contains(&value) {
        return Err(RuleError::IntervalOutOfRange(value));
    }
    // In range, so the narrowing cannot fail.
    u32::try_from(value).map_err(|_| RuleError::IntervalOutOfRange(value))
}

#[cfg(feature = "multi-day-rules")]
fn parse_multi(body: &str, text: &str) -> Result<RecurrenceRule, RuleError> {
    let mut intervals = body
        .split(',')
        .map(|piece| parse_interval(piece, text))
        .collect::<Result<Vec<_>, _>>()?;
    intervals.sort_unstable();
    intervals.dedup();
    Ok(RecurrenceRule::EveryNDaysMultiSelect(intervals))
}

#[cfg(not(feature = "multi-day-rules"))]
fn parse_multi(_body: &str, text: &str) -> Result<RecurrenceRule, RuleError> {
    Err(RuleError::InvalidRuleSyntax(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::date::{add_days, format_date, parse_date};

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn next(reference: &str, anchor: &str, rule: &str) -> Result<String, RuleError> {
        next_occurrence(d(reference), d(anchor), rule).map(format_date)
    }

    #[test]
    fn day_interval_lands_on_first_step_past_reference() {
        assert_eq!(next("20240110", "20240108", "d 10").unwrap(), "20240118");
    }

    #[test]
    fn yearly_skips_to_next_anniversary() {
        assert_eq!(next("20240701", "20240102", "y").unwrap(), "20250102");
        assert_eq!(next("20240126", "16890220", "y").unwrap(), "20240220");
    }

    /// A candidate equal to the reference is accepted (not-before, not
    /// strictly-after).
    #[test]
    fn candidate_equal_to_reference_is_returned() {
        assert_eq!(next("20240101", "20240101", "d 1").unwrap(), "20240101");
        assert_eq!(next("20240111", "20240101", "d 5").unwrap(), "20240111");
        assert_eq!(next("20250102", "20240102", "y").unwrap(), "20250102");
    }

    #[test]
    fn future_anchor_is_returned_unchanged() {
        assert_eq!(next("20240101", "20240315", "d 7").unwrap(), "20240315");
        assert_eq!(next("20240101", "20240315", "y").unwrap(), "20240315");
    }

    #[test]
    fn yearly_leap_day_rolls_to_march() {
        assert_eq!(next("20240301", "20240229", "y").unwrap(), "20250301");
        // Once normalised, the chain stays on Mar 1.
        assert_eq!(next("20280101", "20240229", "y").unwrap(), "20280301");
    }

    #[test]
    fn empty_rule_is_rejected() {
        assert_eq!(next("20240101", "20240101", ""), Err(RuleError::EmptyRule));
        assert_eq!(next("19000101", "20991231", ""), Err(RuleError::EmptyRule));
    }

    #[test]
    fn interval_bounds() {
        assert_eq!(next("20240101", "20240101", "d 0"), Err(RuleError::IntervalOutOfRange(0)));
        assert_eq!(next("20240101", "20240101", "d 401"), Err(RuleError::IntervalOutOfRange(401)));
        assert_eq!(next("20240101", "20240101", "d -3"), Err(RuleError::IntervalOutOfRange(-3)));
        assert!(matches!(
            next("20240101", "20240101", "d 99999999999999999999"),
            Err(RuleError::IntervalOutOfRange(_))
        ));
        assert!(next("20240105", "20240101", "d 1").is_ok());
        assert!(next("20240105", "20240101", "d 400").is_ok());
    }

    #[test]
    fn unknown_grammar_is_a_syntax_error() {
        for rule in ["k 2", "foo", "d", "d ", "d x", "d 5 ", " y", "y 1", "w 1", "m 1", "d  5", "D 5", "d +5", "d 3,+5"] {
            assert!(
                matches!(next("20240101", "20240101", rule), Err(RuleError::InvalidRuleSyntax(_))),
                "{rule:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn day_rule_result_is_a_multiple_of_the_interval() {
        let anchor = d("20230115");
        for n in [1u32, 2, 3, 7, 30, 31, 365, 400] {
            let rule = format!("d {}", n);
            for offset in 0..800u32 {
                let reference = add_days(anchor, offset);
                let result = next_occurrence(reference, anchor, &rule).unwrap();
                assert!(result >= reference);
                let diff = (result - anchor).num_days();
                assert_eq!(diff % i64::from(n), 0, "rule {rule}, offset {offset}");
                // The previous step is before the reference.
                if diff > 0 {
                    assert!(result - chrono::Duration::days(i64::from(n)) < reference);
                }
            }
        }
    }

    #[test]
    fn yearly_result_is_whole_years_from_anchor() {
        let anchor = d("20190614");
        for offset in 0..3000u32 {
            let reference = add_days(anchor, offset);
            let result = next_occurrence(reference, anchor, "y").unwrap();
            assert!(result >= reference);
            assert_eq!(result.format("%m%d").to_string(), "0614");
        }
    }

    #[test]
    fn feeding_result_back_as_anchor_progresses() {
        let today = d("20240110");
        let anchor = d("20231201");
        for rule in ["d 1", "d 3", "y"] {
            let parsed = RecurrenceRule::parse(rule).unwrap();
            let first = parsed.advance(today, anchor).unwrap().unwrap();
            let second = parsed.advance(add_days(first, 1), first).unwrap().unwrap();
            assert!(second > first, "{rule}: {first} -> {second}");
        }
    }

    #[test]
    fn occurrences_past_year_9999_are_rejected() {
        assert_eq!(next("99991201", "99990601", "y"), Err(RuleError::BeyondLastDate));
        assert_eq!(next("99991231", "99991230", "d 2"), Err(RuleError::BeyondLastDate));
        assert_eq!(next("99991231", "99991230", "d 1").unwrap(), "99991231");
        assert_eq!(next("99991231", "99990601", "d 1").unwrap(), "99991231");
        // One 400-day step from June lands in year 10000.
        assert_eq!(next("99991201", "99990601", "d 400"), Err(RuleError::BeyondLastDate));
    }

    #[test]
    fn display_round_trips_canonical_text() {
        for text in ["", "y", "d 1", "d 400"] {
            assert_eq!(RecurrenceRule::parse(text).unwrap().to_string(), text);
        }
    }

    #[cfg(feature = "multi-day-rules")]
    #[test]
    fn multi_day_list_takes_earliest_candidate() {
        let rule = RecurrenceRule::parse("d 10,3,3").unwrap();
        assert_eq!(rule, RecurrenceRule::EveryNDaysMultiSelect(vec![3, 10]));
        assert_eq!(rule.to_string(), "d 3,10");

        // d 3 reaches 20240110 exactly, d 10 only 20240111.
        assert_eq!(next("20240110", "20240101", "d 3,10").unwrap(), "20240110");
        assert_eq!(next("20240112", "20240101", "d 7,5").unwrap(), "20240115");
        assert_eq!(next("20240112", "20240101", "d 5,7").unwrap(), "20240115");
    }

    #[cfg(feature = "multi-day-rules")]
    #[test]
    fn multi_day_list_validates_every_interval() {
        assert_eq!(
            RecurrenceRule::parse("d 3,401"),
            Err(RuleError::IntervalOutOfRange(401))
        );
        assert!(matches!(
            RecurrenceRule::parse("d 3,"),
            Err(RuleError::InvalidRuleSyntax(_))
        ));
    }

    #[cfg(not(feature = "multi-day-rules"))]
    #[test]
    fn multi_day_list_requires_feature() {
        assert!(matches!(
            RecurrenceRule::parse("d 3,10"),
            Err(RuleError::InvalidRuleSyntax(_))
        ));
    }
}
