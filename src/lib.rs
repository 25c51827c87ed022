mod consts;
mod normalize;
mod prelude;
mod types;

pub use consts::*;
pub use normalize::{CanonicalDateTime, InvalidReason, RawInput, normalize};
pub use types::{CalendarFields, Granularity, GranularityArg, UnknownGranularity};

use std::cmp::Ordering;

/// The full result of one comparison: the boolean verdict, both canonical
/// operands, and both polarities of the human-readable phrase. The caller
/// picks the phrase matching the polarity of its assertion; nothing here
/// raises a failure itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    passed: bool,
    actual: Option<CanonicalDateTime>,
    expected: Option<CanonicalDateTime>,
    pass_message: String,
    fail_message: String,
    message_override: Option<String>,
}

impl Outcome {
    fn build(
        passed: bool,
        actual: Option<CanonicalDateTime>,
        expected: Option<CanonicalDateTime>,
        verb: &str,
        granularity: Option<Granularity>,
    ) -> Self {
        let suffix =
            granularity.map_or_else(String::new, |unit| format!(" (granularity: {unit})"));
        let left = render(actual.as_ref());
        let right = render(expected.as_ref());
        Self {
            passed,
            pass_message: format!("expected {left} to {verb} {right}{suffix}"),
            fail_message: format!("expected {left} not to {verb} {right}{suffix}"),
            actual,
            expected,
            message_override: None,
        }
    }

    /// Whether the comparison held
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// The normalized left operand; `None` when the argument was absent
    pub const fn actual(&self) -> Option<&CanonicalDateTime> {
        self.actual.as_ref()
    }

    /// The normalized right operand; `None` when the argument was absent
    pub const fn expected(&self) -> Option<&CanonicalDateTime> {
        self.expected.as_ref()
    }

    /// The phrase for a positive assertion ("expected A to be ... B")
    pub fn pass_message(&self) -> &str {
        &self.pass_message
    }

    /// The phrase for a negated assertion ("expected A not to be ... B")
    pub fn fail_message(&self) -> &str {
        &self.fail_message
    }

    /// The message to report when the assertion fails: the override if one
    /// was supplied, otherwise the phrase matching the assertion polarity.
    pub fn failure_message(&self, negated: bool) -> &str {
        match &self.message_override {
            Some(message) => message,
            None if negated => &self.fail_message,
            None => &self.pass_message,
        }
    }

    /// Replaces the reported failure message with caller-supplied text
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message_override = Some(message.into());
        self
    }
}

fn render(operand: Option<&CanonicalDateTime>) -> String {
    operand.map_or_else(|| MISSING_RENDERING.to_owned(), ToString::to_string)
}

fn same(
    actual: Option<&CanonicalDateTime>,
    expected: Option<&CanonicalDateTime>,
    granularity: Option<Granularity>,
) -> bool {
    match (actual, expected) {
        (Some(actual), Some(expected)) => granularity.map_or_else(
            || actual == expected,
            |unit| actual.has_same(expected, unit),
        ),
        _ => false,
    }
}

fn ordered(
    actual: Option<&CanonicalDateTime>,
    expected: Option<&CanonicalDateTime>,
    granularity: Option<Granularity>,
    wanted: Ordering,
) -> bool {
    let (Some(actual), Some(expected)) = (actual, expected) else {
        return false;
    };
    let comparison = match granularity {
        Some(unit) => actual.start_of(unit).partial_cmp(&expected.start_of(unit)),
        None => actual.partial_cmp(expected),
    };
    comparison == Some(wanted)
}

/// Compares two values for equality: same bucket of the given granularity,
/// or the exact same instant when no granularity is supplied.
pub fn same_instant(
    actual: impl Into<RawInput>,
    expected: impl Into<RawInput>,
    granularity: Option<Granularity>,
) -> Outcome {
    let actual = normalize(actual);
    let expected = normalize(expected);
    let passed = same(actual.as_ref(), expected.as_ref(), granularity);
    Outcome::build(passed, actual, expected, "be the same as", granularity)
}

/// Strict less-than on instants, or on start-of-bucket boundaries when a
/// granularity is supplied.
pub fn before(
    actual: impl Into<RawInput>,
    expected: impl Into<RawInput>,
    granularity: Option<Granularity>,
) -> Outcome {
    let actual = normalize(actual);
    let expected = normalize(expected);
    let passed = ordered(
        actual.as_ref(),
        expected.as_ref(),
        granularity,
        Ordering::Less,
    );
    Outcome::build(passed, actual, expected, "be before", granularity)
}

/// Strict greater-than on instants, or on start-of-bucket boundaries when a
/// granularity is supplied.
pub fn after(
    actual: impl Into<RawInput>,
    expected: impl Into<RawInput>,
    granularity: Option<Granularity>,
) -> Outcome {
    let actual = normalize(actual);
    let expected = normalize(expected);
    let passed = ordered(
        actual.as_ref(),
        expected.as_ref(),
        granularity,
        Ordering::Greater,
    );
    Outcome::build(passed, actual, expected, "be after", granularity)
}

/// Equality at day granularity, always: time-of-day is ignored entirely.
pub fn same_calendar_date(actual: impl Into<RawInput>, expected: impl Into<RawInput>) -> Outcome {
    let actual = normalize(actual);
    let expected = normalize(expected);
    let passed = same(actual.as_ref(), expected.as_ref(), Some(Granularity::Day));
    Outcome::build(passed, actual, expected, "be the same date as", None)
}

/// Strict less-than on start-of-day boundaries, ignoring time-of-day.
pub fn before_calendar_date(
    actual: impl Into<RawInput>,
    expected: impl Into<RawInput>,
) -> Outcome {
    let actual = normalize(actual);
    let expected = normalize(expected);
    let passed = ordered(
        actual.as_ref(),
        expected.as_ref(),
        Some(Granularity::Day),
        Ordering::Less,
    );
    Outcome::build(passed, actual, expected, "have a date before", None)
}

/// Strict greater-than on start-of-day boundaries, ignoring time-of-day.
pub fn after_calendar_date(actual: impl Into<RawInput>, expected: impl Into<RawInput>) -> Outcome {
    let actual = normalize(actual);
    let expected = normalize(expected);
    let passed = ordered(
        actual.as_ref(),
        expected.as_ref(),
        Some(Granularity::Day),
        Ordering::Greater,
    );
    Outcome::build(passed, actual, expected, "have a date after", None)
}

/// `same_instant` with the shared third-argument resolution: a recognized
/// granularity token truncates, any other text becomes the override failure
/// message and the comparison runs at full precision.
pub fn same_instant_with(
    actual: impl Into<RawInput>,
    expected: impl Into<RawInput>,
    arg: impl Into<GranularityArg>,
) -> Outcome {
    match arg.into() {
        GranularityArg::None => same_instant(actual, expected, None),
        GranularityArg::Granularity(unit) => same_instant(actual, expected, Some(unit)),
        GranularityArg::Message(message) => {
            same_instant(actual, expected, None).with_message(message)
        }
    }
}

/// `before` with the shared third-argument resolution.
pub fn before_with(
    actual: impl Into<RawInput>,
    expected: impl Into<RawInput>,
    arg: impl Into<GranularityArg>,
) -> Outcome {
    match arg.into() {
        GranularityArg::None => before(actual, expected, None),
        GranularityArg::Granularity(unit) => before(actual, expected, Some(unit)),
        GranularityArg::Message(message) => before(actual, expected, None).with_message(message),
    }
}

/// `after` with the shared third-argument resolution.
pub fn after_with(
    actual: impl Into<RawInput>,
    expected: impl Into<RawInput>,
    arg: impl Into<GranularityArg>,
) -> Outcome {
    match arg.into() {
        GranularityArg::None => after(actual, expected, None),
        GranularityArg::Granularity(unit) => after(actual, expected, Some(unit)),
        GranularityArg::Message(message) => after(actual, expected, None).with_message(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    const DATE_STRING: &str = "2020-04-21";
    const DAY_MILLIS: i64 = 1_587_427_200_000; // 2020-04-21T00:00:00Z
    const NEXT_DAY_MILLIS: i64 = 1_587_513_600_000; // 2020-04-22T00:00:00Z
    const ONE_DAY_LATER: &str = "2020-04-22";
    const ONE_DAY_BEFORE: &str = "2020-04-20";
    const ONE_YEAR_LATER: &str = "2021-04-21";
    const ONE_HOUR_LATER: &str = "2020-04-21T01:00:00Z";

    fn system_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_millis(1_587_427_200_000)
    }

    #[test]
    fn test_same_instant_for_iso_string() {
        assert!(same_instant(DATE_STRING, DATE_STRING, None).passed());
    }

    #[test]
    fn test_same_instant_for_epoch_millis() {
        assert!(same_instant(DAY_MILLIS, DAY_MILLIS, None).passed());
    }

    #[test]
    fn test_same_instant_for_calendar_fields() {
        let fields = CalendarFields::new(2020).month(3).day(21);
        assert!(same_instant(fields, fields, None).passed());
    }

    #[test]
    fn test_same_instant_for_system_time() {
        assert!(same_instant(system_time(), system_time(), None).passed());
    }

    #[test]
    fn test_same_instant_for_canonical_value() {
        let value = normalize(DATE_STRING).unwrap();
        assert!(same_instant(value.clone(), value, None).passed());
    }

    #[test]
    fn test_same_instant_across_representations() {
        assert!(same_instant(DATE_STRING, DAY_MILLIS, None).passed());
        assert!(same_instant(DAY_MILLIS, system_time(), None).passed());
        assert!(
            same_instant(DATE_STRING, CalendarFields::new(2020).month(4).day(21), None).passed()
        );
    }

    #[test]
    fn test_same_instant_fails_for_different_instants() {
        let outcome = same_instant(DATE_STRING, ONE_DAY_LATER, None);
        assert!(!outcome.passed());
        assert_eq!(
            outcome.pass_message(),
            "expected 2020-04-21T00:00:00.000Z to be the same as 2020-04-22T00:00:00.000Z"
        );
        assert_eq!(
            outcome.fail_message(),
            "expected 2020-04-21T00:00:00.000Z not to be the same as 2020-04-22T00:00:00.000Z"
        );
    }

    #[test]
    fn test_same_instant_with_month_granularity() {
        let outcome = same_instant(DAY_MILLIS, NEXT_DAY_MILLIS, Some(Granularity::Month));
        assert!(outcome.passed());
        assert_eq!(
            outcome.pass_message(),
            "expected 2020-04-21T00:00:00.000Z to be the same as \
             2020-04-22T00:00:00.000Z (granularity: month)"
        );
    }

    #[test]
    fn test_same_instant_reflexive_at_every_granularity() {
        for granularity in Granularity::ALL {
            assert!(
                same_instant(DATE_STRING, DATE_STRING, Some(granularity)).passed(),
                "reflexivity at {granularity}"
            );
        }
    }

    #[test]
    fn test_bucket_nesting_is_monotonic() {
        // Same day, different hour: equality holds at day and every
        // coarser nesting unit, not at hour.
        let morning = "2020-04-21T10:00:00Z";
        let evening = "2020-04-21T23:59:00Z";
        assert!(!same_instant(morning, evening, Some(Granularity::Hour)).passed());
        assert!(same_instant(morning, evening, Some(Granularity::Day)).passed());
        assert!(same_instant(morning, evening, Some(Granularity::Month)).passed());
        assert!(same_instant(morning, evening, Some(Granularity::Quarter)).passed());
        assert!(same_instant(morning, evening, Some(Granularity::Year)).passed());
    }

    #[test]
    fn test_before_and_after_are_strict() {
        assert!(before(DATE_STRING, ONE_DAY_LATER, None).passed());
        assert!(after(ONE_DAY_LATER, DATE_STRING, None).passed());
        assert!(!same_instant(DATE_STRING, ONE_DAY_LATER, None).passed());

        assert!(!before(DATE_STRING, DATE_STRING, None).passed());
        assert!(!after(DATE_STRING, DATE_STRING, None).passed());
    }

    #[test]
    fn test_after_true_before_false_for_later_day() {
        assert!(after(ONE_DAY_LATER, DATE_STRING, None).passed());
        assert!(!before(ONE_DAY_LATER, DATE_STRING, None).passed());
    }

    #[test]
    fn test_before_with_month_granularity() {
        assert!(before(DATE_STRING, ONE_YEAR_LATER, Some(Granularity::Month)).passed());

        // 2021-04-21 is after 2020-04-22 even truncated to month.
        assert!(!before(ONE_YEAR_LATER, ONE_DAY_LATER, Some(Granularity::Month)).passed());

        // Same month bucket: strict comparison fails in both directions.
        assert!(!before(DATE_STRING, ONE_DAY_LATER, Some(Granularity::Month)).passed());
        assert!(!after(ONE_DAY_LATER, DATE_STRING, Some(Granularity::Month)).passed());
    }

    #[test]
    fn test_after_with_month_granularity() {
        assert!(after(ONE_YEAR_LATER, DATE_STRING, Some(Granularity::Month)).passed());
        assert!(!after(DATE_STRING, ONE_YEAR_LATER, Some(Granularity::Month)).passed());
    }

    #[test]
    fn test_same_calendar_date_ignores_time_of_day() {
        assert!(same_calendar_date("2020-04-21T00:00:00Z", "2020-04-21T23:00:00Z").passed());
        assert!(same_calendar_date(DATE_STRING, ONE_HOUR_LATER).passed());
        assert!(!same_instant(DATE_STRING, ONE_HOUR_LATER, None).passed());
        assert!(!same_calendar_date(DATE_STRING, ONE_DAY_LATER).passed());
    }

    #[test]
    fn test_same_calendar_date_message_wording() {
        let outcome = same_calendar_date(DATE_STRING, ONE_DAY_LATER);
        assert_eq!(
            outcome.pass_message(),
            "expected 2020-04-21T00:00:00.000Z to be the same date as 2020-04-22T00:00:00.000Z"
        );
    }

    #[test]
    fn test_before_calendar_date() {
        assert!(before_calendar_date("2020-04-20T23:59:00Z", DATE_STRING).passed());
        assert!(before_calendar_date(ONE_DAY_BEFORE, ONE_HOUR_LATER).passed());

        // Same calendar day, so neither direction holds.
        assert!(!before_calendar_date(DATE_STRING, ONE_HOUR_LATER).passed());
        assert!(!after_calendar_date(ONE_HOUR_LATER, DATE_STRING).passed());
    }

    #[test]
    fn test_after_calendar_date() {
        let outcome = after_calendar_date(ONE_HOUR_LATER, ONE_DAY_BEFORE);
        assert!(outcome.passed());
        assert_eq!(
            outcome.fail_message(),
            "expected 2020-04-21T01:00:00.000Z not to have a date after 2020-04-20T00:00:00.000Z"
        );
        assert!(!after_calendar_date(ONE_DAY_BEFORE, ONE_HOUR_LATER).passed());
    }

    #[test]
    fn test_week_granularity() {
        // 2020-04-20 is a Monday, 2020-04-21 a Tuesday, 2020-04-19 a Sunday.
        assert!(same_instant(DATE_STRING, ONE_DAY_BEFORE, Some(Granularity::Week)).passed());
        assert!(!same_instant(DATE_STRING, "2020-04-19", Some(Granularity::Week)).passed());
        assert!(before("2020-04-19", DATE_STRING, Some(Granularity::Week)).passed());
    }

    #[test]
    fn test_quarter_granularity() {
        assert!(same_instant("2020-04-01", "2020-06-30", Some(Granularity::Quarter)).passed());
        assert!(!same_instant("2020-03-31", "2020-04-01", Some(Granularity::Quarter)).passed());
        assert!(after("2020-04-01", "2020-03-31", Some(Granularity::Quarter)).passed());
    }

    #[test]
    fn test_granularity_token_resolution_truncates() {
        assert!(same_instant_with(DAY_MILLIS, NEXT_DAY_MILLIS, "month").passed());
        assert!(before_with(DATE_STRING, ONE_YEAR_LATER, "month").passed());
        assert!(after_with(ONE_YEAR_LATER, DATE_STRING, "month").passed());
    }

    #[test]
    fn test_unknown_token_becomes_override_message() {
        let outcome = same_instant_with(DAY_MILLIS, NEXT_DAY_MILLIS, "DateTimes are not the same");
        // Full precision now, so the day-apart operands differ.
        assert!(!outcome.passed());
        assert_eq!(outcome.failure_message(false), "DateTimes are not the same");
        assert_eq!(outcome.failure_message(true), "DateTimes are not the same");
    }

    #[test]
    fn test_override_message_on_ordering_predicates() {
        let outcome = before_with(ONE_DAY_LATER, DATE_STRING, "DateTime is not before expected");
        assert!(!outcome.passed());
        assert_eq!(
            outcome.failure_message(false),
            "DateTime is not before expected"
        );

        let outcome = after_with(DATE_STRING, ONE_DAY_LATER, "DateTime is not after expected");
        assert!(!outcome.passed());
        assert_eq!(
            outcome.failure_message(false),
            "DateTime is not after expected"
        );
    }

    #[test]
    fn test_failure_message_polarity_without_override() {
        let outcome = same_instant(DATE_STRING, ONE_DAY_LATER, None);
        assert_eq!(outcome.failure_message(false), outcome.pass_message());
        assert_eq!(outcome.failure_message(true), outcome.fail_message());
    }

    #[test]
    fn test_absent_operand_never_passes() {
        let outcome = same_instant(None::<&str>, DATE_STRING, None);
        assert!(!outcome.passed());
        assert!(outcome.actual().is_none());
        assert_eq!(
            outcome.pass_message(),
            "expected missing value to be the same as 2020-04-21T00:00:00.000Z"
        );

        assert!(!before(DATE_STRING, None::<&str>, None).passed());
        assert!(!after(None::<&str>, None::<&str>, None).passed());
        assert!(!same_calendar_date(None::<&str>, DATE_STRING).passed());
    }

    #[test]
    fn test_invalid_operand_never_passes() {
        let outcome = same_instant("not-a-date", DATE_STRING, None);
        assert!(!outcome.passed());
        assert_eq!(
            outcome.pass_message(),
            "expected Invalid DateTime to be the same as 2020-04-21T00:00:00.000Z"
        );

        assert!(!before("not-a-date", DATE_STRING, None).passed());
        assert!(!after("not-a-date", DATE_STRING, None).passed());
        assert!(!before_calendar_date("not-a-date", DATE_STRING).passed());
        assert!(!after_calendar_date("not-a-date", DATE_STRING).passed());
    }

    #[test]
    fn test_invalid_against_invalid_is_false() {
        assert!(!same_instant("not-a-date", "not-a-date", None).passed());
        assert!(!same_instant("not-a-date", "not-a-date", Some(Granularity::Day)).passed());
        assert!(!same_calendar_date("not-a-date", "not-a-date").passed());
        assert!(!before("not-a-date", "not-a-date", None).passed());
        assert!(!after("not-a-date", "not-a-date", None).passed());
        assert!(!before_calendar_date("not-a-date", "not-a-date").passed());
    }

    #[test]
    fn test_outcome_exposes_canonical_operands() {
        let outcome = same_instant(DATE_STRING, DAY_MILLIS, None);
        assert!(outcome.passed());
        let actual = outcome.actual().and_then(CanonicalDateTime::instant);
        let expected = outcome.expected().and_then(CanonicalDateTime::instant);
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_with_message_replaces_failure_text() {
        let outcome =
            same_calendar_date(DATE_STRING, ONE_DAY_LATER).with_message("dates should match");
        assert_eq!(outcome.failure_message(false), "dates should match");
        assert_eq!(outcome.failure_message(true), "dates should match");
        // The underlying phrases are still available to the caller.
        assert_eq!(
            outcome.pass_message(),
            "expected 2020-04-21T00:00:00.000Z to be the same date as 2020-04-22T00:00:00.000Z"
        );
    }
}
