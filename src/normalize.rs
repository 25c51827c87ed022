use crate::consts::{
    DATE_FORMAT, INSTANT_FORMAT, INVALID_RENDERING, MAX_MILLISECOND, MONTHS_PER_QUARTER,
    MONTH_WIDTH, NAIVE_DATETIME_FORMATS, NANOS_PER_MILLI, YEAR_WIDTH,
};
use crate::types::{CalendarFields, Granularity};
use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc, Weekday,
};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::time::SystemTime;

/// Why a raw input failed to resolve to a real instant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    /// Text that none of the accepted ISO-8601 shapes match.
    #[error("Unparsable ISO-8601 text: {0}")]
    Unparsable(String),

    /// Epoch milliseconds outside the representable instant range.
    #[error("Epoch milliseconds out of range: {0}")]
    MillisOutOfRange(i64),

    /// A field record naming a date or time that does not exist.
    #[error("Calendar fields do not name a real instant: {0:?}")]
    FieldsOutOfRange(CalendarFields),
}

/// The single representation every input shape is converted to before
/// comparison: either a UTC instant, or the invalid sentinel.
///
/// Equality and ordering follow the invalid-instant convention of the
/// underlying date library: an invalid value compares false to everything,
/// itself included, so `PartialEq`/`PartialOrd` are implemented without
/// `Eq`/`Ord` and `partial_cmp` returns `None` whenever either side is
/// invalid.
#[derive(Debug, Clone)]
pub enum CanonicalDateTime {
    /// A resolved, timezone-aware instant.
    Instant(DateTime<Utc>),
    /// The invalid sentinel; every comparison involving it is false.
    Invalid(InvalidReason),
}

impl CanonicalDateTime {
    /// Returns the instant, unless this value is invalid
    pub const fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(instant) => Some(*instant),
            Self::Invalid(_) => None,
        }
    }

    /// Returns true when this value resolved to a real instant
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Instant(_))
    }

    /// Returns the failure reason, if this value is invalid
    pub const fn invalid_reason(&self) -> Option<&InvalidReason> {
        match self {
            Self::Instant(_) => None,
            Self::Invalid(reason) => Some(reason),
        }
    }

    /// Floors this value to the start of the bucket containing it at the
    /// given granularity. Week buckets start on Monday. Invalid values
    /// floor to themselves.
    pub fn start_of(&self, granularity: Granularity) -> Self {
        match self {
            Self::Instant(instant) => {
                floor_instant(*instant, granularity).map_or_else(|| self.clone(), Self::Instant)
            }
            Self::Invalid(_) => self.clone(),
        }
    }

    /// Returns true when both values fall in the same bucket of the given
    /// granularity. False if either side is invalid.
    pub fn has_same(&self, other: &Self, granularity: Granularity) -> bool {
        self.start_of(granularity) == other.start_of(granularity)
    }
}

impl PartialEq for CanonicalDateTime {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Instant(left), Self::Instant(right)) => left == right,
            _ => false,
        }
    }
}

impl PartialOrd for CanonicalDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Instant(left), Self::Instant(right)) => left.partial_cmp(right),
            _ => None,
        }
    }
}

impl fmt::Display for CanonicalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant(instant) => write!(f, "{}", instant.format(INSTANT_FORMAT)),
            Self::Invalid(_) => f.write_str(INVALID_RENDERING),
        }
    }
}

impl From<DateTime<Utc>> for CanonicalDateTime {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

impl serde::Serialize for CanonicalDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CanonicalDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(parse_iso(&text))
    }
}

/// A raw comparison operand, one variant per supported input shape.
/// `Absent` stands for an argument that was never supplied; it is not a
/// valid operand and exists so misuse surfaces as a failed comparison
/// instead of a panic.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// No value supplied.
    Absent,
    /// ISO-8601 text, parsed during normalization.
    Iso(String),
    /// Milliseconds since the Unix epoch, UTC.
    EpochMillis(i64),
    /// An already-normalized value, passed through unchanged.
    Canonical(CanonicalDateTime),
    /// The platform's native instant type, converted exactly.
    Native(SystemTime),
    /// A plain calendar-field record.
    Fields(CalendarFields),
}

impl From<&str> for RawInput {
    fn from(text: &str) -> Self {
        Self::Iso(text.to_owned())
    }
}

impl From<String> for RawInput {
    fn from(text: String) -> Self {
        Self::Iso(text)
    }
}

impl From<i64> for RawInput {
    fn from(millis: i64) -> Self {
        Self::EpochMillis(millis)
    }
}

impl From<CanonicalDateTime> for RawInput {
    fn from(value: CanonicalDateTime) -> Self {
        Self::Canonical(value)
    }
}

impl From<DateTime<Utc>> for RawInput {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Canonical(CanonicalDateTime::Instant(instant))
    }
}

impl From<SystemTime> for RawInput {
    fn from(stamp: SystemTime) -> Self {
        Self::Native(stamp)
    }
}

impl From<CalendarFields> for RawInput {
    fn from(fields: CalendarFields) -> Self {
        Self::Fields(fields)
    }
}

impl<T: Into<RawInput>> From<Option<T>> for RawInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl serde::Serialize for RawInput {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Iso(text) => serializer.serialize_str(text),
            Self::EpochMillis(millis) => serializer.serialize_i64(*millis),
            Self::Canonical(value) => value.serialize(serializer),
            Self::Native(stamp) => {
                CanonicalDateTime::Instant(DateTime::from(*stamp)).serialize(serializer)
            }
            Self::Fields(fields) => fields.serialize(serializer),
        }
    }
}

impl<'de> serde::Deserialize<'de> for RawInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct RawInputVisitor;

        impl<'de> serde::de::Visitor<'de> for RawInputVisitor {
            type Value = RawInput;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an ISO-8601 string, epoch milliseconds, a calendar-field map, or null")
            }

            fn visit_str<E>(self, text: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawInput::Iso(text.to_owned()))
            }

            fn visit_string<E>(self, text: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawInput::Iso(text))
            }

            fn visit_i64<E>(self, millis: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawInput::EpochMillis(millis))
            }

            fn visit_u64<E>(self, millis: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(millis)
                    .map(RawInput::EpochMillis)
                    .map_err(|_| E::custom("epoch milliseconds out of range"))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawInput::Absent)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(RawInput::Absent)
            }

            fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
            where
                D2: serde::Deserializer<'de>,
            {
                RawInput::deserialize(deserializer)
            }

            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                CalendarFields::deserialize(serde::de::value::MapAccessDeserializer::new(map))
                    .map(RawInput::Fields)
            }
        }

        deserializer.deserialize_any(RawInputVisitor)
    }
}

/// Converts any supported input shape to its canonical value, or `None`
/// for an absent input. Dispatch follows a fixed priority: absent, ISO
/// text, epoch milliseconds, already-canonical (returned unchanged),
/// native instant, calendar fields.
///
/// Never fails: text and field records that do not resolve become
/// `CanonicalDateTime::Invalid` rather than an error.
pub fn normalize(input: impl Into<RawInput>) -> Option<CanonicalDateTime> {
    match input.into() {
        RawInput::Absent => None,
        RawInput::Iso(text) => Some(parse_iso(&text)),
        RawInput::EpochMillis(millis) => Some(from_epoch_millis(millis)),
        RawInput::Canonical(value) => Some(value),
        RawInput::Native(stamp) => Some(CanonicalDateTime::Instant(DateTime::from(stamp))),
        RawInput::Fields(fields) => Some(from_fields(fields)),
    }
}

/// ISO-8601 cascade: RFC 3339 with offset first, then naive datetime
/// shapes read as UTC, then the reduced-precision calendar forms.
fn parse_iso(text: &str) -> CanonicalDateTime {
    let trimmed = text.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return CanonicalDateTime::Instant(instant.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return CanonicalDateTime::Instant(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return CanonicalDateTime::Instant(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    if let Some(date) = parse_reduced_precision(trimmed) {
        return CanonicalDateTime::Instant(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    CanonicalDateTime::Invalid(InvalidReason::Unparsable(text.to_owned()))
}

/// Accepts the zero-padded reduced-precision forms `YYYY-MM` and `YYYY`,
/// resolved to the start of the unit.
fn parse_reduced_precision(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(year), Some(month), None) => {
            if year.len() != YEAR_WIDTH || month.len() != MONTH_WIDTH {
                return None;
            }
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        (Some(year), None, None) => {
            if year.len() != YEAR_WIDTH {
                return None;
            }
            NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1)
        }
        _ => None,
    }
}

fn from_epoch_millis(millis: i64) -> CanonicalDateTime {
    Utc.timestamp_millis_opt(millis).single().map_or(
        CanonicalDateTime::Invalid(InvalidReason::MillisOutOfRange(millis)),
        CanonicalDateTime::Instant,
    )
}

/// Resolves a field record with start-of-unit defaults for everything the
/// caller left out.
fn from_fields(fields: CalendarFields) -> CanonicalDateTime {
    let millisecond = fields.millisecond.unwrap_or(0);
    if millisecond > MAX_MILLISECOND {
        return CanonicalDateTime::Invalid(InvalidReason::FieldsOutOfRange(fields));
    }

    let date = NaiveDate::from_ymd_opt(
        fields.year,
        fields.month.unwrap_or(1),
        fields.day.unwrap_or(1),
    );
    let time = NaiveTime::from_hms_milli_opt(
        fields.hour.unwrap_or(0),
        fields.minute.unwrap_or(0),
        fields.second.unwrap_or(0),
        millisecond,
    );

    match (date, time) {
        (Some(date), Some(time)) => {
            CanonicalDateTime::Instant(Utc.from_utc_datetime(&date.and_time(time)))
        }
        _ => CanonicalDateTime::Invalid(InvalidReason::FieldsOutOfRange(fields)),
    }
}

fn floor_instant(instant: DateTime<Utc>, granularity: Granularity) -> Option<DateTime<Utc>> {
    let naive = instant.naive_utc();
    let floored = match granularity {
        Granularity::Year => {
            NaiveDate::from_ymd_opt(naive.year(), 1, 1)?.and_time(NaiveTime::MIN)
        }
        Granularity::Quarter => {
            let month = naive.month0() / MONTHS_PER_QUARTER * MONTHS_PER_QUARTER + 1;
            NaiveDate::from_ymd_opt(naive.year(), month, 1)?.and_time(NaiveTime::MIN)
        }
        Granularity::Month => {
            NaiveDate::from_ymd_opt(naive.year(), naive.month(), 1)?.and_time(NaiveTime::MIN)
        }
        Granularity::Week => naive
            .date()
            .week(Weekday::Mon)
            .first_day()
            .and_time(NaiveTime::MIN),
        Granularity::Day => naive.date().and_time(NaiveTime::MIN),
        Granularity::Hour => naive.with_minute(0)?.with_second(0)?.with_nanosecond(0)?,
        Granularity::Minute => naive.with_second(0)?.with_nanosecond(0)?,
        Granularity::Second => naive.with_nanosecond(0)?,
        Granularity::Millisecond => {
            naive.with_nanosecond(naive.nanosecond() / NANOS_PER_MILLI * NANOS_PER_MILLI)?
        }
    };
    Some(Utc.from_utc_datetime(&floored))
}
