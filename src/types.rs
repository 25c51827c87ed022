use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A truncation unit controlling how coarsely two date/times are compared.
/// Variants are ordered coarsest to finest, so `Granularity::Year <
/// Granularity::Day` holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[display(fmt = "year")]
    Year,
    #[display(fmt = "quarter")]
    Quarter,
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "week")]
    Week,
    #[display(fmt = "day")]
    Day,
    #[display(fmt = "hour")]
    Hour,
    #[display(fmt = "minute")]
    Minute,
    #[display(fmt = "second")]
    Second,
    #[display(fmt = "millisecond")]
    Millisecond,
}

/// Error type for unrecognized granularity tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized granularity token: {0}")]
pub struct UnknownGranularity(pub String);

impl Granularity {
    /// All granularities, coarsest first. Matches `GRANULARITY_TOKENS`
    /// position for position.
    pub const ALL: [Self; 9] = [
        Self::Year,
        Self::Quarter,
        Self::Month,
        Self::Week,
        Self::Day,
        Self::Hour,
        Self::Minute,
        Self::Second,
        Self::Millisecond,
    ];

    /// Returns the canonical lowercase token for this granularity
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Quarter => "quarter",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Millisecond => "millisecond",
        }
    }
}

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    /// Tokens are matched exactly; lookup is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(Self::Year),
            "quarter" => Ok(Self::Quarter),
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            "day" => Ok(Self::Day),
            "hour" => Ok(Self::Hour),
            "minute" => Ok(Self::Minute),
            "second" => Ok(Self::Second),
            "millisecond" => Ok(Self::Millisecond),
            _ => Err(UnknownGranularity(s.to_owned())),
        }
    }
}

/// The resolved form of the third positional argument shared by the
/// granularity-accepting predicates: a recognized token selects a
/// truncation unit, any other text becomes the override failure message
/// and the comparison runs at full instant precision.
///
/// A misspelled token therefore silently loses truncation and is reported
/// as the failure message instead. That resolution rule is part of the
/// public contract, not an accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GranularityArg {
    /// No third argument: full instant precision, default messages.
    None,
    /// A recognized truncation unit.
    Granularity(Granularity),
    /// Free text used verbatim as the failure message.
    Message(String),
}

impl GranularityArg {
    /// Resolves a raw token once, at the call boundary.
    pub fn resolve(token: &str) -> Self {
        token
            .parse::<Granularity>()
            .map_or_else(|_| Self::Message(token.to_owned()), Self::Granularity)
    }

    /// Returns the truncation unit, if this argument carries one
    pub const fn granularity(&self) -> Option<Granularity> {
        match self {
            Self::Granularity(granularity) => Some(*granularity),
            Self::None | Self::Message(_) => None,
        }
    }
}

impl From<&str> for GranularityArg {
    fn from(token: &str) -> Self {
        Self::resolve(token)
    }
}

impl From<String> for GranularityArg {
    fn from(token: String) -> Self {
        match token.parse::<Granularity>() {
            Ok(granularity) => Self::Granularity(granularity),
            Err(_) => Self::Message(token),
        }
    }
}

impl From<Granularity> for GranularityArg {
    fn from(granularity: Granularity) -> Self {
        Self::Granularity(granularity)
    }
}

impl From<Option<Granularity>> for GranularityArg {
    fn from(granularity: Option<Granularity>) -> Self {
        granularity.map_or(Self::None, Self::Granularity)
    }
}

/// A plain calendar-field record. The year is required; every other field
/// defaults to the start of its unit (month and day to 1, time fields to 0),
/// so a record always resolves to the same instant on every run.
///
/// Out-of-range combinations (month 13, February 30th) are not rejected
/// here; they resolve to the invalid canonical value during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub millisecond: Option<u32>,
}

impl CalendarFields {
    /// Creates a record with only the year set
    pub const fn new(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
            millisecond: None,
        }
    }

    /// Sets the calendar month (1-12)
    #[must_use]
    pub const fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    /// Sets the day of month (1-31)
    #[must_use]
    pub const fn day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    /// Sets the hour of day (0-23)
    #[must_use]
    pub const fn hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    /// Sets the minute of hour (0-59)
    #[must_use]
    pub const fn minute(mut self, minute: u32) -> Self {
        self.minute = Some(minute);
        self
    }

    /// Sets the second of minute (0-59)
    #[must_use]
    pub const fn second(mut self, second: u32) -> Self {
        self.second = Some(second);
        self
    }

    /// Sets the millisecond of second (0-999)
    #[must_use]
    pub const fn millisecond(mut self, millisecond: u32) -> Self {
        self.millisecond = Some(millisecond);
        self
    }
}
