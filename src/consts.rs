/// Recognized granularity tokens, coarsest first (case-sensitive)
pub const GRANULARITY_TOKENS: [&str; 9] = [
    "year",
    "quarter",
    "month",
    "week",
    "day",
    "hour",
    "minute",
    "second",
    "millisecond",
];

/// Months covered by one quarter
pub const MONTHS_PER_QUARTER: u32 = 3;

/// Nanoseconds in one millisecond
pub const NANOS_PER_MILLI: u32 = 1_000_000;

/// Largest valid millisecond-of-second field value
pub const MAX_MILLISECOND: u32 = 999;

/// Naive datetime formats accepted after RFC 3339 parsing fails,
/// tried in order (fractional seconds optional, then minute precision)
pub const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Date-only format (ISO 8601 calendar date)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rendering used for operands in assertion phrases
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Rendering for a canonical value that failed to resolve
pub const INVALID_RENDERING: &str = "Invalid DateTime";

/// Rendering for an operand that was never supplied
pub const MISSING_RENDERING: &str = "missing value";

/// Digits required for the year in reduced-precision ISO text
pub(crate) const YEAR_WIDTH: usize = 4;
/// Digits required for the month in reduced-precision ISO text
pub(crate) const MONTH_WIDTH: usize = 2;
