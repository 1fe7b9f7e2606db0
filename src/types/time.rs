//! Canonical rendering of timestamps.
//!
//! Signatures must not depend on the signer's local clock representation, so
//! every timestamp is normalized to UTC and printed with a fixed nanosecond
//! precision before it is committed anywhere.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Normalizes any zoned timestamp to UTC.
pub fn canonical_utc<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Utc> {
    t.with_timezone(&Utc)
}

/// RFC 3339, nine fractional digits, `Z` suffix:
/// `2023-01-01T00:00:00.123456789Z`. Trailing zeros are kept, unlike Go's
/// `RFC3339Nano`.
pub fn canonical_time<Tz: TimeZone>(t: &DateTime<Tz>) -> String {
    canonical_utc(t).to_rfc3339_opts(SecondsFormat::Nanos, true)
}
