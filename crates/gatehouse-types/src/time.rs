use chrono::{SecondsFormat, Utc};

/// Seconds since the Unix epoch.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// ISO-8601 UTC timestamp with microsecond precision, for log records.
pub fn utc_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
