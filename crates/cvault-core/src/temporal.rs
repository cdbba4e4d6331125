//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines [`Timestamp`], the single time type used across the stack:
//! UTC only, truncated to seconds, rendered as ISO8601 with a `Z` suffix.
//!
//! ## Invariant
//!
//! Timestamps participate in chain-hash preimages (`cvault-ledger`), so
//! their textual form must be deterministic. A local offset or sub-second
//! component would make the same instant hash two different ways. Inputs
//! with non-UTC offsets are converted at construction; sub-seconds are
//! discarded.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC timestamp truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::parse()`] — from RFC 3339, converting any offset to UTC.
/// - [`Timestamp::from_epoch_secs()`] — from Unix seconds.
/// - [`Timestamp::from_ymd_hms()`] — from calendar parts (mainly tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate(Utc::now()))
    }

    /// Parse an RFC 3339 string, converting to UTC and truncating.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::Parse(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate(dt.with_timezone(&Utc))))
    }

    /// From a Unix epoch timestamp in seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| CoreError::Validation(format!("unix timestamp out of range: {secs}")))?;
        Ok(Self(dt))
    }

    /// From calendar parts, UTC.
    pub fn from_ymd_hms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Result<Self, CoreError> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .map(Self)
            .ok_or_else(|| {
                CoreError::Validation(format!("invalid calendar date {y}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}"))
            })
    }

    /// Seconds since the Unix epoch.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    ///
    /// This is the exact form that enters chain-hash preimages.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
