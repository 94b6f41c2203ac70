//! Decoding of wire-format durations and timestamps.
//!
//! `google.protobuf.Duration` and `google.protobuf.Timestamp` carry seconds
//! plus a nanosecond adjustment. These functions turn them into the chrono
//! types stored by duration and timestamp values, rejecting anything outside
//! the ranges CEL supports.

use chrono::{DateTime, TimeDelta, Utc};
use prost_reflect::prost_types;
use thiserror::Error;

const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// Largest duration magnitude CEL accepts, in seconds (about 10,000 years).
pub const MAX_DURATION_SECONDS: i64 = 315_576_000_000;

/// 0001-01-01T00:00:00Z
pub const MIN_TIMESTAMP_SECONDS: i64 = -62_135_596_800;

/// 9999-12-31T23:59:59Z
pub const MAX_TIMESTAMP_SECONDS: i64 = 253_402_300_799;

/// A wire value that has no CEL representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeDecodeError {
    #[error("duration out of range: {seconds}s {nanos}ns")]
    DurationOutOfRange { seconds: i64, nanos: i32 },

    #[error("timestamp out of range: {seconds}s {nanos}ns")]
    TimestampOutOfRange { seconds: i64, nanos: i32 },
}

/// Decode a `google.protobuf.Duration`.
///
/// `nanos` may carry either sign; the two components are summed.
pub fn decode_duration(proto: &prost_types::Duration) -> Result<TimeDelta, TimeDecodeError> {
    let out_of_range = || TimeDecodeError::DurationOutOfRange {
        seconds: proto.seconds,
        nanos: proto.nanos,
    };
    if proto.seconds.unsigned_abs() > MAX_DURATION_SECONDS.unsigned_abs()
        || proto.nanos.unsigned_abs() >= NANOS_PER_SECOND.unsigned_abs()
    {
        return Err(out_of_range());
    }
    let seconds = TimeDelta::try_seconds(proto.seconds).ok_or_else(out_of_range)?;
    seconds
        .checked_add(&TimeDelta::nanoseconds(i64::from(proto.nanos)))
        .ok_or_else(out_of_range)
}

/// Decode a `google.protobuf.Timestamp`.
///
/// `nanos` must be in `0..1_000_000_000` and the instant must fall between
/// years 0001 and 9999.
pub fn decode_timestamp(proto: &prost_types::Timestamp) -> Result<DateTime<Utc>, TimeDecodeError> {
    let out_of_range = || TimeDecodeError::TimestampOutOfRange {
        seconds: proto.seconds,
        nanos: proto.nanos,
    };
    if !(MIN_TIMESTAMP_SECONDS..=MAX_TIMESTAMP_SECONDS).contains(&proto.seconds)
        || !(0..NANOS_PER_SECOND).contains(&proto.nanos)
    {
        return Err(out_of_range());
    }
    let nanos = u32::try_from(proto.nanos).map_err(|_| out_of_range())?;
    DateTime::from_timestamp(proto.seconds, nanos).ok_or_else(out_of_range)
}
