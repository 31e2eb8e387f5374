//! Nanosecond-precision UNIX timestamps.
//!
//! The versioning engine orders "latest wins" decisions by wall-clock time
//! at nanosecond precision. A timestamp is a signed 64-bit count of
//! nanoseconds since the UNIX epoch, which comfortably covers the years
//! 1678–2262.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::time::{SystemTime, UNIX_EPOCH};

/// A point in time, as nanoseconds since the UNIX epoch.
///
/// Stored on the wire as a plain integer. Ordering is the integer ordering.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NanoTime(i64);

impl NanoTime {
    /// The zero timestamp. Blank versions and default-initialized merge
    /// metadata use this so that defaults never beat a real edit.
    pub const ZERO: NanoTime = NanoTime(0);

    /// Creates a timestamp at the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_nanos() as i64;
        Self(nanos)
    }

    /// Creates a timestamp from a raw nanosecond count.
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Creates a timestamp from whole seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds * 1_000_000_000)
    }

    /// Creates a timestamp from whole milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * 1_000_000)
    }

    /// The raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> i64 {
        self.0
    }

    /// The timestamp as fractional seconds.
    #[must_use]
    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1e9
    }

    /// The timestamp as fractional milliseconds.
    #[must_use]
    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1e6
    }

    /// Returns `true` for the zero timestamp.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for NanoTime {
    type Output = NanoTime;

    fn add(self, rhs: NanoTime) -> NanoTime {
        NanoTime(self.0 + rhs.0)
    }
}

impl Sub for NanoTime {
    type Output = NanoTime;

    fn sub(self, rhs: NanoTime) -> NanoTime {
        NanoTime(self.0 - rhs.0)
    }
}

impl fmt::Display for NanoTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NanoTime {
    fn from(nanos: i64) -> Self {
        Self(nanos)
    }
}

impl From<NanoTime> for i64 {
    fn from(t: NanoTime) -> i64 {
        t.0
    }
}
