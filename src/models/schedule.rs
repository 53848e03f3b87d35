//! Monitor schedule periods and their conversion to milliseconds.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{deserialize_u64_from_str_or_int, serialize_u64_as_str};

/// Error returned when a schedule unit cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown schedule unit: {0}")]
pub struct UnknownScheduleUnit(pub String);

/// The unit a schedule period is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleUnit {
    /// Milliseconds.
    #[serde(rename = "ms")]
    Milliseconds,
    /// Seconds.
    #[serde(rename = "s")]
    Seconds,
    /// Minutes.
    #[serde(rename = "m")]
    Minutes,
    /// Hours.
    #[serde(rename = "h")]
    Hours,
    /// Days.
    #[serde(rename = "d")]
    Days,
}

impl ScheduleUnit {
    /// The number of milliseconds in one unit.
    pub const fn millis(self) -> u64 {
        match self {
            Self::Milliseconds => 1,
            Self::Seconds => 1_000,
            Self::Minutes => 60_000,
            Self::Hours => 3_600_000,
            Self::Days => 86_400_000,
        }
    }

    /// The short form used in stored records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
            Self::Days => "d",
        }
    }
}

impl fmt::Display for ScheduleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleUnit {
    type Err = UnknownScheduleUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ms" => Ok(Self::Milliseconds),
            "s" => Ok(Self::Seconds),
            "m" => Ok(Self::Minutes),
            "h" => Ok(Self::Hours),
            "d" => Ok(Self::Days),
            other => Err(UnknownScheduleUnit(other.to_string())),
        }
    }
}

/// How often a monitor runs.
///
/// Upstream records store `number` as a string; both strings and integers are
/// accepted when deserializing, and non-numeric text is rejected so that a
/// parsed period always converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchedulePeriod {
    /// The amount of `unit`s between runs.
    #[serde(
        deserialize_with = "deserialize_u64_from_str_or_int",
        serialize_with = "serialize_u64_as_str"
    )]
    pub number: u64,
    /// The unit of `number`.
    pub unit: ScheduleUnit,
}

impl SchedulePeriod {
    /// Creates a new period.
    pub const fn new(number: u64, unit: ScheduleUnit) -> Self {
        Self { number, unit }
    }

    /// The period in milliseconds, saturating on overflow.
    pub const fn as_millis(&self) -> u64 {
        self.number.saturating_mul(self.unit.millis())
    }
}

/// Converts a schedule period to milliseconds.
pub fn period_to_ms(schedule: &SchedulePeriod) -> u64 {
    schedule.as_millis()
}
