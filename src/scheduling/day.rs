//! Day-of-week enumeration for weekly recurring timetables.
//!
//! Days are a fixed ordered enumeration with an explicit modulo-7 successor;
//! names are exact and case-sensitive (`Monday` .. `Sunday`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// One day of the 7-day week, in Monday-first order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// A day name that is not one of the seven exact English day names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid day name: {0}")]
pub struct InvalidDay(pub String);

impl DayOfWeek {
    /// All days in Monday-first order.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Zero-based position in the Monday-first week.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Cyclic successor: Monday -> Tuesday, ..., Sunday -> Monday.
    pub fn succ(self) -> DayOfWeek {
        Self::ALL[(self.ordinal() + 1) % 7]
    }

    /// Exact English day name.
    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = InvalidDay;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Monday" => Ok(DayOfWeek::Monday),
            "Tuesday" => Ok(DayOfWeek::Tuesday),
            "Wednesday" => Ok(DayOfWeek::Wednesday),
            "Thursday" => Ok(DayOfWeek::Thursday),
            "Friday" => Ok(DayOfWeek::Friday),
            "Saturday" => Ok(DayOfWeek::Saturday),
            "Sunday" => Ok(DayOfWeek::Sunday),
            other => Err(InvalidDay(other.to_string())),
        }
    }
}
