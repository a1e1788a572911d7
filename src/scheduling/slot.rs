//! Canonical time-slot overlap predicate.
//!
//! Two half-open intervals `[start, end)` on the same day overlap iff
//! `a.start < b.end && b.start < a.end`; touching endpoints do not count.
//! Both the timetable write path and the enrollment orchestrator go through
//! the helpers here, never through their own ad-hoc comparison.

use chrono::NaiveTime;
use thiserror::Error;
use uuid::Uuid;

use super::day::DayOfWeek;

/// One normalized weekly interval: a single day, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub day: DayOfWeek,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Half-open intersection on the same day.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

/// A normalized slot tagged with the course and timetable row it came from,
/// so conflicts can be attributed back to concrete entities.
#[derive(Debug, Clone, Copy)]
pub struct CourseSlot {
    pub course_id: Uuid,
    pub entry_id: Uuid,
    pub slot: TimeSlot,
}

/// First existing slot that collides with any of the candidate intervals.
///
/// Used by the timetable write path: candidates are the normalized rows of
/// one proposed entry, `existing` the stored rows of the same course.
pub fn first_conflict<'a>(
    candidates: &[TimeSlot],
    existing: &'a [CourseSlot],
) -> Option<&'a CourseSlot> {
    existing
        .iter()
        .find(|held| candidates.iter().any(|candidate| candidate.overlaps(&held.slot)))
}

/// First colliding pair between a candidate set and a pool, counting only
/// pairs that belong to different courses.
///
/// Used by the enrollment orchestrator: candidates are the slots of newly
/// requested courses, the pool is the union of requested and already
/// enrolled courses. Slots of the same course never conflict here; the
/// within-course invariant is enforced at timetable creation.
pub fn first_cross_course_conflict<'a>(
    candidates: &'a [CourseSlot],
    pool: &'a [CourseSlot],
) -> Option<(&'a CourseSlot, &'a CourseSlot)> {
    for candidate in candidates {
        for held in pool {
            if candidate.course_id != held.course_id && candidate.slot.overlaps(&held.slot) {
                return Some((candidate, held));
            }
        }
    }
    None
}

/// A time string that is neither `HH:MM:SS` nor `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time value: {0}")]
pub struct InvalidTime(pub String);

/// Parse a wall-clock time, accepting `HH:MM:SS` or `HH:MM`.
pub fn parse_time(value: &str) -> Result<NaiveTime, InvalidTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| InvalidTime(value.to_string()))
}
