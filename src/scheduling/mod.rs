//! # Scheduling Core
//!
//! Weekly timetable primitives shared by the timetable write path and the
//! enrollment orchestrator: the day-of-week enumeration, the canonical
//! half-open overlap predicate, and the midnight-crossing normalizer.
//!
//! Every row compared here is normalized (within a single day, `start <=
//! end`), which is what keeps the overlap predicate total. The same
//! predicate is used for both the within-course check at timetable creation
//! and the cross-course check at enrollment, so the two paths can never
//! disagree about what counts as a conflict.

pub mod day;
pub mod slot;
pub mod split;

pub use day::DayOfWeek;
pub use slot::{CourseSlot, TimeSlot, first_conflict, first_cross_course_conflict, parse_time};
pub use split::{NormalizedTimetable, TimetableRow};
