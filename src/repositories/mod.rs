//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations for the
//! Registrar entities, providing a clean API for data access.

pub mod college;
pub mod course;
pub mod course_timetable;
pub mod student;

pub use college::CollegeRepository;
pub use course::CourseRepository;
pub use course_timetable::CourseTimetableRepository;
pub use student::StudentRepository;

/// Resolved pagination window (defaults applied, bounds validated upstream).
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: u64,
    pub skip: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: 20, skip: 0 }
    }
}
