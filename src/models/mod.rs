//! # Data Models
//!
//! SeaORM entity models for the Registrar API tables.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod college;
pub mod course;
pub mod course_timetable;
pub mod student;
pub mod student_course_mapping;

pub use college::Entity as College;
pub use course::Entity as Course;
pub use course_timetable::Entity as CourseTimetable;
pub use student::Entity as Student;
pub use student_course_mapping::Entity as StudentCourseMapping;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "registrar".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
