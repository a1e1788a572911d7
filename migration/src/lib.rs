//! Database migrations for the Registrar API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2026_03_02_100000_create_colleges;
mod m2026_03_02_100100_create_students;
mod m2026_03_02_100200_create_courses;
mod m2026_03_02_100300_create_course_timetables;
mod m2026_03_02_100400_create_student_course_mapping;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_03_02_100000_create_colleges::Migration),
            Box::new(m2026_03_02_100100_create_students::Migration),
            Box::new(m2026_03_02_100200_create_courses::Migration),
            Box::new(m2026_03_02_100300_create_course_timetables::Migration),
            Box::new(m2026_03_02_100400_create_student_course_mapping::Migration),
        ]
    }
}
