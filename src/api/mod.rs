pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{create_client, ApiClient};
pub use endpoints::{courses, faculties, roster, specialities, student_rating};
pub use types::{CourseEntry, Faculty, LessonRecord, Mark, Speciality, Student, StudentRating};
