pub mod course;
pub mod people;
pub mod registry;

pub use course::{Course, GradeBook, Lab, RegistrationStatus, Roster, Section};
pub use people::{Instructor, Schedule, Student};
pub use registry::{CourseFilter, Registry};
