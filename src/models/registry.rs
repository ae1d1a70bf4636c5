use std::collections::BTreeMap;

use serde::Deserialize;

use crate::models::course::Course;
use crate::models::people::{Instructor, Student};

/// In-memory arena holding every person and course record, addressed by
/// stable identifier (username / course name). Rosters and schedules refer
/// back into the arena by identifier only.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub students: BTreeMap<String, Student>,
    pub instructors: BTreeMap<String, Instructor>,
    pub courses: BTreeMap<String, Course>,
}

/// Optional equality filters for the course search, AND-combined.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    pub number: Option<i64>,
    pub division: Option<String>,
    pub instructor_name: Option<String>,
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        self.number.is_none_or(|n| course.number == n)
            && self
                .division
                .as_deref()
                .is_none_or(|d| course.division == d)
            && self
                .instructor_name
                .as_deref()
                .is_none_or(|i| course.instructor_name == i)
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_student(&mut self, student: Student) {
        self.students.insert(student.username.clone(), student);
    }

    pub fn add_instructor(&mut self, instructor: Instructor) {
        self.instructors.insert(instructor.username.clone(), instructor);
    }

    /// Insert a course and record it on the instructor's teaching list.
    pub fn add_course(&mut self, course: Course) {
        if let Some(instructor) = self.instructors.get_mut(&course.instructor_username) {
            instructor.courses_teaching.insert(course.name.clone());
        }
        self.courses.insert(course.name.clone(), course);
    }

    pub fn filtered_courses(&self, filter: &CourseFilter) -> Vec<&Course> {
        self.courses.values().filter(|c| filter.matches(c)).collect()
    }
}
