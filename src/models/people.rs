use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A full-time student may hold this many sections before overloading.
pub const FULL_TIME_SECTION_LIMIT: usize = 3;
/// Part-time threshold.
pub const PART_TIME_SECTION_LIMIT: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub username: String,
    pub university_id: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub is_full_time: bool,
    pub major: String,
    pub program: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub schedule: Schedule,
}

impl Student {
    /// A student at or past the section limit for their classification is
    /// overloading; further registrations need department-chair approval.
    pub fn is_fully_registered(&self) -> bool {
        let limit = if self.is_full_time {
            FULL_TIME_SECTION_LIMIT
        } else {
            PART_TIME_SECTION_LIMIT
        };
        self.schedule.section_count() >= limit
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classification = if self.is_full_time {
            "Full-Time"
        } else {
            "Part-Time"
        };
        write!(
            f,
            "Student({}): {} {}, {}, {}",
            self.username, self.first_name, self.last_name, classification, self.program
        )
    }
}

/// Per-student view of current registrations. Holds course name -> unit
/// number, never object references; the catalog resolves numbers back to
/// sections and labs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub sections: BTreeMap<String, i64>,
    pub labs: BTreeMap<String, i64>,
}

impl Schedule {
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section_in(&self, course_name: &str) -> Option<i64> {
        self.sections.get(course_name).copied()
    }

    pub fn lab_in(&self, course_name: &str) -> Option<i64> {
        self.labs.get(course_name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.labs.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Instructor {
    pub username: String,
    pub university_id: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub division: String,
    pub is_department_chair: bool,
    /// Names of courses taught. The catalog owns the course objects.
    #[sqlx(skip)]
    #[serde(default)]
    pub courses_teaching: BTreeSet<String>,
}

impl Instructor {
    pub fn teaches(&self, course_name: &str) -> bool {
        self.courses_teaching.contains(course_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(is_full_time: bool) -> Student {
        Student {
            username: "stu1".to_string(),
            university_id: "U100".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            department: "Computer Science".to_string(),
            is_full_time,
            major: "CS".to_string(),
            program: "MPCS".to_string(),
            schedule: Schedule::default(),
        }
    }

    #[test]
    fn full_time_overloads_at_three_sections() {
        let mut s = student(true);
        for (i, name) in ["A", "B"].iter().enumerate() {
            s.schedule.sections.insert(name.to_string(), i as i64);
        }
        assert!(!s.is_fully_registered());
        s.schedule.sections.insert("C".to_string(), 3);
        assert!(s.is_fully_registered());
    }

    #[test]
    fn part_time_overloads_at_two_sections() {
        let mut s = student(false);
        s.schedule.sections.insert("A".to_string(), 1);
        assert!(!s.is_fully_registered());
        s.schedule.sections.insert("B".to_string(), 1);
        assert!(s.is_fully_registered());
    }
}
