use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status of one roster entry. `Pending` registrations come from overloading
/// students and can only be moved on by a department chair; `Tentative` ones
/// come from approval-required courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Approved,
    Tentative,
    Pending,
    Denied,
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegistrationStatus::Approved => "Approved",
            RegistrationStatus::Tentative => "Tentative",
            RegistrationStatus::Pending => "Pending",
            RegistrationStatus::Denied => "Denied",
        };
        f.write_str(s)
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Approved" => Ok(RegistrationStatus::Approved),
            "Tentative" => Ok(RegistrationStatus::Tentative),
            "Pending" => Ok(RegistrationStatus::Pending),
            "Denied" => Ok(RegistrationStatus::Denied),
            other => Err(format!("unknown registration status: {other}")),
        }
    }
}

/// Capacity-checked roster shared by sections and labs. Entries are keyed by
/// student username; the person directory owns the student objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub max_registration: usize,
    entries: BTreeMap<String, RegistrationStatus>,
}

impl Roster {
    pub fn new(max_registration: usize) -> Self {
        Self {
            max_registration,
            entries: BTreeMap::new(),
        }
    }

    pub fn space_remaining(&self) -> bool {
        self.entries.len() < self.max_registration
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, username: &str, status: RegistrationStatus) {
        self.entries.insert(username.to_string(), status);
    }

    pub fn remove(&mut self, username: &str) -> Option<RegistrationStatus> {
        self.entries.remove(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.entries.contains_key(username)
    }

    pub fn status_of(&self, username: &str) -> Option<RegistrationStatus> {
        self.entries.get(username).copied()
    }

    pub fn set_status(&mut self, username: &str, status: RegistrationStatus) {
        if let Some(entry) = self.entries.get_mut(username) {
            *entry = status;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RegistrationStatus)> {
        self.entries.iter()
    }
}

/// Per-section grade ledger. Grades accumulate; there is no update or delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeBook {
    grades: BTreeMap<String, Vec<u32>>,
}

impl GradeBook {
    pub fn add_grade(&mut self, username: &str, grade: u32) {
        self.grades.entry(username.to_string()).or_default().push(grade);
    }

    pub fn grades_for(&self, username: &str) -> Option<&[u32]> {
        self.grades.get(username).map(Vec::as_slice)
    }

    /// Arithmetic mean rounded to the nearest integer, halves rounding up,
    /// or None when no grades are recorded.
    pub fn average_for(&self, username: &str) -> Option<u32> {
        let grades = self.grades.get(username)?;
        if grades.is_empty() {
            return None;
        }
        let sum: u32 = grades.iter().sum();
        Some((f64::from(sum) / grades.len() as f64).round() as u32)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub number: i64,
    pub course_name: String,
    pub course_number: i64,
    pub course_program: String,
    pub course_instructor: String,
    pub time: String,
    pub day: String,
    pub roster: Roster,
    pub grade_book: GradeBook,
}

impl fmt::Display for Section {
    // MPCS 55001-1: Algorithms - Gerry Brady, Tuesday 2:30PM, Enrollment: 5/10
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}: {} - {}, {} {}, Enrollment: {}/{}",
            self.course_program,
            self.course_number,
            self.number,
            self.course_name,
            self.course_instructor,
            self.day,
            self.time,
            self.roster.len(),
            self.roster.max_registration
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lab {
    pub number: i64,
    pub course_name: String,
    pub course_number: i64,
    pub course_program: String,
    pub course_instructor: String,
    pub time: String,
    pub day: String,
    pub roster: Roster,
}

impl fmt::Display for Lab {
    // MPCS 55001-Lab1: Algorithms - Gerry Brady, Monday 4:30PM, Enrollment: 0/10
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-Lab{}: {} - {}, {} {}, Enrollment: {}/{}",
            self.course_program,
            self.course_number,
            self.number,
            self.course_name,
            self.course_instructor,
            self.day,
            self.time,
            self.roster.len(),
            self.roster.max_registration
        )
    }
}

/// A course and the sections/labs it owns, keyed by unit number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub number: i64,
    pub department: String,
    pub division: String,
    pub program: String,
    pub lab_required: bool,
    pub approval_required: bool,
    pub instructor_name: String,
    pub instructor_username: String,
    pub sections: BTreeMap<i64, Section>,
    pub labs: BTreeMap<i64, Lab>,
}

impl Course {
    pub fn add_section(&mut self, number: i64, max_registration: usize, time: &str, day: &str) {
        self.sections.insert(
            number,
            Section {
                number,
                course_name: self.name.clone(),
                course_number: self.number,
                course_program: self.program.clone(),
                course_instructor: self.instructor_name.clone(),
                time: time.to_string(),
                day: day.to_string(),
                roster: Roster::new(max_registration),
                grade_book: GradeBook::default(),
            },
        );
    }

    pub fn add_lab(&mut self, number: i64, max_registration: usize, time: &str, day: &str) {
        self.labs.insert(
            number,
            Lab {
                number,
                course_name: self.name.clone(),
                course_number: self.number,
                course_program: self.program.clone(),
                course_instructor: self.instructor_name.clone(),
                time: time.to_string(),
                day: day.to_string(),
                roster: Roster::new(max_registration),
            },
        );
    }

    pub fn section(&self, number: i64) -> Option<&Section> {
        self.sections.get(&number)
    }

    pub fn lab(&self, number: i64) -> Option<&Lab> {
        self.labs.get(&number)
    }

    /// Scan the course's sections for one whose roster holds the student.
    pub fn find_student_section(&self, username: &str) -> Option<&Section> {
        self.sections.values().find(|s| s.roster.contains(username))
    }

    pub fn find_student_section_mut(&mut self, username: &str) -> Option<&mut Section> {
        self.sections.values_mut().find(|s| s.roster.contains(username))
    }

    pub fn find_student_lab(&self, username: &str) -> Option<&Lab> {
        self.labs.values().find(|l| l.roster.contains(username))
    }

    pub fn find_student_lab_mut(&mut self, username: &str) -> Option<&mut Lab> {
        self.labs.values_mut().find(|l| l.roster.contains(username))
    }
}

impl fmt::Display for Course {
    // MPCS 55001: Algorithms - Gerry Brady, Instructor Approval Required
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} - {}",
            self.program, self.number, self.name, self.instructor_name
        )?;
        if self.approval_required {
            write!(f, ", Instructor Approval Required")?;
        }
        Ok(())
    }
}
