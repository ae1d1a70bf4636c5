//! Read-only display operations. Each one renders a human-readable report
//! from the registry, resolving schedule/roster identifiers through the
//! catalog.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::engine::EngineError;
use crate::models::course::{Course, RegistrationStatus};
use crate::models::registry::{CourseFilter, Registry};

const RULE: &str = "---------------------------------------------\n";
const FOOTER: &str = "=============================================\n";

/// Student's current schedule: registered sections and labs with their
/// registration status.
pub fn view_schedule(registry: &Registry, username: &str) -> Result<String, EngineError> {
    let student = registry
        .students
        .get(username)
        .ok_or(EngineError::StudentNotFound)?;

    let mut out = format!(
        "\n=========== {} {} SCHEDULE ===========\n",
        student.first_name.to_uppercase(),
        student.last_name.to_uppercase()
    );

    if !student.schedule.sections.is_empty() {
        out.push_str(RULE);
        out.push_str("Sections Registered:\n");
        out.push_str(RULE);
        for (course_name, number) in &student.schedule.sections {
            if let Some(section) = registry
                .courses
                .get(course_name)
                .and_then(|c| c.section(*number))
            {
                let status = section
                    .roster
                    .status_of(username)
                    .unwrap_or(RegistrationStatus::Pending);
                let _ = writeln!(out, "{section} - Registration Status: {status}");
            }
        }
    }
    if !student.schedule.labs.is_empty() {
        out.push_str(RULE);
        out.push_str("Labs Registered:\n");
        out.push_str(RULE);
        for (course_name, number) in &student.schedule.labs {
            if let Some(lab) = registry
                .courses
                .get(course_name)
                .and_then(|c| c.lab(*number))
            {
                let status = lab
                    .roster
                    .status_of(username)
                    .unwrap_or(RegistrationStatus::Pending);
                let _ = writeln!(out, "{lab} - Registration Status: {status}");
            }
        }
    }
    if student.schedule.sections.is_empty() {
        out.push_str("Student is not currently enrolled in any courses\n");
    }
    out.push_str(FOOTER);
    Ok(out)
}

/// Student's grades per registered course, with the rounded average.
pub fn view_grades(registry: &Registry, username: &str) -> Result<String, EngineError> {
    let student = registry
        .students
        .get(username)
        .ok_or(EngineError::StudentNotFound)?;

    let mut out = format!(
        "\n=========== {} {} GRADES ===========\n",
        student.first_name.to_uppercase(),
        student.last_name.to_uppercase()
    );

    for (course_name, number) in &student.schedule.sections {
        let Some(section) = registry
            .courses
            .get(course_name)
            .and_then(|c| c.section(*number))
        else {
            continue;
        };
        out.push_str(RULE);
        out.push_str(course_name);
        out.push('\n');
        out.push_str(RULE);
        match section.grade_book.grades_for(username) {
            Some(grades) if !grades.is_empty() => {
                let grade_str = grades
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(out, "Grades: {grade_str}");
                if let Some(avg) = section.grade_book.average_for(username) {
                    let _ = writeln!(out, "Average: {avg}");
                }
            }
            _ => out.push_str("No grades recorded for this course\n"),
        }
    }
    if student.schedule.sections.is_empty() {
        out.push_str("Student is not currently enrolled in any courses\n");
    }
    out.push_str(FOOTER);
    Ok(out)
}

fn course_detail(course: &Course) -> String {
    let mut out = course.to_string();
    out.push('\n');
    out.push_str(RULE);
    out.push_str("Sections:\n");
    out.push_str(RULE);
    for section in course.sections.values() {
        let _ = writeln!(out, "{section}");
    }
    if !course.labs.is_empty() {
        out.push_str(RULE);
        out.push_str("Labs:\n");
        out.push_str(RULE);
        for lab in course.labs.values() {
            let _ = writeln!(out, "{lab}");
        }
    }
    out
}

/// Course search with optional equality filters. An empty result set is a
/// message, not an error.
pub fn view_filtered_courses(registry: &Registry, filter: &CourseFilter) -> String {
    let courses = registry.filtered_courses(filter);
    if courses.is_empty() {
        return "No courses found matching criteria".to_string();
    }

    let mut out = "\n=============== SEARCH RESULTS ==============\n".to_string();
    for course in courses {
        out.push_str("\n=================== COURSE ==================\n");
        out.push_str(&course_detail(course));
        out.push_str(FOOTER);
    }
    out
}

/// Courses on the instructor's teaching list.
pub fn view_courses_teaching(
    registry: &Registry,
    instructor_username: &str,
) -> Result<String, EngineError> {
    let instructor = registry
        .instructors
        .get(instructor_username)
        .ok_or(EngineError::InstructorNotFound)?;

    let mut out = format!(
        "\n============= {} {} COURSES ===============\n",
        instructor.first_name.to_uppercase(),
        instructor.last_name.to_uppercase()
    );
    for course_name in &instructor.courses_teaching {
        if let Some(course) = registry.courses.get(course_name) {
            let _ = writeln!(out, "{course}");
        }
    }
    out.push_str(FOOTER);
    Ok(out)
}

/// Union of section and lab rosters for one course, deduplicated by student
/// identity. When a student holds both a section and a lab, the section
/// status is shown.
pub fn view_course_students(
    registry: &Registry,
    instructor_username: &str,
    course_name: &str,
) -> Result<String, EngineError> {
    let instructor = registry
        .instructors
        .get(instructor_username)
        .ok_or(EngineError::InstructorNotFound)?;
    if !instructor.teaches(course_name) {
        return Err(EngineError::NotInstructorOfCourse {
            course: course_name.to_string(),
        });
    }
    let course = registry
        .courses
        .get(course_name)
        .ok_or(EngineError::CourseNotFound)?;

    let mut roster: BTreeMap<&String, RegistrationStatus> = BTreeMap::new();
    for lab in course.labs.values() {
        for (username, status) in lab.roster.iter() {
            roster.insert(username, *status);
        }
    }
    // Section entries win over lab entries for students holding both.
    for section in course.sections.values() {
        for (username, status) in section.roster.iter() {
            roster.insert(username, *status);
        }
    }

    let mut out = "\n=================== COURSE ===================\n".to_string();
    out.push_str(&course.to_string());
    out.push('\n');
    out.push_str(RULE);
    out.push_str("Students Registered:\n");
    out.push_str(RULE);
    for (username, status) in roster {
        match registry.students.get(username) {
            Some(student) => {
                let _ = writeln!(out, "{student}, Status: {status}");
            }
            None => {
                let _ = writeln!(out, "{username}, Status: {status}");
            }
        }
    }
    out.push_str(FOOTER);
    Ok(out)
}
