//! Bulk load collaborator: one-time hydration of the in-memory registry
//! from the relational store at startup. Not used after startup; live
//! mutations flow the other way, through `db::repository`.

use std::collections::BTreeMap;
use std::str::FromStr;

use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};

use crate::models::course::{Course, RegistrationStatus};
use crate::models::people::{Instructor, Student};
use crate::models::registry::Registry;

#[derive(FromRow)]
struct CourseRow {
    name: String,
    number: i64,
    department: String,
    division: String,
    program: String,
    lab_required: bool,
    approval_required: bool,
    instructor_name: String,
    instructor_username: String,
}

#[derive(FromRow)]
struct UnitRow {
    course_name: String,
    number: i64,
    max_registration: i64,
    time: String,
    day: String,
}

#[derive(FromRow)]
struct SectionRegistrationRow {
    course_name: String,
    section_number: i64,
    student_username: String,
    status: String,
}

#[derive(FromRow)]
struct LabRegistrationRow {
    course_name: String,
    lab_number: i64,
    student_username: String,
    status: String,
}

#[derive(FromRow)]
struct GradeRow {
    course_name: String,
    section_number: i64,
    student_username: String,
    grade: i64,
}

fn parse_status(raw: &str, context: &str) -> Option<RegistrationStatus> {
    match RegistrationStatus::from_str(raw) {
        Ok(status) => Some(status),
        Err(err) => {
            warn!("skipping {context}: {err}");
            None
        }
    }
}

/// Read every table once and assemble the registry: people, catalog,
/// rosters, schedules, grade books.
pub async fn load_registry(db: &SqlitePool) -> Result<Registry, sqlx::Error> {
    let mut registry = Registry::new();

    let students = sqlx::query_as::<_, Student>(
        "SELECT username, university_id, first_name, last_name, department,
                is_full_time, major, program
         FROM students",
    )
    .fetch_all(db)
    .await?;
    for student in students {
        registry.add_student(student);
    }

    let instructors = sqlx::query_as::<_, Instructor>(
        "SELECT username, university_id, first_name, last_name, department,
                division, is_department_chair
         FROM instructors",
    )
    .fetch_all(db)
    .await?;
    for instructor in instructors {
        registry.add_instructor(instructor);
    }

    let courses = sqlx::query_as::<_, CourseRow>(
        "SELECT name, number, department, division, program, lab_required,
                approval_required, instructor_name, instructor_username
         FROM courses",
    )
    .fetch_all(db)
    .await?;
    for row in courses {
        registry.add_course(Course {
            name: row.name,
            number: row.number,
            department: row.department,
            division: row.division,
            program: row.program,
            lab_required: row.lab_required,
            approval_required: row.approval_required,
            instructor_name: row.instructor_name,
            instructor_username: row.instructor_username,
            sections: BTreeMap::new(),
            labs: BTreeMap::new(),
        });
    }

    let sections = sqlx::query_as::<_, UnitRow>(
        "SELECT course_name, number, max_registration, time, day FROM sections",
    )
    .fetch_all(db)
    .await?;
    for row in sections {
        match registry.courses.get_mut(&row.course_name) {
            Some(course) => {
                course.add_section(row.number, row.max_registration as usize, &row.time, &row.day)
            }
            None => warn!("skipping section for unknown course {}", row.course_name),
        }
    }

    let labs = sqlx::query_as::<_, UnitRow>(
        "SELECT course_name, number, max_registration, time, day FROM labs",
    )
    .fetch_all(db)
    .await?;
    for row in labs {
        match registry.courses.get_mut(&row.course_name) {
            Some(course) => {
                course.add_lab(row.number, row.max_registration as usize, &row.time, &row.day)
            }
            None => warn!("skipping lab for unknown course {}", row.course_name),
        }
    }

    let section_registrations = sqlx::query_as::<_, SectionRegistrationRow>(
        "SELECT course_name, section_number, student_username, status FROM section_registrations",
    )
    .fetch_all(db)
    .await?;
    for row in section_registrations {
        let Some(status) = parse_status(&row.status, "section registration") else {
            continue;
        };
        if let Some(section) = registry
            .courses
            .get_mut(&row.course_name)
            .and_then(|c| c.sections.get_mut(&row.section_number))
        {
            section.roster.add(&row.student_username, status);
        }
        if let Some(student) = registry.students.get_mut(&row.student_username) {
            student
                .schedule
                .sections
                .insert(row.course_name.clone(), row.section_number);
        }
    }

    let lab_registrations = sqlx::query_as::<_, LabRegistrationRow>(
        "SELECT course_name, lab_number, student_username, status FROM lab_registrations",
    )
    .fetch_all(db)
    .await?;
    for row in lab_registrations {
        let Some(status) = parse_status(&row.status, "lab registration") else {
            continue;
        };
        if let Some(lab) = registry
            .courses
            .get_mut(&row.course_name)
            .and_then(|c| c.labs.get_mut(&row.lab_number))
        {
            lab.roster.add(&row.student_username, status);
        }
        if let Some(student) = registry.students.get_mut(&row.student_username) {
            student
                .schedule
                .labs
                .insert(row.course_name.clone(), row.lab_number);
        }
    }

    let grades = sqlx::query_as::<_, GradeRow>(
        "SELECT course_name, section_number, student_username, grade FROM grades",
    )
    .fetch_all(db)
    .await?;
    for row in grades {
        if let Some(section) = registry
            .courses
            .get_mut(&row.course_name)
            .and_then(|c| c.sections.get_mut(&row.section_number))
        {
            section
                .grade_book
                .add_grade(&row.student_username, row.grade.clamp(0, 100) as u32);
        }
    }

    info!(
        "registry hydrated: {} students, {} instructors, {} courses",
        registry.students.len(),
        registry.instructors.len(),
        registry.courses.len()
    );
    Ok(registry)
}
