//! Persistence collaborator: mirrors roster/status/grade changes into the
//! relational store. Callers treat these as fire-and-forget; the service
//! layer logs failures without surfacing them, and the in-memory registry
//! stays authoritative.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::course::RegistrationStatus;

pub async fn add_section_registration(
    db: &SqlitePool,
    status: RegistrationStatus,
    student_username: &str,
    section_number: i64,
    course_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO section_registrations
            (course_name, section_number, student_username, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(course_name)
    .bind(section_number)
    .bind(student_username)
    .bind(status.to_string())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn add_lab_registration(
    db: &SqlitePool,
    status: RegistrationStatus,
    student_username: &str,
    lab_number: i64,
    course_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO lab_registrations
            (course_name, lab_number, student_username, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(course_name)
    .bind(lab_number)
    .bind(student_username)
    .bind(status.to_string())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_lab_registration(
    db: &SqlitePool,
    course_name: &str,
    student_username: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM lab_registrations WHERE course_name = ? AND student_username = ?")
        .bind(course_name)
        .bind(student_username)
        .execute(db)
        .await?;
    Ok(())
}

/// Combined delete of section and lab rows for one course.
pub async fn delete_course_registration(
    db: &SqlitePool,
    course_name: &str,
    student_username: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM section_registrations WHERE course_name = ? AND student_username = ?")
        .bind(course_name)
        .bind(student_username)
        .execute(db)
        .await?;
    sqlx::query("DELETE FROM lab_registrations WHERE course_name = ? AND student_username = ?")
        .bind(course_name)
        .bind(student_username)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_all_registrations(
    db: &SqlitePool,
    student_username: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM section_registrations WHERE student_username = ?")
        .bind(student_username)
        .execute(db)
        .await?;
    sqlx::query("DELETE FROM lab_registrations WHERE student_username = ?")
        .bind(student_username)
        .execute(db)
        .await?;
    Ok(())
}

/// Updates the section row and, when present, the lab row for the course.
pub async fn update_registration_status(
    db: &SqlitePool,
    status: RegistrationStatus,
    student_username: &str,
    course_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE section_registrations SET status = ? WHERE course_name = ? AND student_username = ?",
    )
    .bind(status.to_string())
    .bind(course_name)
    .bind(student_username)
    .execute(db)
    .await?;
    sqlx::query(
        "UPDATE lab_registrations SET status = ? WHERE course_name = ? AND student_username = ?",
    )
    .bind(status.to_string())
    .bind(course_name)
    .bind(student_username)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_approval_required(
    db: &SqlitePool,
    course_name: &str,
    required: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE courses SET approval_required = ? WHERE name = ?")
        .bind(required)
        .bind(course_name)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn add_grade(
    db: &SqlitePool,
    course_name: &str,
    section_number: i64,
    student_username: &str,
    grade: u32,
) -> Result<(), sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO grades (id, course_name, section_number, student_username, grade)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(course_name)
    .bind(section_number)
    .bind(student_username)
    .bind(grade as i64)
    .execute(db)
    .await?;
    Ok(())
}
