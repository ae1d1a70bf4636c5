use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::audit::AuditLog;
use crate::db::repository;
use crate::engine::{self, ApprovalOutcome, EngineError, GradeOutcome, RegistrationOutcome, views};
use crate::models::registry::{CourseFilter, Registry};

/// Orchestrates one workflow per façade operation: takes the registry lock,
/// runs the rules engine, then mirrors the change into the persistence and
/// audit collaborators. Collaborator failures are logged and swallowed; the
/// in-memory registry stays authoritative.
pub struct RegistrationService {
    registry: Arc<RwLock<Registry>>,
    db: SqlitePool,
    audit: Arc<dyn AuditLog>,
}

fn log_persist_failure(operation: &str, result: Result<(), sqlx::Error>) {
    if let Err(err) = result {
        warn!("failed to persist {operation}: {err}");
    }
}

impl RegistrationService {
    pub fn new(registry: Arc<RwLock<Registry>>, db: SqlitePool, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            registry,
            db,
            audit,
        }
    }

    pub async fn register_in_section(
        &self,
        username: &str,
        course_name: &str,
        section_number: i64,
    ) -> Result<RegistrationOutcome, EngineError> {
        let outcome = {
            let mut registry = self.registry.write().await;
            engine::register_in_section(&mut registry, username, course_name, section_number)?
        };
        info!(
            "student {username} registered in {course_name} section {section_number} ({})",
            outcome.status
        );

        log_persist_failure(
            "section registration",
            repository::add_section_registration(
                &self.db,
                outcome.status,
                username,
                section_number,
                course_name,
            )
            .await,
        );
        self.audit
            .insert_log(&format!(
                "Student '{username}' registered in {course_name} section {section_number} \
                 with status '{}'",
                outcome.status
            ))
            .await;
        Ok(outcome)
    }

    pub async fn register_in_lab(
        &self,
        username: &str,
        course_name: &str,
        lab_number: i64,
    ) -> Result<RegistrationOutcome, EngineError> {
        let outcome = {
            let mut registry = self.registry.write().await;
            engine::register_in_lab(&mut registry, username, course_name, lab_number)?
        };
        info!(
            "student {username} registered in {course_name} lab {lab_number} ({})",
            outcome.status
        );

        log_persist_failure(
            "lab registration",
            repository::add_lab_registration(
                &self.db,
                outcome.status,
                username,
                lab_number,
                course_name,
            )
            .await,
        );
        self.audit
            .insert_log(&format!(
                "Student '{username}' registered in {course_name} lab {lab_number} \
                 with status '{}'",
                outcome.status
            ))
            .await;
        Ok(outcome)
    }

    pub async fn reschedule_lab(
        &self,
        username: &str,
        course_name: &str,
        lab_number: i64,
    ) -> Result<RegistrationOutcome, EngineError> {
        let outcome = {
            let mut registry = self.registry.write().await;
            engine::reschedule_lab(&mut registry, username, course_name, lab_number)?
        };
        info!(
            "student {username} rescheduled into {course_name} lab {lab_number} ({})",
            outcome.status
        );

        // Old registration is deleted before the new one is inserted.
        log_persist_failure(
            "lab registration delete",
            repository::delete_lab_registration(&self.db, course_name, username).await,
        );
        log_persist_failure(
            "lab registration",
            repository::add_lab_registration(
                &self.db,
                outcome.status,
                username,
                lab_number,
                course_name,
            )
            .await,
        );
        self.audit
            .insert_log(&format!(
                "Student '{username}' rescheduled into {course_name} lab {lab_number} \
                 with status '{}'",
                outcome.status
            ))
            .await;
        Ok(outcome)
    }

    pub async fn drop_course(
        &self,
        username: &str,
        course_name: &str,
    ) -> Result<String, EngineError> {
        let message = {
            let mut registry = self.registry.write().await;
            engine::drop_course(&mut registry, username, course_name)?
        };
        info!("student {username} dropped {course_name}");

        log_persist_failure(
            "course drop",
            repository::delete_course_registration(&self.db, course_name, username).await,
        );
        self.audit
            .insert_log(&format!("Student '{username}' has dropped {course_name}"))
            .await;
        Ok(message)
    }

    pub async fn drop_all_courses(&self, username: &str) -> Result<String, EngineError> {
        let message = {
            let mut registry = self.registry.write().await;
            engine::drop_all_courses(&mut registry, username)?
        };
        info!("student {username} dropped all courses");

        log_persist_failure(
            "bulk drop",
            repository::delete_all_registrations(&self.db, username).await,
        );
        self.audit
            .insert_log(&format!("Student '{username}' has dropped all courses"))
            .await;
        Ok(message)
    }

    pub async fn approve_deny_registration(
        &self,
        instructor_username: &str,
        student_username: &str,
        course_name: &str,
        approve: bool,
    ) -> Result<ApprovalOutcome, EngineError> {
        let outcome = {
            let mut registry = self.registry.write().await;
            engine::approve_deny_registration(
                &mut registry,
                instructor_username,
                student_username,
                course_name,
                approve,
            )?
        };
        info!(
            "instructor {instructor_username} set {student_username} to {} in {course_name}",
            outcome.status
        );

        log_persist_failure(
            "registration status update",
            repository::update_registration_status(
                &self.db,
                outcome.status,
                student_username,
                course_name,
            )
            .await,
        );
        self.audit
            .insert_log(&format!(
                "Instructor '{instructor_username}' has {} student {student_username} \
                 for {course_name}",
                outcome.status
            ))
            .await;
        Ok(outcome)
    }

    pub async fn set_approval_required(
        &self,
        instructor_username: &str,
        course_name: &str,
        required: bool,
    ) -> Result<String, EngineError> {
        let message = {
            let mut registry = self.registry.write().await;
            engine::set_approval_required(&mut registry, instructor_username, course_name, required)?
        };
        info!("instructor {instructor_username} set {course_name} approval_required={required}");

        log_persist_failure(
            "approval required update",
            repository::update_approval_required(&self.db, course_name, required).await,
        );
        let wording = if required {
            "approval required"
        } else {
            "approval not required"
        };
        self.audit
            .insert_log(&format!(
                "Instructor '{instructor_username}' has set course {course_name} to {wording}"
            ))
            .await;
        Ok(message)
    }

    pub async fn add_grade(
        &self,
        instructor_username: &str,
        student_username: &str,
        course_name: &str,
        grade: u32,
    ) -> Result<GradeOutcome, EngineError> {
        let outcome = {
            let mut registry = self.registry.write().await;
            engine::add_grade(
                &mut registry,
                instructor_username,
                student_username,
                course_name,
                grade,
            )?
        };
        info!(
            "instructor {instructor_username} graded {student_username} in {course_name} \
             section {}",
            outcome.section_number
        );

        log_persist_failure(
            "grade",
            repository::add_grade(
                &self.db,
                course_name,
                outcome.section_number,
                student_username,
                grade,
            )
            .await,
        );
        self.audit
            .insert_log(&format!(
                "Instructor '{instructor_username}' has added grade: {grade} to student \
                 '{student_username}' for {course_name}"
            ))
            .await;
        Ok(outcome)
    }

    pub async fn view_schedule(&self, username: &str) -> Result<String, EngineError> {
        let registry = self.registry.read().await;
        views::view_schedule(&registry, username)
    }

    pub async fn view_grades(&self, username: &str) -> Result<String, EngineError> {
        let registry = self.registry.read().await;
        views::view_grades(&registry, username)
    }

    pub async fn view_filtered_courses(&self, filter: &CourseFilter) -> String {
        let registry = self.registry.read().await;
        views::view_filtered_courses(&registry, filter)
    }

    pub async fn view_courses_teaching(
        &self,
        instructor_username: &str,
    ) -> Result<String, EngineError> {
        let registry = self.registry.read().await;
        views::view_courses_teaching(&registry, instructor_username)
    }

    pub async fn view_course_students(
        &self,
        instructor_username: &str,
        course_name: &str,
    ) -> Result<String, EngineError> {
        let registry = self.registry.read().await;
        views::view_course_students(&registry, instructor_username, course_name)
    }
}
