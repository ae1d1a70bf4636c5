//! Façade surface: one HTTP route per registration workflow. Handlers take
//! primitive identifiers and hand straight off to the service; outcome
//! messages come back as JSON.

use axum::extract::{Path, Query};
use axum::routing::{delete, patch, post};
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::engine::{ApprovalOutcome, GradeOutcome, RegistrationOutcome};
use crate::error::AppError;
use crate::models::registry::CourseFilter;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SectionRegistrationRequest {
    username: String,
    course_name: String,
    section_number: i64,
}

#[derive(Debug, Deserialize)]
struct LabRegistrationRequest {
    username: String,
    course_name: String,
    lab_number: i64,
}

#[derive(Debug, Deserialize)]
struct ApprovalRequest {
    instructor_username: String,
    student_username: String,
    course_name: String,
    approve: bool,
}

#[derive(Debug, Deserialize)]
struct ApprovalRequiredRequest {
    instructor_username: String,
    required: bool,
}

#[derive(Debug, Deserialize)]
struct GradeRequest {
    instructor_username: String,
    student_username: String,
    course_name: String,
    grade: i64,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(search_courses))
        .route(
            "/courses/{course_name}/approval-required",
            patch(set_approval_required),
        )
        .route("/students/{username}/schedule", get(view_schedule))
        .route("/students/{username}/grades", get(view_grades))
        .route(
            "/instructors/{username}/courses",
            get(view_courses_teaching),
        )
        .route(
            "/instructors/{username}/courses/{course_name}/students",
            get(view_course_students),
        )
        .route("/registrations/sections", post(register_in_section))
        .route(
            "/registrations/labs",
            post(register_in_lab).patch(reschedule_lab),
        )
        .route(
            "/registrations/{username}/{course_name}",
            delete(drop_course),
        )
        .route("/registrations/{username}", delete(drop_all_courses))
        .route("/approvals", post(approve_deny))
        .route("/grades", post(add_grade))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn search_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Json<MessageResponse> {
    let message = state.service.view_filtered_courses(&filter).await;
    Json(MessageResponse { message })
}

async fn view_schedule(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state.service.view_schedule(&username).await?;
    Ok(Json(MessageResponse { message }))
}

async fn view_grades(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state.service.view_grades(&username).await?;
    Ok(Json(MessageResponse { message }))
}

async fn view_courses_teaching(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state.service.view_courses_teaching(&username).await?;
    Ok(Json(MessageResponse { message }))
}

async fn view_course_students(
    State(state): State<AppState>,
    Path((username, course_name)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state
        .service
        .view_course_students(&username, &course_name)
        .await?;
    Ok(Json(MessageResponse { message }))
}

async fn register_in_section(
    State(state): State<AppState>,
    Json(req): Json<SectionRegistrationRequest>,
) -> Result<Json<RegistrationOutcome>, AppError> {
    let outcome = state
        .service
        .register_in_section(&req.username, &req.course_name, req.section_number)
        .await?;
    Ok(Json(outcome))
}

async fn register_in_lab(
    State(state): State<AppState>,
    Json(req): Json<LabRegistrationRequest>,
) -> Result<Json<RegistrationOutcome>, AppError> {
    let outcome = state
        .service
        .register_in_lab(&req.username, &req.course_name, req.lab_number)
        .await?;
    Ok(Json(outcome))
}

async fn reschedule_lab(
    State(state): State<AppState>,
    Json(req): Json<LabRegistrationRequest>,
) -> Result<Json<RegistrationOutcome>, AppError> {
    let outcome = state
        .service
        .reschedule_lab(&req.username, &req.course_name, req.lab_number)
        .await?;
    Ok(Json(outcome))
}

async fn drop_course(
    State(state): State<AppState>,
    Path((username, course_name)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state.service.drop_course(&username, &course_name).await?;
    Ok(Json(MessageResponse { message }))
}

async fn drop_all_courses(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state.service.drop_all_courses(&username).await?;
    Ok(Json(MessageResponse { message }))
}

async fn approve_deny(
    State(state): State<AppState>,
    Json(req): Json<ApprovalRequest>,
) -> Result<Json<ApprovalOutcome>, AppError> {
    let outcome = state
        .service
        .approve_deny_registration(
            &req.instructor_username,
            &req.student_username,
            &req.course_name,
            req.approve,
        )
        .await?;
    Ok(Json(outcome))
}

async fn set_approval_required(
    State(state): State<AppState>,
    Path(course_name): Path<String>,
    Json(req): Json<ApprovalRequiredRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state
        .service
        .set_approval_required(&req.instructor_username, &course_name, req.required)
        .await?;
    Ok(Json(MessageResponse { message }))
}

async fn add_grade(
    State(state): State<AppState>,
    Json(req): Json<GradeRequest>,
) -> Result<Json<GradeOutcome>, AppError> {
    let grade = u32::try_from(req.grade)
        .map_err(|_| AppError::BadRequest(format!("Grade must be between 0 and 100, got {}", req.grade)))?;
    let outcome = state
        .service
        .add_grade(
            &req.instructor_username,
            &req.student_username,
            &req.course_name,
            grade,
        )
        .await?;
    Ok(Json(outcome))
}
