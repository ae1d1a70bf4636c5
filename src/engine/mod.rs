//! Registration rules engine. Pure synchronous decision logic over the
//! in-memory [`Registry`]; persistence and audit logging happen in the
//! service layer after an operation succeeds.

pub mod error;
pub mod views;

use std::fmt;

use serde::Serialize;

use crate::models::course::RegistrationStatus;
use crate::models::registry::Registry;

pub use error::{EngineError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Section,
    Lab,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Section => f.write_str("section"),
            UnitKind::Lab => f.write_str("lab"),
        }
    }
}

/// Successful registration / reschedule result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome {
    pub course_name: String,
    pub unit: UnitKind,
    pub unit_number: i64,
    pub status: RegistrationStatus,
    pub message: String,
}

/// Successful approve/deny result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalOutcome {
    pub status: RegistrationStatus,
    pub section_number: i64,
    pub message: String,
}

/// Successful grading result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeOutcome {
    pub section_number: i64,
    pub message: String,
}

/// Overload beats approval-required; an unconstrained registration is
/// approved outright.
fn derive_status(overloading: bool, approval_required: bool) -> RegistrationStatus {
    if overloading {
        RegistrationStatus::Pending
    } else if approval_required {
        RegistrationStatus::Tentative
    } else {
        RegistrationStatus::Approved
    }
}

/// Register a student in a section of a course. Precondition order matters:
/// course exists, not already in a section, section exists, capacity, then
/// status derivation.
pub fn register_in_section(
    registry: &mut Registry,
    username: &str,
    course_name: &str,
    section_number: i64,
) -> Result<RegistrationOutcome, EngineError> {
    let overloading = registry
        .students
        .get(username)
        .ok_or(EngineError::StudentNotFound)?
        .is_fully_registered();

    let course = registry
        .courses
        .get_mut(course_name)
        .ok_or(EngineError::CourseNotFound)?;
    if course.find_student_section(username).is_some() {
        return Err(EngineError::AlreadyInSection {
            course: course_name.to_string(),
        });
    }
    let approval_required = course.approval_required;
    let lab_required = course.lab_required;

    let section = course
        .sections
        .get_mut(&section_number)
        .ok_or(EngineError::SectionNotFound)?;
    if !section.roster.space_remaining() {
        return Err(EngineError::SectionFull {
            registered: section.roster.len(),
            max: section.roster.max_registration,
        });
    }

    let status = derive_status(overloading, approval_required);
    section.roster.add(username, status);

    let mut message = match status {
        RegistrationStatus::Pending => "Student is overloading on registered classes, \
             and has been added to section as 'Pending' before department chair approval."
            .to_string(),
        RegistrationStatus::Tentative => format!(
            "{course_name} course requires approval from instructor. Student has been \
             added to section as 'Tentative' before instructor approval."
        ),
        _ => format!("Student successfully registered for {course_name} Section {section_number}"),
    };
    if lab_required {
        message.push_str("\n**Reminder: Student required to register for a lab for this course.**");
    }

    let student = registry
        .students
        .get_mut(username)
        .ok_or(EngineError::StudentNotFound)?;
    student
        .schedule
        .sections
        .insert(course_name.to_string(), section_number);

    Ok(RegistrationOutcome {
        course_name: course_name.to_string(),
        unit: UnitKind::Section,
        unit_number: section_number,
        status,
        message,
    })
}

/// Register a student in a lab. Requires an existing section registration in
/// the same course and no current lab registration there.
pub fn register_in_lab(
    registry: &mut Registry,
    username: &str,
    course_name: &str,
    lab_number: i64,
) -> Result<RegistrationOutcome, EngineError> {
    let overloading = registry
        .students
        .get(username)
        .ok_or(EngineError::StudentNotFound)?
        .is_fully_registered();

    let course = registry
        .courses
        .get_mut(course_name)
        .ok_or(EngineError::CourseNotFound)?;
    if course.find_student_section(username).is_none() {
        return Err(EngineError::NoSectionYet {
            course: course_name.to_string(),
        });
    }
    if course.find_student_lab(username).is_some() {
        return Err(EngineError::AlreadyInLab {
            course: course_name.to_string(),
        });
    }
    let approval_required = course.approval_required;

    let lab = course
        .labs
        .get_mut(&lab_number)
        .ok_or(EngineError::LabNotFound)?;
    if !lab.roster.space_remaining() {
        return Err(EngineError::LabFull {
            registered: lab.roster.len(),
            max: lab.roster.max_registration,
        });
    }

    let status = derive_status(overloading, approval_required);
    lab.roster.add(username, status);

    let message = match status {
        RegistrationStatus::Pending => "Student is overloading on registered classes, \
             and has been added to lab as 'Pending' before department chair approval."
            .to_string(),
        RegistrationStatus::Tentative => format!(
            "{course_name} course requires approval from instructor. Student has been \
             added to lab as 'Tentative' before instructor approval."
        ),
        _ => format!("Student successfully registered for {course_name} Lab {lab_number}"),
    };

    let student = registry
        .students
        .get_mut(username)
        .ok_or(EngineError::StudentNotFound)?;
    student
        .schedule
        .labs
        .insert(course_name.to_string(), lab_number);

    Ok(RegistrationOutcome {
        course_name: course_name.to_string(),
        unit: UnitKind::Lab,
        unit_number: lab_number,
        status,
        message,
    })
}

/// Move a student from their current lab in a course to another one. The
/// target lab's capacity is checked before the old seat is released, so
/// rescheduling into a full lab fails even if it is the student's own.
pub fn reschedule_lab(
    registry: &mut Registry,
    username: &str,
    course_name: &str,
    new_lab_number: i64,
) -> Result<RegistrationOutcome, EngineError> {
    let overloading = registry
        .students
        .get(username)
        .ok_or(EngineError::StudentNotFound)?
        .is_fully_registered();

    let course = registry
        .courses
        .get_mut(course_name)
        .ok_or(EngineError::CourseNotFound)?;
    if course.find_student_section(username).is_none() {
        return Err(EngineError::NoSectionYet {
            course: course_name.to_string(),
        });
    }
    let old_lab_number = course
        .find_student_lab(username)
        .map(|l| l.number)
        .ok_or(EngineError::NotInLabYet {
            course: course_name.to_string(),
        })?;
    let approval_required = course.approval_required;

    {
        let lab = course
            .labs
            .get(&new_lab_number)
            .ok_or(EngineError::LabNotFound)?;
        if !lab.roster.space_remaining() {
            return Err(EngineError::LabFull {
                registered: lab.roster.len(),
                max: lab.roster.max_registration,
            });
        }
    }

    // Release the old seat before taking the new one.
    if let Some(old_lab) = course.labs.get_mut(&old_lab_number) {
        old_lab.roster.remove(username);
    }

    let status = derive_status(overloading, approval_required);
    if let Some(lab) = course.labs.get_mut(&new_lab_number) {
        lab.roster.add(username, status);
    }

    let message = match status {
        RegistrationStatus::Pending => "Student is overloading on registered classes, \
             and has been added to rescheduled lab as 'Pending' before department chair approval."
            .to_string(),
        RegistrationStatus::Tentative => format!(
            "{course_name} course requires approval from instructor. Student has been \
             added to rescheduled lab as 'Tentative' before instructor approval."
        ),
        _ => format!("Student successfully rescheduled into {course_name} lab {new_lab_number}"),
    };

    let student = registry
        .students
        .get_mut(username)
        .ok_or(EngineError::StudentNotFound)?;
    student
        .schedule
        .labs
        .insert(course_name.to_string(), new_lab_number);

    Ok(RegistrationOutcome {
        course_name: course_name.to_string(),
        unit: UnitKind::Lab,
        unit_number: new_lab_number,
        status,
        message,
    })
}

/// Drop whichever of section/lab the student holds in the course.
pub fn drop_course(
    registry: &mut Registry,
    username: &str,
    course_name: &str,
) -> Result<String, EngineError> {
    let (section_number, lab_number) = {
        let student = registry
            .students
            .get(username)
            .ok_or(EngineError::StudentNotFound)?;
        (
            student.schedule.section_in(course_name),
            student.schedule.lab_in(course_name),
        )
    };
    if section_number.is_none() && lab_number.is_none() {
        return Err(EngineError::NotRegistered {
            course: course_name.to_string(),
        });
    }

    if let Some(course) = registry.courses.get_mut(course_name) {
        if let Some(number) = section_number
            && let Some(section) = course.sections.get_mut(&number)
        {
            section.roster.remove(username);
        }
        if let Some(number) = lab_number
            && let Some(lab) = course.labs.get_mut(&number)
        {
            lab.roster.remove(username);
        }
    }

    let student = registry
        .students
        .get_mut(username)
        .ok_or(EngineError::StudentNotFound)?;
    student.schedule.sections.remove(course_name);
    student.schedule.labs.remove(course_name);

    Ok(format!("Student has successfully dropped {course_name}"))
}

/// Remove the student from every roster in their schedule and clear it.
pub fn drop_all_courses(registry: &mut Registry, username: &str) -> Result<String, EngineError> {
    let (sections, labs) = {
        let student = registry
            .students
            .get_mut(username)
            .ok_or(EngineError::StudentNotFound)?;
        if student.schedule.is_empty() {
            return Err(EngineError::NothingToDrop);
        }
        (
            std::mem::take(&mut student.schedule.sections),
            std::mem::take(&mut student.schedule.labs),
        )
    };

    for (course_name, number) in sections {
        if let Some(course) = registry.courses.get_mut(&course_name)
            && let Some(section) = course.sections.get_mut(&number)
        {
            section.roster.remove(username);
        }
    }
    for (course_name, number) in labs {
        if let Some(course) = registry.courses.get_mut(&course_name)
            && let Some(lab) = course.labs.get_mut(&number)
        {
            lab.roster.remove(username);
        }
    }

    Ok("Student has successfully dropped all courses from schedule".to_string())
}

/// Approve or deny a student's registration in a course the instructor
/// teaches. `Pending` entries (overloads) need a department chair. The lab
/// entry, if any, mirrors the section's new status without a capacity check.
pub fn approve_deny_registration(
    registry: &mut Registry,
    instructor_username: &str,
    student_username: &str,
    course_name: &str,
    approve: bool,
) -> Result<ApprovalOutcome, EngineError> {
    let is_chair = {
        let instructor = registry
            .instructors
            .get(instructor_username)
            .ok_or(EngineError::InstructorNotFound)?;
        if !instructor.teaches(course_name) {
            return Err(EngineError::NotInstructorOfCourse {
                course: course_name.to_string(),
            });
        }
        instructor.is_department_chair
    };

    let course = registry
        .courses
        .get_mut(course_name)
        .ok_or(EngineError::CourseNotFound)?;
    let section =
        course
            .find_student_section_mut(student_username)
            .ok_or(EngineError::StudentNotRegistered {
                student: student_username.to_string(),
                course: course_name.to_string(),
            })?;

    if section.roster.status_of(student_username) == Some(RegistrationStatus::Pending) && !is_chair
    {
        return Err(EngineError::ChairApprovalRequired);
    }

    let status = if approve {
        RegistrationStatus::Approved
    } else {
        RegistrationStatus::Denied
    };
    section.roster.set_status(student_username, status);
    let section_number = section.number;

    let mut message = if approve {
        format!(
            "Student '{student_username}' is now approved for {course_name} section {section_number}"
        )
    } else {
        format!(
            "Student '{student_username}' has been denied for {course_name} section {section_number}"
        )
    };

    if let Some(lab) = course.find_student_lab_mut(student_username) {
        lab.roster.set_status(student_username, status);
        if approve {
            message.push_str(&format!(
                "\nStudent '{student_username}' is now approved for {course_name} lab {}",
                lab.number
            ));
        } else {
            message.push_str(&format!(
                "\nStudent '{student_username}' has been denied for {course_name} lab {}",
                lab.number
            ));
        }
    }

    Ok(ApprovalOutcome {
        status,
        section_number,
        message,
    })
}

/// Toggle whether a course needs instructor approval for new registrations.
pub fn set_approval_required(
    registry: &mut Registry,
    instructor_username: &str,
    course_name: &str,
    required: bool,
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
        .get_mut(course_name)
        .ok_or(EngineError::CourseNotFound)?;
    course.approval_required = required;

    if required {
        Ok(format!(
            "{course_name} has been set to instructor approval required"
        ))
    } else {
        Ok(format!(
            "{course_name} has been set to instructor approval not required"
        ))
    }
}

/// Append a grade to the student's ledger in the section they hold in the
/// instructor's course.
pub fn add_grade(
    registry: &mut Registry,
    instructor_username: &str,
    student_username: &str,
    course_name: &str,
    grade: u32,
) -> Result<GradeOutcome, EngineError> {
    if grade > 100 {
        return Err(EngineError::GradeOutOfRange { grade });
    }

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
        .get_mut(course_name)
        .ok_or(EngineError::CourseNotFound)?;
    let section =
        course
            .find_student_section_mut(student_username)
            .ok_or(EngineError::StudentNotRegistered {
                student: student_username.to_string(),
                course: course_name.to_string(),
            })?;

    section.grade_book.add_grade(student_username, grade);

    Ok(GradeOutcome {
        section_number: section.number,
        message: format!(
            "Grade successfully added to Student '{student_username}' in {course_name} section {}",
            section.number
        ),
    })
}
