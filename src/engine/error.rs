use thiserror::Error;

/// Broad classification of a business failure, used by the HTTP layer to
/// pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    PermissionDenied,
    Validation,
}

/// Every expected business failure of the rules engine. The `Display` text
/// is the user-facing outcome message; callers branch on the variant, never
/// on the text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Course not found")]
    CourseNotFound,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Instructor not found")]
    InstructorNotFound,

    #[error("Student already registered for section in {course}")]
    AlreadyInSection { course: String },

    #[error("Section not found")]
    SectionNotFound,

    #[error("Registration denied. Section is full: {registered} / {max} students registered")]
    SectionFull { registered: usize, max: usize },

    #[error("Student must first register in a section in {course} before registering in a lab")]
    NoSectionYet { course: String },

    #[error(
        "Student already registered for lab in {course}. Use the reschedule lab operation to change into a different lab"
    )]
    AlreadyInLab { course: String },

    #[error(
        "Student is not already registered for lab in {course}. Use the register in lab operation to register for a lab in this course"
    )]
    NotInLabYet { course: String },

    #[error("Lab not found")]
    LabNotFound,

    #[error("Registration denied. Lab is full: {registered} / {max} students registered")]
    LabFull { registered: usize, max: usize },

    #[error("Student is not currently registered in {course}")]
    NotRegistered { course: String },

    #[error("Student is not currently registered in any course")]
    NothingToDrop,

    #[error("Instructor does not teach {course}")]
    NotInstructorOfCourse { course: String },

    #[error("Student {student} not registered in {course}")]
    StudentNotRegistered { student: String, course: String },

    #[error("Only department chair can approve / deny 'Pending' student registrations. No action taken.")]
    ChairApprovalRequired,

    #[error("Grade must be between 0 and 100, got {grade}")]
    GradeOutOfRange { grade: u32 },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::CourseNotFound
            | EngineError::StudentNotFound
            | EngineError::InstructorNotFound
            | EngineError::SectionNotFound
            | EngineError::LabNotFound => ErrorKind::NotFound,
            EngineError::AlreadyInSection { .. }
            | EngineError::SectionFull { .. }
            | EngineError::NoSectionYet { .. }
            | EngineError::AlreadyInLab { .. }
            | EngineError::NotInLabYet { .. }
            | EngineError::LabFull { .. }
            | EngineError::NotRegistered { .. }
            | EngineError::NothingToDrop
            | EngineError::StudentNotRegistered { .. } => ErrorKind::Conflict,
            EngineError::NotInstructorOfCourse { .. } | EngineError::ChairApprovalRequired => {
                ErrorKind::PermissionDenied
            }
            EngineError::GradeOutOfRange { .. } => ErrorKind::Validation,
        }
    }
}
