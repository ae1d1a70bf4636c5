use std::collections::{BTreeMap, BTreeSet};

use registrar::engine::{self, EngineError, UnitKind, views};
use registrar::models::course::{Course, RegistrationStatus};
use registrar::models::people::{Instructor, Schedule, Student};
use registrar::models::registry::{CourseFilter, Registry};

fn student(username: &str, first: &str, last: &str, is_full_time: bool) -> Student {
    Student {
        username: username.to_string(),
        university_id: format!("U-{username}"),
        first_name: first.to_string(),
        last_name: last.to_string(),
        department: "Computer Science".to_string(),
        is_full_time,
        major: "CS".to_string(),
        program: "MPCS".to_string(),
        schedule: Schedule::default(),
    }
}

fn instructor(username: &str, first: &str, last: &str, is_chair: bool) -> Instructor {
    Instructor {
        username: username.to_string(),
        university_id: format!("U-{username}"),
        first_name: first.to_string(),
        last_name: last.to_string(),
        department: "Computer Science".to_string(),
        division: "Physical Sciences".to_string(),
        is_department_chair: is_chair,
        courses_teaching: BTreeSet::new(),
    }
}

fn course(
    name: &str,
    number: i64,
    instructor_name: &str,
    instructor_username: &str,
    approval_required: bool,
    lab_required: bool,
) -> Course {
    Course {
        name: name.to_string(),
        number,
        department: "Computer Science".to_string(),
        division: "Physical Sciences".to_string(),
        program: "MPCS".to_string(),
        lab_required,
        approval_required,
        instructor_name: instructor_name.to_string(),
        instructor_username: instructor_username.to_string(),
        sections: BTreeMap::new(),
        labs: BTreeMap::new(),
    }
}

/// One chair (gbrady) and one regular instructor (tchard); CS101 has two
/// sections and two labs and requires a lab; Databases requires instructor
/// approval; Filler1-3 pad out schedules for overload scenarios.
fn setup() -> Registry {
    let mut registry = Registry::new();
    registry.add_student(student("stu1", "Ada", "Lovelace", true));
    registry.add_student(student("stu2", "Alan", "Turing", false));
    registry.add_instructor(instructor("gbrady", "Gerry", "Brady", true));
    registry.add_instructor(instructor("tchard", "Tana", "Chard", false));

    let mut cs101 = course("CS101", 50101, "Gerry Brady", "gbrady", false, true);
    cs101.add_section(1, 2, "2:30PM", "Tuesday");
    cs101.add_section(2, 2, "5:30PM", "Tuesday");
    cs101.add_lab(1, 2, "4:30PM", "Monday");
    cs101.add_lab(2, 2, "9:30AM", "Friday");
    registry.add_course(cs101);

    let mut databases = course("Databases", 53001, "Tana Chard", "tchard", true, false);
    databases.add_section(1, 10, "1:00PM", "Wednesday");
    registry.add_course(databases);

    for (i, name) in ["Filler1", "Filler2", "Filler3"].iter().enumerate() {
        let mut filler = course(name, 60000 + i as i64, "Gerry Brady", "gbrady", false, false);
        filler.add_section(1, 30, "9:00AM", "Monday");
        registry.add_course(filler);
    }

    registry
}

#[test]
fn end_to_end_section_registration() {
    let mut registry = setup();

    let outcome = engine::register_in_section(&mut registry, "stu1", "CS101", 1)
        .expect("registration should succeed");

    assert_eq!(outcome.status, RegistrationStatus::Approved);
    assert_eq!(outcome.unit, UnitKind::Section);
    assert!(
        outcome
            .message
            .starts_with("Student successfully registered for CS101 Section 1")
    );
    assert!(outcome.message.contains("register for a lab"));

    let section = registry.courses["CS101"].section(1).unwrap();
    assert_eq!(
        section.roster.status_of("stu1"),
        Some(RegistrationStatus::Approved)
    );
    assert_eq!(registry.students["stu1"].schedule.section_in("CS101"), Some(1));
}

#[test]
fn no_lab_reminder_when_course_has_no_lab_requirement() {
    let mut registry = setup();
    let outcome = engine::register_in_section(&mut registry, "stu1", "Filler1", 1)
        .expect("registration should succeed");
    assert!(!outcome.message.contains("Reminder"));
}

#[test]
fn missing_entities_are_reported_in_precondition_order() {
    let mut registry = setup();

    assert_eq!(
        engine::register_in_section(&mut registry, "ghost", "CS101", 1),
        Err(EngineError::StudentNotFound)
    );
    assert_eq!(
        engine::register_in_section(&mut registry, "stu1", "Basketweaving", 1),
        Err(EngineError::CourseNotFound)
    );
    assert_eq!(
        engine::register_in_section(&mut registry, "stu1", "CS101", 99),
        Err(EngineError::SectionNotFound)
    );
}

#[test]
fn capacity_invariant_holds_for_full_sections() {
    let mut registry = setup();
    registry.add_student(student("stu3", "Grace", "Hopper", true));

    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_section(&mut registry, "stu2", "CS101", 1).unwrap();

    let err = engine::register_in_section(&mut registry, "stu3", "CS101", 1).unwrap_err();
    assert_eq!(err, EngineError::SectionFull { registered: 2, max: 2 });

    // Roster unchanged, schedule untouched.
    let section = registry.courses["CS101"].section(1).unwrap();
    assert_eq!(section.roster.len(), 2);
    assert!(!section.roster.contains("stu3"));
    assert!(registry.students["stu3"].schedule.is_empty());
}

#[test]
fn single_registration_invariant_per_course() {
    let mut registry = setup();
    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();

    // A second section in the same course is rejected, even a different one.
    let err = engine::register_in_section(&mut registry, "stu1", "CS101", 2).unwrap_err();
    assert_eq!(
        err,
        EngineError::AlreadyInSection {
            course: "CS101".to_string()
        }
    );
    assert!(registry.courses["CS101"].section(2).unwrap().roster.is_empty());
}

#[test]
fn full_time_student_overloads_on_fourth_section() {
    let mut registry = setup();
    engine::register_in_section(&mut registry, "stu1", "Filler1", 1).unwrap();
    engine::register_in_section(&mut registry, "stu1", "Filler2", 1).unwrap();
    engine::register_in_section(&mut registry, "stu1", "Filler3", 1).unwrap();

    let outcome = engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Pending);
    assert!(outcome.message.contains("overloading"));
}

#[test]
fn part_time_student_overloads_on_third_section() {
    let mut registry = setup();
    engine::register_in_section(&mut registry, "stu2", "Filler1", 1).unwrap();
    let outcome = engine::register_in_section(&mut registry, "stu2", "Filler2", 1).unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Approved);

    let outcome = engine::register_in_section(&mut registry, "stu2", "CS101", 1).unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Pending);
}

#[test]
fn approval_required_course_admits_as_tentative() {
    let mut registry = setup();
    let outcome = engine::register_in_section(&mut registry, "stu1", "Databases", 1).unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Tentative);
    assert!(outcome.message.contains("requires approval from instructor"));
}

#[test]
fn overload_takes_precedence_over_approval_required() {
    let mut registry = setup();
    engine::register_in_section(&mut registry, "stu1", "Filler1", 1).unwrap();
    engine::register_in_section(&mut registry, "stu1", "Filler2", 1).unwrap();
    engine::register_in_section(&mut registry, "stu1", "Filler3", 1).unwrap();

    let outcome = engine::register_in_section(&mut registry, "stu1", "Databases", 1).unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Pending);
}

#[test]
fn lab_registration_requires_section_first() {
    let mut registry = setup();
    assert_eq!(
        engine::register_in_lab(&mut registry, "stu1", "CS101", 1),
        Err(EngineError::NoSectionYet {
            course: "CS101".to_string()
        })
    );

    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    let outcome = engine::register_in_lab(&mut registry, "stu1", "CS101", 1).unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Approved);
    assert_eq!(outcome.unit, UnitKind::Lab);
    assert_eq!(registry.students["stu1"].schedule.lab_in("CS101"), Some(1));

    assert_eq!(
        engine::register_in_lab(&mut registry, "stu1", "CS101", 2),
        Err(EngineError::AlreadyInLab {
            course: "CS101".to_string()
        })
    );
}

#[test]
fn lab_capacity_is_enforced() {
    let mut registry = setup();
    registry.add_student(student("stu3", "Grace", "Hopper", true));

    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_section(&mut registry, "stu2", "CS101", 1).unwrap();
    engine::register_in_section(&mut registry, "stu3", "CS101", 2).unwrap();
    engine::register_in_lab(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_lab(&mut registry, "stu2", "CS101", 1).unwrap();

    assert_eq!(
        engine::register_in_lab(&mut registry, "stu3", "CS101", 1),
        Err(EngineError::LabFull { registered: 2, max: 2 })
    );
    assert_eq!(
        engine::register_in_lab(&mut registry, "stu3", "CS101", 99),
        Err(EngineError::LabNotFound)
    );
}

#[test]
fn reschedule_moves_student_between_lab_rosters() {
    let mut registry = setup();
    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();

    assert_eq!(
        engine::reschedule_lab(&mut registry, "stu1", "CS101", 2),
        Err(EngineError::NotInLabYet {
            course: "CS101".to_string()
        })
    );

    engine::register_in_lab(&mut registry, "stu1", "CS101", 1).unwrap();
    let outcome = engine::reschedule_lab(&mut registry, "stu1", "CS101", 2).unwrap();
    assert_eq!(
        outcome.message,
        "Student successfully rescheduled into CS101 lab 2"
    );

    // The old roster no longer holds the student; the new one does.
    let course = &registry.courses["CS101"];
    assert!(!course.lab(1).unwrap().roster.contains("stu1"));
    assert!(course.lab(2).unwrap().roster.contains("stu1"));
    assert_eq!(registry.students["stu1"].schedule.lab_in("CS101"), Some(2));
}

#[test]
fn drop_course_boundary_and_exact_removal() {
    let mut registry = setup();
    assert_eq!(
        engine::drop_course(&mut registry, "stu1", "CS101"),
        Err(EngineError::NotRegistered {
            course: "CS101".to_string()
        })
    );

    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_lab(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_section(&mut registry, "stu1", "Filler1", 1).unwrap();

    let message = engine::drop_course(&mut registry, "stu1", "CS101").unwrap();
    assert_eq!(message, "Student has successfully dropped CS101");

    let course = &registry.courses["CS101"];
    assert!(!course.section(1).unwrap().roster.contains("stu1"));
    assert!(!course.lab(1).unwrap().roster.contains("stu1"));
    // Other registrations stay put.
    assert_eq!(
        registry.students["stu1"].schedule.section_in("Filler1"),
        Some(1)
    );
    assert!(registry.courses["Filler1"].section(1).unwrap().roster.contains("stu1"));
}

#[test]
fn drop_all_clears_every_roster_and_the_schedule() {
    let mut registry = setup();
    assert_eq!(
        engine::drop_all_courses(&mut registry, "stu1"),
        Err(EngineError::NothingToDrop)
    );

    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_lab(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_section(&mut registry, "stu1", "Filler1", 1).unwrap();

    engine::drop_all_courses(&mut registry, "stu1").unwrap();

    assert!(registry.students["stu1"].schedule.is_empty());
    assert!(!registry.courses["CS101"].section(1).unwrap().roster.contains("stu1"));
    assert!(!registry.courses["CS101"].lab(1).unwrap().roster.contains("stu1"));
    assert!(!registry.courses["Filler1"].section(1).unwrap().roster.contains("stu1"));
}

#[test]
fn pending_registrations_need_a_department_chair() {
    let mut registry = setup();
    // Overload stu2 (part-time) so the Databases registration lands Pending.
    engine::register_in_section(&mut registry, "stu2", "Filler1", 1).unwrap();
    engine::register_in_section(&mut registry, "stu2", "Filler2", 1).unwrap();
    let outcome = engine::register_in_section(&mut registry, "stu2", "Databases", 1).unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Pending);

    // tchard teaches Databases but is not a chair.
    assert_eq!(
        engine::approve_deny_registration(&mut registry, "tchard", "stu2", "Databases", true),
        Err(EngineError::ChairApprovalRequired)
    );
    assert_eq!(
        registry.courses["Databases"]
            .section(1)
            .unwrap()
            .roster
            .status_of("stu2"),
        Some(RegistrationStatus::Pending)
    );

    // The chair does not teach Databases, so cannot act either.
    assert_eq!(
        engine::approve_deny_registration(&mut registry, "gbrady", "stu2", "Databases", true),
        Err(EngineError::NotInstructorOfCourse {
            course: "Databases".to_string()
        })
    );
}

#[test]
fn approval_mirrors_status_onto_lab_entry() {
    let mut registry = setup();
    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_lab(&mut registry, "stu1", "CS101", 1).unwrap();

    let outcome =
        engine::approve_deny_registration(&mut registry, "gbrady", "stu1", "CS101", false)
            .unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Denied);
    assert!(outcome.message.contains("section 1"));
    assert!(outcome.message.contains("lab 1"));

    let course = &registry.courses["CS101"];
    assert_eq!(
        course.section(1).unwrap().roster.status_of("stu1"),
        Some(RegistrationStatus::Denied)
    );
    assert_eq!(
        course.lab(1).unwrap().roster.status_of("stu1"),
        Some(RegistrationStatus::Denied)
    );

    // A denied entry can be re-approved by the same instructor.
    let outcome =
        engine::approve_deny_registration(&mut registry, "gbrady", "stu1", "CS101", true).unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Approved);
}

#[test]
fn approval_requires_a_registered_student() {
    let mut registry = setup();
    assert_eq!(
        engine::approve_deny_registration(&mut registry, "gbrady", "stu1", "CS101", true),
        Err(EngineError::StudentNotRegistered {
            student: "stu1".to_string(),
            course: "CS101".to_string()
        })
    );
}

#[test]
fn approval_required_toggle() {
    let mut registry = setup();
    assert_eq!(
        engine::set_approval_required(&mut registry, "tchard", "CS101", true),
        Err(EngineError::NotInstructorOfCourse {
            course: "CS101".to_string()
        })
    );

    let message = engine::set_approval_required(&mut registry, "gbrady", "CS101", true).unwrap();
    assert_eq!(message, "CS101 has been set to instructor approval required");
    assert!(registry.courses["CS101"].approval_required);

    // New registrations now come in Tentative.
    let outcome = engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    assert_eq!(outcome.status, RegistrationStatus::Tentative);

    let message = engine::set_approval_required(&mut registry, "gbrady", "CS101", false).unwrap();
    assert_eq!(
        message,
        "CS101 has been set to instructor approval not required"
    );
}

#[test]
fn grades_accumulate_and_average_rounds() {
    let mut registry = setup();
    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();

    engine::add_grade(&mut registry, "gbrady", "stu1", "CS101", 85).unwrap();
    let outcome = engine::add_grade(&mut registry, "gbrady", "stu1", "CS101", 95).unwrap();
    assert_eq!(outcome.section_number, 1);

    let report = views::view_grades(&registry, "stu1").unwrap();
    assert!(report.contains("Grades: 85, 95"));
    assert!(report.contains("Average: 90"));
}

#[test]
fn grading_preconditions() {
    let mut registry = setup();
    assert_eq!(
        engine::add_grade(&mut registry, "gbrady", "stu1", "CS101", 101),
        Err(EngineError::GradeOutOfRange { grade: 101 })
    );
    assert_eq!(
        engine::add_grade(&mut registry, "gbrady", "stu1", "CS101", 90),
        Err(EngineError::StudentNotRegistered {
            student: "stu1".to_string(),
            course: "CS101".to_string()
        })
    );
    assert_eq!(
        engine::add_grade(&mut registry, "tchard", "stu1", "CS101", 90),
        Err(EngineError::NotInstructorOfCourse {
            course: "CS101".to_string()
        })
    );
}

#[test]
fn schedule_view_shows_registrations_and_status() {
    let mut registry = setup();
    let report = views::view_schedule(&registry, "stu1").unwrap();
    assert!(report.contains("ADA LOVELACE SCHEDULE"));
    assert!(report.contains("Student is not currently enrolled in any courses"));

    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_lab(&mut registry, "stu1", "CS101", 1).unwrap();
    let report = views::view_schedule(&registry, "stu1").unwrap();
    assert!(report.contains("Sections Registered:"));
    assert!(report.contains("Labs Registered:"));
    assert!(report.contains("MPCS 50101-1: CS101"));
    assert!(report.contains("Registration Status: Approved"));
}

#[test]
fn grades_view_reports_missing_grades() {
    let mut registry = setup();
    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    let report = views::view_grades(&registry, "stu1").unwrap();
    assert!(report.contains("No grades recorded for this course"));
}

#[test]
fn filtered_course_search() {
    let registry = setup();

    let none = views::view_filtered_courses(
        &registry,
        &CourseFilter {
            number: Some(99999),
            ..Default::default()
        },
    );
    assert_eq!(none, "No courses found matching criteria");

    let report = views::view_filtered_courses(
        &registry,
        &CourseFilter {
            instructor_name: Some("Tana Chard".to_string()),
            ..Default::default()
        },
    );
    assert!(report.contains("SEARCH RESULTS"));
    assert!(report.contains("Databases"));
    assert!(report.contains("Instructor Approval Required"));
    assert!(!report.contains("CS101"));
}

#[test]
fn courses_teaching_view() {
    let registry = setup();
    let report = views::view_courses_teaching(&registry, "gbrady").unwrap();
    assert!(report.contains("GERRY BRADY COURSES"));
    assert!(report.contains("CS101"));
    assert!(report.contains("Filler1"));
    assert!(!report.contains("Databases"));
}

#[test]
fn course_students_view_dedupes_by_identity() {
    let mut registry = setup();
    engine::register_in_section(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_lab(&mut registry, "stu1", "CS101", 1).unwrap();
    engine::register_in_section(&mut registry, "stu2", "CS101", 2).unwrap();

    assert_eq!(
        views::view_course_students(&registry, "tchard", "CS101"),
        Err(EngineError::NotInstructorOfCourse {
            course: "CS101".to_string()
        })
    );

    let report = views::view_course_students(&registry, "gbrady", "CS101").unwrap();
    assert!(report.contains("Students Registered:"));
    // stu1 holds both a section and a lab but is listed once.
    assert_eq!(report.matches("Student(stu1)").count(), 1);
    assert_eq!(report.matches("Student(stu2)").count(), 1);
}
