//! Unit tests for the service layer, run against the in-memory repository.

use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::api::{LeaveStatus, Role};
use crate::auth::TokenSigner;
use crate::db::repositories::LocalRepository;
use crate::db::services::{
    self, AttendanceRowInput, LeaveRequestInput, ResultInput, ServiceError,
};

fn signer() -> TokenSigner {
    TokenSigner::new("unit-test-secret")
}

async fn seed_student(repo: &LocalRepository, name: &str, email: &str) -> i64 {
    services::create_student(
        repo,
        Some(name.to_string()),
        Some(email.to_string()),
        None,
        Some("pw123456".to_string()),
    )
    .await
    .unwrap()
    .student
    .id
    .value()
}

fn attendance_row(id: Option<i64>, name: Option<&str>, status: Option<&str>) -> AttendanceRowInput {
    AttendanceRowInput {
        student_id: id.map(|i| json!(i)),
        student_name: name.map(|n| n.to_string()),
        status: status.map(|s| s.to_string()),
    }
}

// =========================================================
// Authentication
// =========================================================

#[tokio::test]
async fn test_login_issues_token_with_identity_and_role() {
    let repo = LocalRepository::new();
    services::create_staff(
        &repo,
        Some("Jane Staff".to_string()),
        Some("jane@example.com".to_string()),
        None,
        Some("hunter22".to_string()),
    )
    .await
    .unwrap();

    let now = Utc::now();
    let success = services::login(
        &repo,
        &signer(),
        Some("jane@example.com"),
        Some("hunter22"),
        None,
        now,
    )
    .await
    .unwrap();

    let claims = signer().verify(&success.token, now).unwrap();
    assert_eq!(claims.sub, success.profile.user.id.value());
    assert_eq!(claims.role, Role::Staff);
    // Username defaults to email, so login by username works too.
    services::login(&repo, &signer(), Some("jane@example.com"), Some("hunter22"), Some("STAFF"), now)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_user() {
    let repo = LocalRepository::new();
    services::create_staff(
        &repo,
        Some("Jane".to_string()),
        Some("jane@example.com".to_string()),
        None,
        Some("hunter22".to_string()),
    )
    .await
    .unwrap();

    let wrong = services::login(&repo, &signer(), Some("jane@example.com"), Some("nope"), None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(wrong, ServiceError::InvalidCredentials));

    let unknown = services::login(&repo, &signer(), Some("ghost@example.com"), Some("pw"), None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(unknown, ServiceError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_role_mismatch_with_correct_credentials() {
    let repo = LocalRepository::new();
    seed_student(&repo, "Sam Student", "sam@example.com").await;

    let err = services::login(
        &repo,
        &signer(),
        Some("sam@example.com"),
        Some("pw123456"),
        Some("admin"),
        Utc::now(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::RoleMismatch));
}

#[tokio::test]
async fn test_login_missing_credentials() {
    let repo = LocalRepository::new();
    let err = services::login(&repo, &signer(), Some("someone"), None, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_student_login_includes_course_extras() {
    let repo = LocalRepository::new();
    services::create_course(&repo, Some("Computer Science".to_string()), Some("CSE".to_string()))
        .await
        .unwrap();
    services::create_student(
        &repo,
        Some("Sam".to_string()),
        Some("sam@example.com".to_string()),
        Some("CSE".to_string()),
        Some("pw123456".to_string()),
    )
    .await
    .unwrap();

    let success = services::login(
        &repo,
        &signer(),
        Some("sam@example.com"),
        Some("pw123456"),
        Some("student"),
        Utc::now(),
    )
    .await
    .unwrap();

    assert!(success.profile.student_id.is_some());
    assert_eq!(success.profile.course_name.as_deref(), Some("Computer Science"));
}

#[tokio::test]
async fn test_current_user_unknown_id_is_not_found() {
    let repo = LocalRepository::new();
    let err = services::current_user(&repo, crate::api::UserId::new(404))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

// =========================================================
// Courses, staff, students
// =========================================================

#[tokio::test]
async fn test_duplicate_course_name_rejected_and_listing_sorted() {
    let repo = LocalRepository::new();
    services::create_course(&repo, Some("Mechanical".to_string()), None).await.unwrap();
    services::create_course(&repo, Some("Civil".to_string()), None).await.unwrap();

    let err = services::create_course(&repo, Some("Civil".to_string()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let names: Vec<String> = services::list_courses(&repo)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Civil", "Mechanical"]);
}

#[tokio::test]
async fn test_staff_duplicate_email_rejected() {
    let repo = LocalRepository::new();
    services::create_staff(
        &repo,
        Some("A".to_string()),
        Some("dup@example.com".to_string()),
        None,
        Some("pw".to_string()),
    )
    .await
    .unwrap();

    let err = services::create_staff(
        &repo,
        Some("B".to_string()),
        Some("dup@example.com".to_string()),
        None,
        Some("pw".to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_staff_unknown_course_reference_is_silently_unset() {
    let repo = LocalRepository::new();
    let created = services::create_staff(
        &repo,
        Some("A".to_string()),
        Some("a@example.com".to_string()),
        Some("No Such Course".to_string()),
        Some("pw".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(created.user.course_id, None);
    assert_eq!(created.course_name, "");
}

#[tokio::test]
async fn test_student_creation_requires_password() {
    let repo = LocalRepository::new();
    let err = services::create_student(
        &repo,
        Some("Sam".to_string()),
        Some("sam@example.com".to_string()),
        None,
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_list_students_unknown_course_is_empty() {
    let repo = LocalRepository::new();
    seed_student(&repo, "Sam", "sam@example.com").await;

    assert_eq!(services::list_students(&repo, None).await.unwrap().len(), 1);
    assert!(services::list_students(&repo, Some("Ghost Course"))
        .await
        .unwrap()
        .is_empty());
}

// =========================================================
// Attendance
// =========================================================

#[tokio::test]
async fn test_attendance_resubmission_replaces_previous_set() {
    let repo = LocalRepository::new();
    services::create_course(&repo, Some("CSE".to_string()), None).await.unwrap();
    let alice = seed_student(&repo, "Alice", "alice@example.com").await;
    let bob = seed_student(&repo, "Bob", "bob@example.com").await;

    services::submit_attendance(
        &repo,
        Some("2024-03-01"),
        Some("CSE"),
        vec![
            attendance_row(Some(alice), None, Some("present")),
            attendance_row(Some(bob), None, Some("absent")),
        ],
    )
    .await
    .unwrap();

    let outcome = services::submit_attendance(
        &repo,
        Some("2024-03-01"),
        Some("CSE"),
        vec![attendance_row(Some(bob), None, Some("present"))],
    )
    .await
    .unwrap();
    assert_eq!(outcome.applied, 1);

    let entries = services::get_attendance(&repo, Some("2024-03-01"), Some("CSE"))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].student_id.value(), bob);
}

#[tokio::test]
async fn test_attendance_unresolved_students_skipped_but_reported() {
    let repo = LocalRepository::new();
    let alice = seed_student(&repo, "Alice", "alice@example.com").await;

    let outcome = services::submit_attendance(
        &repo,
        Some("2024-03-01"),
        None,
        vec![
            attendance_row(Some(alice), None, None),
            attendance_row(Some(9999), Some("Nobody"), Some("present")),
        ],
    )
    .await
    .unwrap();

    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].student_name.as_deref(), Some("Nobody"));

    let entries = services::get_attendance(&repo, Some("2024-03-01"), None)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    // Blank status defaulted.
    assert_eq!(entries[0].status, "present");
}

#[tokio::test]
async fn test_attendance_resolves_student_by_name_fallback() {
    let repo = LocalRepository::new();
    let alice = seed_student(&repo, "Alice", "alice@example.com").await;

    let outcome = services::submit_attendance(
        &repo,
        Some("2024-03-02"),
        None,
        vec![attendance_row(None, Some("Alice"), Some("Absent"))],
    )
    .await
    .unwrap();
    assert_eq!(outcome.applied, 1);

    let entries = services::get_attendance(&repo, Some("2024-03-02"), None)
        .await
        .unwrap();
    assert_eq!(entries[0].student_id.value(), alice);
    // Status is lower-cased on the way in.
    assert_eq!(entries[0].status, "absent");
}

#[tokio::test]
async fn test_attendance_rejects_bad_dates() {
    let repo = LocalRepository::new();
    let missing = services::submit_attendance(&repo, None, None, vec![]).await.unwrap_err();
    assert!(matches!(missing, ServiceError::Validation(_)));

    let malformed = services::submit_attendance(&repo, Some("01/03/2024"), None, vec![])
        .await
        .unwrap_err();
    assert!(matches!(malformed, ServiceError::Validation(_)));

    let get_err = services::get_attendance(&repo, Some("2024-3-1x"), None).await.unwrap_err();
    assert!(matches!(get_err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_attendance_unknown_course_filter_is_unfiltered() {
    let repo = LocalRepository::new();
    let alice = seed_student(&repo, "Alice", "alice@example.com").await;
    services::submit_attendance(
        &repo,
        Some("2024-03-01"),
        None,
        vec![attendance_row(Some(alice), None, None)],
    )
    .await
    .unwrap();

    // A course string that resolves to nothing does not narrow the query.
    let entries = services::get_attendance(&repo, Some("2024-03-01"), Some("Ghost"))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

// =========================================================
// Leave requests
// =========================================================

#[tokio::test]
async fn test_leave_request_validation_order() {
    let repo = LocalRepository::new();

    let missing = services::create_leave_request(&repo, LeaveRequestInput::default())
        .await
        .unwrap_err();
    assert!(matches!(missing, ServiceError::Validation(_)));

    let bad_id = services::create_leave_request(
        &repo,
        LeaveRequestInput {
            student_id: Some(json!("abc")),
            reason: Some("sick".to_string()),
            from_date: Some("2024-03-01".to_string()),
            to_date: Some("2024-03-02".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_id, ServiceError::Validation(_)));

    let bad_date = services::create_leave_request(
        &repo,
        LeaveRequestInput {
            student_id: Some(json!(1)),
            reason: Some("sick".to_string()),
            from_date: Some("yesterday".to_string()),
            to_date: Some("2024-03-02".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_date, ServiceError::Validation(_)));

    let no_student = services::create_leave_request(
        &repo,
        LeaveRequestInput {
            student_id: Some(json!(424242)),
            reason: Some("sick".to_string()),
            from_date: Some("2024-03-01".to_string()),
            to_date: Some("2024-03-02".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(no_student, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_leave_request_accepts_inverted_date_range() {
    let repo = LocalRepository::new();
    let sid = seed_student(&repo, "Sam", "sam@example.com").await;

    // No ordering validation: from after to is stored as submitted.
    let leave = services::create_leave_request(
        &repo,
        LeaveRequestInput {
            student_id: Some(json!(sid)),
            reason: Some("family function".to_string()),
            from_date: Some("2024-03-10".to_string()),
            to_date: Some("2024-03-01".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(leave.status, LeaveStatus::Pending);
    assert!(leave.from_date > leave.to_date);
}

#[tokio::test]
async fn test_leave_request_accepts_string_student_id() {
    let repo = LocalRepository::new();
    let sid = seed_student(&repo, "Sam", "sam@example.com").await;

    let leave = services::create_leave_request(
        &repo,
        LeaveRequestInput {
            student_id: Some(json!(sid.to_string())),
            reason: Some("travel".to_string()),
            from_date: Some("2024-04-01".to_string()),
            to_date: Some("2024-04-03".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(leave.student_id.value(), sid);
    assert_eq!(
        leave.from_date,
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    );

    let listed =
        services::list_leave_requests(&repo, Some(crate::api::StudentId::new(sid)))
            .await
            .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, leave.id);
}

// =========================================================
// Subjects and results
// =========================================================

#[tokio::test]
async fn test_subject_create_requires_name_and_delete_unknown_404() {
    let repo = LocalRepository::new();

    let err = services::create_subject(&repo, None, None, None, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let subject = services::create_subject(
        &repo,
        Some("Maths".to_string()),
        Some("CSE".to_string()),
        None,
        None,
    )
    .await
    .unwrap();

    services::delete_subject(&repo, subject.id).await.unwrap();
    let missing = services::delete_subject(&repo, subject.id).await.unwrap_err();
    assert!(matches!(missing, ServiceError::NotFound(_)));
    assert!(services::list_subjects(&repo).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_result_validation_and_lookup() {
    let repo = LocalRepository::new();
    let sid = seed_student(&repo, "Sam", "sam@example.com").await;

    let no_subject = services::add_result(&repo, ResultInput::default()).await.unwrap_err();
    assert!(matches!(no_subject, ServiceError::Validation(_)));

    let no_student = services::add_result(
        &repo,
        ResultInput {
            subject_name: Some("Maths".to_string()),
            student_id: Some(json!(31337)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(no_student, ServiceError::NotFound(_)));

    let bad_marks = services::add_result(
        &repo,
        ResultInput {
            subject_name: Some("Maths".to_string()),
            student_id: Some(json!(sid)),
            student_name: None,
            ia1: Some(json!("twenty")),
            ia2: Some(json!(18)),
            ia3: Some(json!(19)),
            attendance: Some(json!(92)),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_marks, ServiceError::Validation(_)));

    let entry = services::add_result(
        &repo,
        ResultInput {
            subject_name: Some("Maths".to_string()),
            // Resolution falls back to the exact name.
            student_id: None,
            student_name: Some("Sam".to_string()),
            ia1: Some(json!("20")),
            ia2: Some(json!(18)),
            ia3: Some(json!(19)),
            attendance: Some(json!(92)),
        },
    )
    .await
    .unwrap();
    assert_eq!(entry.student_id.value(), sid);
    assert_eq!(entry.ia1, 20);
    assert_eq!(entry.student_name.as_deref(), Some("Sam"));
}

#[tokio::test]
async fn test_get_results_filters_and_rejects_bad_id() {
    let repo = LocalRepository::new();
    let sam = seed_student(&repo, "Sam", "sam@example.com").await;
    seed_student(&repo, "Ana", "ana@example.com").await;

    for (name, marks) in [("Sam", 10), ("Ana", 20)] {
        services::add_result(
            &repo,
            ResultInput {
                subject_name: Some("Maths".to_string()),
                student_id: None,
                student_name: Some(name.to_string()),
                ia1: Some(json!(marks)),
                ia2: Some(json!(marks)),
                ia3: Some(json!(marks)),
                attendance: Some(json!(90)),
            },
        )
        .await
        .unwrap();
    }

    let by_id = services::get_results(&repo, Some(&sam.to_string()), None).await.unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].ia1, 10);

    let by_name = services::get_results(&repo, None, Some("Ana")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].ia1, 20);

    let err = services::get_results(&repo, Some("abc"), None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

// =========================================================
// Reference books
// =========================================================

#[tokio::test]
async fn test_reference_book_lifecycle() {
    let repo = LocalRepository::new();
    let book = services::store_reference_book(
        &repo,
        "Knuth".to_string(),
        "TAOCP".to_string(),
        "/uploads/taocp.pdf".to_string(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(services::list_reference_books(&repo).await.unwrap().len(), 1);

    services::delete_reference_book(&repo, book.id).await.unwrap();
    let missing = services::delete_reference_book(&repo, book.id).await.unwrap_err();
    assert!(matches!(missing, ServiceError::NotFound(_)));
}
