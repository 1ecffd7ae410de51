//! High-level business logic over the repository traits.
//!
//! Handlers call these functions instead of touching repositories directly;
//! everything here works against `&dyn FullRepository`, so the same logic
//! runs on the in-memory and Postgres backends. Validation returns the
//! first violation; messages match what the frontend displays.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::api::{Role, StudentId, UserId};
use crate::auth::{password, TokenSigner};
use crate::db::models::{
    AttendanceEntry, AttendanceOutcome, Course, LeaveRequest, NewAttendanceRecord, NewCourse,
    NewLeaveRequest, NewReferenceBook, NewResult, NewSubject, NewUser, ReferenceBook,
    ResultEntry, SkippedAttendance, Student, StudentProfile, Subject, User,
};
use crate::db::repository::{FullRepository, RepositoryError};

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level error taxonomy. The HTTP layer maps each variant onto a
/// status code; see `http::error`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed input (400).
    #[error("{0}")]
    Validation(String),

    /// Unknown identifier or wrong password (401).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Credentials valid but the declared role disagrees (403).
    #[error("Role mismatch")]
    RoleMismatch,

    /// Referenced entity does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique field (400).
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure (500).
    #[error("{0}")]
    Internal(String),

    /// Storage failure (mapped by variant).
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, .. } => ServiceError::NotFound(message),
            RepositoryError::Conflict { message, .. } => ServiceError::Conflict(message),
            other => ServiceError::Repository(other),
        }
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(s: &str, message: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| ServiceError::Validation(message.to_string()))
}

/// Coerce a JSON value to an integer the way the frontend sends ids:
/// either a number or a numeric string.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Payload presence check: absent, null, empty-string, zero and false all
/// count as "not provided".
fn provided(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_i64() != Some(0),
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

/// Resolve a free-text course reference against name-or-code.
async fn resolve_course(
    repo: &dyn FullRepository,
    reference: Option<&str>,
) -> ServiceResult<Option<Course>> {
    match reference {
        Some(r) if !r.is_empty() => Ok(repo.find_course_by_name_or_code(r).await?),
        _ => Ok(None),
    }
}

/// Resolve a student by id first, falling back to exact full-name match.
async fn resolve_student(
    repo: &dyn FullRepository,
    student_id: Option<i64>,
    student_name: Option<&str>,
) -> ServiceResult<Option<Student>> {
    if let Some(id) = student_id {
        if let Some(student) = repo.get_student(StudentId::new(id)).await? {
            return Ok(Some(student));
        }
    }
    if let Some(name) = student_name {
        if !name.is_empty() {
            return Ok(repo.find_student_by_full_name(name).await?);
        }
    }
    Ok(None)
}

// =============================================================================
// Authentication
// =============================================================================

/// A user with the role-specific extras the auth endpoints render.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    /// Set for the student role when the student row exists.
    pub student_id: Option<StudentId>,
    /// Course label for students (their course) and staff (their assigned
    /// course); `None` for admins.
    pub course_name: Option<String>,
}

/// Successful login: the signed token plus the profile for the response
/// extras.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub token: String,
    pub profile: UserProfile,
}

async fn build_profile(repo: &dyn FullRepository, user: User) -> ServiceResult<UserProfile> {
    let mut student_id = None;
    let mut course_name = None;

    match user.role {
        Role::Student => {
            if let Some(student) = repo.student_for_user(user.id).await? {
                student_id = Some(student.id);
                let course = match student.course_id {
                    Some(cid) => repo.get_course(cid).await?,
                    None => None,
                };
                course_name = Some(crate::db::models::course_label(course.as_ref()));
            }
        }
        Role::Staff => {
            let course = match user.course_id {
                Some(cid) => repo.get_course(cid).await?,
                None => None,
            };
            course_name = Some(crate::db::models::course_label(course.as_ref()));
        }
        Role::Admin => {}
    }

    Ok(UserProfile {
        user,
        student_id,
        course_name,
    })
}

/// Authenticate by email-or-username and issue an access token.
///
/// `user_type`, when present, must agree (case-insensitively) with the
/// stored role.
pub async fn login(
    repo: &dyn FullRepository,
    signer: &TokenSigner,
    identifier: Option<&str>,
    raw_password: Option<&str>,
    user_type: Option<&str>,
    now: DateTime<Utc>,
) -> ServiceResult<LoginSuccess> {
    let identifier = identifier.filter(|s| !s.is_empty());
    let raw_password = raw_password.filter(|s| !s.is_empty());
    let (identifier, raw_password) = match (identifier, raw_password) {
        (Some(i), Some(p)) => (i, p),
        _ => return Err(ServiceError::Validation("Missing credentials".to_string())),
    };

    let user = repo
        .find_user_by_identifier(identifier)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

    if !password::verify_password(raw_password, &user.password_hash) {
        return Err(ServiceError::InvalidCredentials);
    }

    if let Some(expected) = user_type {
        if !expected.is_empty() && !expected.eq_ignore_ascii_case(user.role.as_str()) {
            return Err(ServiceError::RoleMismatch);
        }
    }

    let token = signer.issue(user.id, user.role, now);
    let profile = build_profile(repo, user).await?;
    Ok(LoginSuccess { token, profile })
}

/// Fetch the profile behind a verified token identity.
pub async fn current_user(
    repo: &dyn FullRepository,
    user_id: UserId,
) -> ServiceResult<UserProfile> {
    let user = repo
        .get_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
    build_profile(repo, user).await
}

// =============================================================================
// Courses
// =============================================================================

/// List courses, alphabetically by name.
pub async fn list_courses(repo: &dyn FullRepository) -> ServiceResult<Vec<Course>> {
    Ok(repo.list_courses().await?)
}

/// Create a course. The name is required and unique.
pub async fn create_course(
    repo: &dyn FullRepository,
    name: Option<String>,
    code: Option<String>,
) -> ServiceResult<Course> {
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ServiceError::Validation("Course name required".to_string()))?;

    if repo.find_course_by_name(&name).await?.is_some() {
        return Err(ServiceError::Conflict("Course already exists".to_string()));
    }

    Ok(repo.insert_course(NewCourse { name, code }).await?)
}

// =============================================================================
// Staff and students
// =============================================================================

/// A freshly created staff account with its resolved course label.
#[derive(Debug, Clone)]
pub struct CreatedStaff {
    pub user: User,
    pub course_name: String,
}

/// Create a staff account. The course reference is resolved against
/// name-or-code and silently unset when it does not match.
pub async fn create_staff(
    repo: &dyn FullRepository,
    name: Option<String>,
    email: Option<String>,
    course: Option<String>,
    raw_password: Option<String>,
) -> ServiceResult<CreatedStaff> {
    let (name, email, raw_password) = match (
        name.filter(|s| !s.is_empty()),
        email.filter(|s| !s.is_empty()),
        raw_password.filter(|s| !s.is_empty()),
    ) {
        (Some(n), Some(e), Some(p)) => (n, e, p),
        _ => {
            return Err(ServiceError::Validation(
                "Missing required fields".to_string(),
            ))
        }
    };

    if repo.find_user_by_email(&email).await?.is_some() {
        return Err(ServiceError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let course = resolve_course(repo, course.as_deref()).await?;
    let password_hash = password::hash_password(&raw_password).map_err(ServiceError::Internal)?;

    let user = repo
        .insert_user(NewUser {
            full_name: name,
            email: email.clone(),
            username: Some(email),
            password_hash,
            role: Role::Staff,
            course_id: course.as_ref().map(|c| c.id),
        })
        .await?;

    Ok(CreatedStaff {
        user,
        course_name: crate::db::models::course_label(course.as_ref()),
    })
}

/// A freshly created student account.
#[derive(Debug, Clone)]
pub struct CreatedStudent {
    pub student: Student,
    pub full_name: String,
    pub email: String,
    pub course_name: String,
}

/// Create a student: user account plus student row, atomically.
///
/// A password is required; accounts are never created with a placeholder
/// credential.
pub async fn create_student(
    repo: &dyn FullRepository,
    name: Option<String>,
    email: Option<String>,
    course: Option<String>,
    raw_password: Option<String>,
) -> ServiceResult<CreatedStudent> {
    let (name, email) = match (
        name.filter(|s| !s.is_empty()),
        email.filter(|s| !s.is_empty()),
    ) {
        (Some(n), Some(e)) => (n, e),
        _ => return Err(ServiceError::Validation("Missing fields".to_string())),
    };
    let raw_password = raw_password
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("Password is required".to_string()))?;

    if repo.find_user_by_email(&email).await?.is_some() {
        return Err(ServiceError::Conflict(
            "Email already registered".to_string(),
        ));
    }

    let course = resolve_course(repo, course.as_deref()).await?;
    let password_hash = password::hash_password(&raw_password).map_err(ServiceError::Internal)?;

    let (_, student) = repo
        .insert_student_user(
            NewUser {
                full_name: name.clone(),
                email: email.clone(),
                username: Some(email.clone()),
                password_hash,
                role: Role::Student,
                course_id: None,
            },
            course.as_ref().map(|c| c.id),
        )
        .await?;

    Ok(CreatedStudent {
        student,
        full_name: name,
        email,
        course_name: crate::db::models::course_label(course.as_ref()),
    })
}

/// List student profiles, optionally filtered by a course name-or-code.
/// An unknown course reference yields an empty list.
pub async fn list_students(
    repo: &dyn FullRepository,
    course: Option<&str>,
) -> ServiceResult<Vec<StudentProfile>> {
    match course {
        Some(reference) if !reference.is_empty() => {
            match repo.find_course_by_name_or_code(reference).await? {
                Some(c) => Ok(repo.list_students(Some(c.id)).await?),
                None => Ok(Vec::new()),
            }
        }
        _ => Ok(repo.list_students(None).await?),
    }
}

// =============================================================================
// Attendance
// =============================================================================

/// One submitted attendance row, before student resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceRowInput {
    #[serde(default)]
    pub student_id: Option<Value>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Store an attendance sheet for (date, course), replacing whatever was
/// recorded for that key before.
///
/// Rows whose student reference resolves neither by id nor by exact name
/// are not stored; they are reported in the returned outcome instead.
pub async fn submit_attendance(
    repo: &dyn FullRepository,
    date: Option<&str>,
    course: Option<&str>,
    records: Vec<AttendanceRowInput>,
) -> ServiceResult<AttendanceOutcome> {
    let date = date
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("date is required".to_string()))?;
    let date = parse_date(date, "Invalid date format (expected YYYY-MM-DD)")?;

    let course = resolve_course(repo, course).await?;
    let course_id = course.as_ref().map(|c| c.id);

    let mut to_store = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for row in records {
        let id = row.student_id.as_ref().and_then(coerce_int);
        let student = resolve_student(repo, id, row.student_name.as_deref()).await?;

        let Some(student) = student else {
            warn!(student_id = ?id, student_name = ?row.student_name, "attendance row skipped: unknown student");
            skipped.push(SkippedAttendance {
                student_id: id,
                student_name: row.student_name,
            });
            continue;
        };

        let status = row
            .status
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "present".to_string());

        to_store.push(NewAttendanceRecord {
            date,
            course_id,
            student_id: student.id,
            status,
        });
    }

    let applied = repo.replace_attendance(date, course_id, to_store).await?;
    Ok(AttendanceOutcome { applied, skipped })
}

/// List attendance for a date, optionally scoped to a course. A course
/// reference that does not resolve leaves the listing unfiltered, matching
/// the submission side's treatment of unknown courses.
pub async fn get_attendance(
    repo: &dyn FullRepository,
    date: Option<&str>,
    course: Option<&str>,
) -> ServiceResult<Vec<AttendanceEntry>> {
    let date = date
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("date query parameter required".to_string()))?;
    let date = parse_date(date, "Invalid date format (expected YYYY-MM-DD)")?;

    let course = resolve_course(repo, course).await?;
    Ok(repo
        .list_attendance(date, course.as_ref().map(|c| c.id))
        .await?)
}

// =============================================================================
// Leave requests
// =============================================================================

/// Raw leave request fields as submitted.
#[derive(Debug, Clone, Default)]
pub struct LeaveRequestInput {
    pub student_id: Option<Value>,
    pub reason: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// Create a leave request.
///
/// `from_date > to_date` is accepted; the range is stored as submitted.
pub async fn create_leave_request(
    repo: &dyn FullRepository,
    input: LeaveRequestInput,
) -> ServiceResult<LeaveRequest> {
    let reason_ok = input.reason.as_deref().is_some_and(|r| !r.is_empty());
    let from_ok = input.from_date.as_deref().is_some_and(|d| !d.is_empty());
    let to_ok = input.to_date.as_deref().is_some_and(|d| !d.is_empty());
    if !provided(input.student_id.as_ref()) || !reason_ok || !from_ok || !to_ok {
        return Err(ServiceError::Validation(
            "Missing fields (student_id, reason, from_date, to_date required)".to_string(),
        ));
    }

    let student_id = input
        .student_id
        .as_ref()
        .and_then(coerce_int)
        .ok_or_else(|| {
            ServiceError::Validation("student_id must be an integer".to_string())
        })?;

    let from_date = parse_date(
        input.from_date.as_deref().unwrap_or_default(),
        "Invalid date format (expected YYYY-MM-DD)",
    )?;
    let to_date = parse_date(
        input.to_date.as_deref().unwrap_or_default(),
        "Invalid date format (expected YYYY-MM-DD)",
    )?;

    let student = repo
        .get_student(StudentId::new(student_id))
        .await?
        .ok_or_else(|| ServiceError::NotFound("Student not found".to_string()))?;

    repo.insert_leave_request(NewLeaveRequest {
        student_id: student.id,
        reason: input.reason.unwrap_or_default(),
        from_date,
        to_date,
    })
    .await
    .map_err(|e| {
        error!(error = %e, "failed to store leave request");
        ServiceError::Internal("Could not create leave request".to_string())
    })
}

/// List leave requests, optionally for one student, newest first.
pub async fn list_leave_requests(
    repo: &dyn FullRepository,
    student_id: Option<StudentId>,
) -> ServiceResult<Vec<LeaveRequest>> {
    Ok(repo.list_leave_requests(student_id).await?)
}

// =============================================================================
// Subjects
// =============================================================================

/// List subjects, alphabetically by name.
pub async fn list_subjects(repo: &dyn FullRepository) -> ServiceResult<Vec<Subject>> {
    Ok(repo.list_subjects().await?)
}

/// Create a denormalized subject record.
pub async fn create_subject(
    repo: &dyn FullRepository,
    name: Option<String>,
    course_name: Option<String>,
    staff_name: Option<String>,
    session_name: Option<String>,
) -> ServiceResult<Subject> {
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ServiceError::Validation("Subject name is required".to_string()))?;

    Ok(repo
        .insert_subject(NewSubject {
            name,
            course_name,
            staff_name,
            session_name,
        })
        .await?)
}

/// Delete a subject by id.
pub async fn delete_subject(repo: &dyn FullRepository, id: i64) -> ServiceResult<()> {
    if repo.delete_subject(id).await? {
        Ok(())
    } else {
        Err(ServiceError::NotFound("Subject not found".to_string()))
    }
}

// =============================================================================
// Results
// =============================================================================

/// Raw result fields as submitted; marks arrive as numbers or numeric
/// strings.
#[derive(Debug, Clone, Default)]
pub struct ResultInput {
    pub student_id: Option<Value>,
    pub student_name: Option<String>,
    pub subject_name: Option<String>,
    pub ia1: Option<Value>,
    pub ia2: Option<Value>,
    pub ia3: Option<Value>,
    pub attendance: Option<Value>,
}

/// Record an internal-assessment result for a student.
pub async fn add_result(
    repo: &dyn FullRepository,
    input: ResultInput,
) -> ServiceResult<ResultEntry> {
    let subject_name = input
        .subject_name
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("subject_name is required".to_string()))?;

    let id = input.student_id.as_ref().and_then(coerce_int);
    let student = resolve_student(repo, id, input.student_name.as_deref())
        .await?
        .ok_or_else(|| ServiceError::NotFound("Student not found".to_string()))?;

    let marks = [&input.ia1, &input.ia2, &input.ia3, &input.attendance]
        .into_iter()
        .map(|v| v.as_ref().and_then(coerce_int).and_then(|n| i32::try_from(n).ok()))
        .collect::<Option<Vec<i32>>>()
        .ok_or_else(|| {
            ServiceError::Validation("Marks and attendance must be integers".to_string())
        })?;

    Ok(repo
        .insert_result(NewResult {
            student_id: student.id,
            subject_name,
            ia1: marks[0],
            ia2: marks[1],
            ia3: marks[2],
            attendance: marks[3],
        })
        .await?)
}

/// List results, filtered by student id (takes precedence) or exact name.
pub async fn get_results(
    repo: &dyn FullRepository,
    student_id: Option<&str>,
    student_name: Option<&str>,
) -> ServiceResult<Vec<ResultEntry>> {
    let student_id = match student_id.filter(|s| !s.is_empty()) {
        Some(raw) => Some(StudentId::new(raw.parse::<i64>().map_err(|_| {
            ServiceError::Validation("student_id must be an integer".to_string())
        })?)),
        None => None,
    };

    Ok(repo
        .list_results(student_id, student_name.filter(|s| !s.is_empty()))
        .await?)
}

// =============================================================================
// Reference books
// =============================================================================

/// Record an uploaded reference book. The file is already on disk; this
/// stores the catalog row.
pub async fn store_reference_book(
    repo: &dyn FullRepository,
    author: String,
    title: String,
    pdf_url: String,
    uploaded_by_id: Option<UserId>,
) -> ServiceResult<ReferenceBook> {
    Ok(repo
        .insert_reference_book(NewReferenceBook {
            author,
            title,
            pdf_url,
            uploaded_by_id,
        })
        .await?)
}

/// List reference books, newest first.
pub async fn list_reference_books(
    repo: &dyn FullRepository,
) -> ServiceResult<Vec<ReferenceBook>> {
    Ok(repo.list_reference_books().await?)
}

/// Delete a reference book catalog row. The stored PDF is left on disk.
pub async fn delete_reference_book(repo: &dyn FullRepository, id: i64) -> ServiceResult<()> {
    if repo.delete_reference_book(id).await? {
        Ok(())
    } else {
        Err(ServiceError::NotFound("Book not found".to_string()))
    }
}

// =============================================================================
// Health
// =============================================================================

/// Check that the backing store answers.
pub async fn health_check(repo: &dyn FullRepository) -> ServiceResult<bool> {
    Ok(repo.ping().await?)
}
