//! Data Transfer Objects for the HTTP API.
//!
//! Request DTOs accept the exact key variants the frontend sends (serde
//! aliases stand in for the old duck-typed lookups); response DTOs mirror
//! the payload shapes the frontend already renders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{LeaveStatus, Role};
use crate::db::models::{
    AttendanceEntry, Course, ReferenceBook, ResultEntry, SkippedAttendance, StudentProfile,
    Subject,
};
use crate::db::services::AttendanceRowInput;

// =============================================================================
// Auth
// =============================================================================

/// Request body for login. `username` and `email` are interchangeable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
}

impl LoginRequest {
    /// The login identifier: username, falling back to email.
    pub fn identifier(&self) -> Option<&str> {
        self.username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.email.as_deref())
    }
}

/// Nested user object in auth responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub full_name: String,
    pub username: Option<String>,
    pub email: String,
}

/// Response for a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: Role,
    pub user: UserDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
}

/// Response for `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub username: Option<String>,
    pub email: String,
    pub role: Role,
    pub user_type: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
}

// =============================================================================
// Courses, staff, students
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDto {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
}

impl From<Course> for CourseDto {
    fn from(course: Course) -> Self {
        Self {
            id: course.id.value(),
            name: course.name,
            code: course.code,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStaffRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response for staff creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffCreatedResponse {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub course_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentsQuery {
    #[serde(default)]
    pub course: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Student row in listings. Carries both key spellings the frontend uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDto {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub email: String,
    pub course: String,
    pub course_name: String,
}

impl From<StudentProfile> for StudentDto {
    fn from(profile: StudentProfile) -> Self {
        Self {
            id: profile.student_id.value(),
            name: profile.full_name.clone(),
            full_name: profile.full_name,
            email: profile.email,
            course: profile.course_label.clone(),
            course_name: profile.course_label,
        }
    }
}

/// Response for student creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentCreatedResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub course: String,
}

// =============================================================================
// Attendance
// =============================================================================

/// Request body for attendance submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceSubmission {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub records: Vec<AttendanceRowInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
}

/// Response for attendance submission: the save confirmation plus which
/// rows were dropped because their student did not resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSavedResponse {
    pub msg: String,
    pub applied: usize,
    pub skipped: Vec<SkippedAttendance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecordDto {
    pub id: i64,
    pub date: String,
    pub course: String,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub status: String,
}

impl From<AttendanceEntry> for AttendanceRecordDto {
    fn from(entry: AttendanceEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date.format("%Y-%m-%d").to_string(),
            course: entry.course_label,
            student_id: entry.student_id.value(),
            student_name: entry.student_name,
            status: entry.status,
        }
    }
}

// =============================================================================
// Leave requests
// =============================================================================

/// Request body for leave creation. The extras (`requester_name`, `title`,
/// `subject`) are accepted and echoed back but never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLeaveRequest {
    #[serde(default)]
    pub student_id: Option<Value>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub requester_name: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub subject: Option<Value>,
}

/// Response for leave creation; extras are cosmetic passthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveCreatedResponse {
    pub id: i64,
    pub student_id: i64,
    pub reason: String,
    pub from_date: String,
    pub to_date: String,
    pub status: LeaveStatus,
    pub created_at: String,
    pub requester_name: Option<String>,
    pub title: Option<String>,
    pub subject: Option<String>,
}

// =============================================================================
// Subjects
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSubjectRequest {
    #[serde(default, alias = "subjectName")]
    pub name: Option<String>,
    #[serde(default, alias = "courseName")]
    pub course: Option<String>,
    #[serde(default, alias = "staffName")]
    pub staff: Option<String>,
    #[serde(default, alias = "sessionName")]
    pub session: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectDto {
    pub id: i64,
    pub name: String,
    pub course: Option<String>,
    pub staff: Option<String>,
    pub session: Option<String>,
}

impl From<Subject> for SubjectDto {
    fn from(subject: Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            course: subject.course_name,
            staff: subject.staff_name,
            session: subject.session_name,
        }
    }
}

// =============================================================================
// Results
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateResultRequest {
    #[serde(default)]
    pub student_id: Option<Value>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub ia1: Option<Value>,
    #[serde(default)]
    pub ia2: Option<Value>,
    #[serde(default)]
    pub ia3: Option<Value>,
    #[serde(default)]
    pub attendance: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsQuery {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDto {
    pub id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub subject_name: String,
    pub ia1: i32,
    pub ia2: i32,
    pub ia3: i32,
    pub attendance: i32,
}

impl From<ResultEntry> for ResultDto {
    fn from(entry: ResultEntry) -> Self {
        Self {
            id: entry.id,
            student_id: entry.student_id.value(),
            student_name: entry.student_name,
            subject_name: entry.subject_name,
            ia1: entry.ia1,
            ia2: entry.ia2,
            ia3: entry.ia3,
            attendance: entry.attendance,
        }
    }
}

// =============================================================================
// Reference books
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceBookDto {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub pdf_url: String,
}

impl From<ReferenceBook> for ReferenceBookDto {
    fn from(book: ReferenceBook) -> Self {
        Self {
            id: book.id,
            author: book.author,
            title: book.title,
            pdf_url: book.pdf_url,
        }
    }
}

// =============================================================================
// Misc
// =============================================================================

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}
