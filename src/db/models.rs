//! Domain entities shared by the repository and service layers.
//!
//! These are plain data structs mirroring the relational schema. Types with
//! a `New` prefix are the insert shapes (no id, no server-set timestamps).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{CourseId, LeaveStatus, Role, StudentId, UserId};

/// An academic program/cohort grouping staff and students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub code: Option<String>,
}

impl Course {
    /// Human-readable label: name, falling back to code, falling back to
    /// the empty string. Matches the label the frontend expects everywhere
    /// a course is rendered.
    pub fn label(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else {
            self.code.clone().unwrap_or_default()
        }
    }
}

/// Label for an optional course reference ("" when absent).
pub fn course_label(course: Option<&Course>) -> String {
    course.map(Course::label).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub name: String,
    pub code: Option<String>,
}

/// A user account. Staff link to a course through `course_id`; students
/// link through their [`Student`] record instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub course_id: Option<CourseId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub course_id: Option<CourseId>,
}

/// The student row proper; one per user with the student role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserId,
    pub course_id: Option<CourseId>,
}

/// A student joined with its user account and course label, the shape the
/// listing and result endpoints render from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: StudentId,
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub course_label: String,
}

/// One stored attendance row joined with its student name and course label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub course_label: String,
    pub student_id: StudentId,
    pub student_name: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendanceRecord {
    pub date: NaiveDate,
    pub course_id: Option<CourseId>,
    pub student_id: StudentId,
    pub status: String,
}

/// Outcome of an attendance submission: rows written and rows dropped
/// because their student reference did not resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceOutcome {
    pub applied: usize,
    pub skipped: Vec<SkippedAttendance>,
}

/// A submitted attendance row that named no known student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAttendance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
}

/// A result row joined with the student's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub id: i64,
    pub student_id: StudentId,
    pub student_name: Option<String>,
    pub subject_name: String,
    pub ia1: i32,
    pub ia2: i32,
    pub ia3: i32,
    /// Attendance percentage.
    pub attendance: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResult {
    pub student_id: StudentId,
    pub subject_name: String,
    pub ia1: i32,
    pub ia2: i32,
    pub ia3: i32,
    pub attendance: i32,
}

/// Denormalized subject record; free text, no referential integrity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub course_name: Option<String>,
    pub staff_name: Option<String>,
    pub session_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
    pub name: String,
    pub course_name: Option<String>,
    pub staff_name: Option<String>,
    pub session_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: i64,
    pub student_id: StudentId,
    pub reason: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeaveRequest {
    pub student_id: StudentId,
    pub reason: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceBook {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub pdf_url: String,
    pub uploaded_by_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReferenceBook {
    pub author: String,
    pub title: String,
    pub pdf_url: String,
    pub uploaded_by_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_label_prefers_name() {
        let course = Course {
            id: CourseId::new(1),
            name: "Computer Science".to_string(),
            code: Some("CSE".to_string()),
        };
        assert_eq!(course.label(), "Computer Science");
    }

    #[test]
    fn test_course_label_falls_back_to_code() {
        let course = Course {
            id: CourseId::new(1),
            name: String::new(),
            code: Some("CSE".to_string()),
        };
        assert_eq!(course.label(), "CSE");
        assert_eq!(course_label(None), "");
    }
}
