use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use std::str::FromStr;

use super::schema::{
    attendance_records, courses, leave_requests, reference_books, results, students, subjects,
    users,
};
use crate::api::{CourseId, LeaveStatus, Role, StudentId, UserId};
use crate::db::models::{
    Course, LeaveRequest, ReferenceBook, Student, Subject, User,
};
use crate::db::repository::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourseRow {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub struct NewCourseRow {
    pub name: String,
    pub code: Option<String>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: CourseId::new(row.id),
            name: row.name,
            code: row.code,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub course_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub full_name: String,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub course_id: Option<i64>,
}

impl UserRow {
    /// Convert to the domain type; an unknown stored role is a data error.
    pub fn into_domain(self) -> RepositoryResult<User> {
        let role = Role::from_str(&self.role).map_err(RepositoryError::internal)?;
        Ok(User {
            id: UserId::new(self.id),
            full_name: self.full_name,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            role,
            course_id: self.course_id.map(CourseId::new),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StudentRow {
    pub id: i64,
    pub user_id: i64,
    pub course_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = students)]
pub struct NewStudentRow {
    pub user_id: i64,
    pub course_id: Option<i64>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: StudentId::new(row.id),
            user_id: UserId::new(row.user_id),
            course_id: row.course_id.map(CourseId::new),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AttendanceRecordRow {
    pub id: i64,
    pub date: NaiveDate,
    pub course_id: Option<i64>,
    pub student_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attendance_records)]
pub struct NewAttendanceRecordRow {
    pub date: NaiveDate,
    pub course_id: Option<i64>,
    pub student_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ResultRow {
    pub id: i64,
    pub student_id: i64,
    pub subject_name: String,
    pub ia1: i32,
    pub ia2: i32,
    pub ia3: i32,
    pub attendance: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = results)]
pub struct NewResultRow {
    pub student_id: i64,
    pub subject_name: String,
    pub ia1: i32,
    pub ia2: i32,
    pub ia3: i32,
    pub attendance: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subjects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubjectRow {
    pub id: i64,
    pub name: String,
    pub course_name: Option<String>,
    pub staff_name: Option<String>,
    pub session_name: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subjects)]
pub struct NewSubjectRow {
    pub name: String,
    pub course_name: Option<String>,
    pub staff_name: Option<String>,
    pub session_name: Option<String>,
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Subject {
            id: row.id,
            name: row.name,
            course_name: row.course_name,
            staff_name: row.staff_name,
            session_name: row.session_name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = leave_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LeaveRequestRow {
    pub id: i64,
    pub student_id: i64,
    pub reason: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = leave_requests)]
pub struct NewLeaveRequestRow {
    pub student_id: i64,
    pub reason: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: String,
}

impl LeaveRequestRow {
    pub fn into_domain(self) -> RepositoryResult<LeaveRequest> {
        let status = LeaveStatus::from_str(&self.status).map_err(RepositoryError::internal)?;
        Ok(LeaveRequest {
            id: self.id,
            student_id: StudentId::new(self.student_id),
            reason: self.reason,
            from_date: self.from_date,
            to_date: self.to_date,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reference_books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReferenceBookRow {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub pdf_url: String,
    pub uploaded_by_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reference_books)]
pub struct NewReferenceBookRow {
    pub author: String,
    pub title: String,
    pub pdf_url: String,
    pub uploaded_by_id: Option<i64>,
}

impl From<ReferenceBookRow> for ReferenceBook {
    fn from(row: ReferenceBookRow) -> Self {
        ReferenceBook {
            id: row.id,
            author: row.author,
            title: row.title,
            pdf_url: row.pdf_url,
            uploaded_by_id: row.uploaded_by_id.map(UserId::new),
            created_at: row.created_at,
        }
    }
}
