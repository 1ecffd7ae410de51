//! Postgres repository implementation using Diesel.
//!
//! Pool work runs on the blocking thread pool (`tokio::task::spawn_blocking`)
//! so async handlers never block on a database round-trip. Multi-row writes
//! (student creation, attendance replacement) run inside a single Diesel
//! transaction.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use tokio::task;

use crate::api::{CourseId, StudentId, UserId};
use crate::db::models::{
    AttendanceEntry, Course, LeaveRequest, NewAttendanceRecord, NewCourse, NewLeaveRequest,
    NewReferenceBook, NewResult, NewSubject, NewUser, ReferenceBook, ResultEntry, Student,
    StudentProfile, Subject, User,
};
use crate::db::repository::{
    AttendanceRepository, CourseRepository, FullRepository, LeaveRepository,
    ReferenceBookRepository, RepositoryError, RepositoryResult, ResultRepository,
    SubjectRepository, UserRepository,
};

mod models;
mod schema;

use models::*;
use schema::{attendance_records, courses, leave_requests, reference_books, results, students, subjects, users};

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Course label from the nullable joined columns (name, falling back to
/// code, falling back to "").
fn label_from(name: Option<String>, code: Option<String>) -> String {
    match name {
        Some(n) if !n.is_empty() => n,
        _ => code.unwrap_or_default(),
    }
}

/// Diesel-backed repository for Postgres.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Build the connection pool and verify connectivity.
    pub async fn connect(config: &PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .build(manager)?;

        let repo = Self { pool };
        repo.ping().await?;
        Ok(repo)
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(RepositoryError::from)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Blocking task join error: {}", e)))?
        .map_err(|e| e.with_operation(operation))
    }
}

#[async_trait]
impl CourseRepository for PostgresRepository {
    async fn list_courses(&self) -> RepositoryResult<Vec<Course>> {
        self.run("list_courses", |conn| {
            let rows = courses::table
                .order(courses::name.asc())
                .select(CourseRow::as_select())
                .load::<CourseRow>(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn get_course(&self, id: CourseId) -> RepositoryResult<Option<Course>> {
        self.run("get_course", move |conn| {
            let row = courses::table
                .find(id.value())
                .select(CourseRow::as_select())
                .first::<CourseRow>(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn find_course_by_name(&self, name: &str) -> RepositoryResult<Option<Course>> {
        let name = name.to_string();
        self.run("find_course_by_name", move |conn| {
            let row = courses::table
                .filter(courses::name.eq(name))
                .select(CourseRow::as_select())
                .first::<CourseRow>(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn find_course_by_name_or_code(
        &self,
        reference: &str,
    ) -> RepositoryResult<Option<Course>> {
        let reference = reference.to_string();
        self.run("find_course_by_name_or_code", move |conn| {
            let row = courses::table
                .filter(
                    courses::name
                        .eq(reference.clone())
                        .or(courses::code.eq(reference)),
                )
                .select(CourseRow::as_select())
                .first::<CourseRow>(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn insert_course(&self, new: NewCourse) -> RepositoryResult<Course> {
        self.run("insert_course", move |conn| {
            let row = diesel::insert_into(courses::table)
                .values(NewCourseRow {
                    name: new.name,
                    code: new.code,
                })
                .returning(CourseRow::as_returning())
                .get_result::<CourseRow>(conn)?;
            Ok(row.into())
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        self.run("get_user", move |conn| {
            let row = users::table
                .find(id.value())
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()?;
            row.map(UserRow::into_domain).transpose()
        })
        .await
    }

    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> RepositoryResult<Option<User>> {
        let identifier = identifier.to_string();
        self.run("find_user_by_identifier", move |conn| {
            let row = users::table
                .filter(
                    users::email
                        .eq(identifier.clone())
                        .or(users::username.eq(identifier)),
                )
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()?;
            row.map(UserRow::into_domain).transpose()
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.to_string();
        self.run("find_user_by_email", move |conn| {
            let row = users::table
                .filter(users::email.eq(email))
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()?;
            row.map(UserRow::into_domain).transpose()
        })
        .await
    }

    async fn insert_user(&self, new: NewUser) -> RepositoryResult<User> {
        self.run("insert_user", move |conn| {
            let row = diesel::insert_into(users::table)
                .values(NewUserRow {
                    full_name: new.full_name,
                    email: new.email,
                    username: new.username,
                    password_hash: new.password_hash,
                    role: new.role.as_str().to_string(),
                    course_id: new.course_id.map(|c| c.value()),
                })
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)?;
            row.into_domain()
        })
        .await
    }

    async fn insert_student_user(
        &self,
        new: NewUser,
        course_id: Option<CourseId>,
    ) -> RepositoryResult<(User, Student)> {
        self.run("insert_student_user", move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                let user_row = diesel::insert_into(users::table)
                    .values(NewUserRow {
                        full_name: new.full_name,
                        email: new.email,
                        username: new.username,
                        password_hash: new.password_hash,
                        role: new.role.as_str().to_string(),
                        course_id: None,
                    })
                    .returning(UserRow::as_returning())
                    .get_result::<UserRow>(conn)?;

                let student_row = diesel::insert_into(students::table)
                    .values(NewStudentRow {
                        user_id: user_row.id,
                        course_id: course_id.map(|c| c.value()),
                    })
                    .returning(StudentRow::as_returning())
                    .get_result::<StudentRow>(conn)?;

                Ok((user_row.into_domain()?, student_row.into()))
            })
        })
        .await
    }

    async fn get_student(&self, id: StudentId) -> RepositoryResult<Option<Student>> {
        self.run("get_student", move |conn| {
            let row = students::table
                .find(id.value())
                .select(StudentRow::as_select())
                .first::<StudentRow>(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn student_for_user(&self, user_id: UserId) -> RepositoryResult<Option<Student>> {
        self.run("student_for_user", move |conn| {
            let row = students::table
                .filter(students::user_id.eq(user_id.value()))
                .select(StudentRow::as_select())
                .first::<StudentRow>(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn find_student_by_full_name(
        &self,
        full_name: &str,
    ) -> RepositoryResult<Option<Student>> {
        let full_name = full_name.to_string();
        self.run("find_student_by_full_name", move |conn| {
            let row = students::table
                .inner_join(users::table)
                .filter(users::full_name.eq(full_name))
                .select(StudentRow::as_select())
                .first::<StudentRow>(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn get_student_profile(
        &self,
        id: StudentId,
    ) -> RepositoryResult<Option<StudentProfile>> {
        self.run("get_student_profile", move |conn| {
            let row = students::table
                .inner_join(users::table)
                .left_join(courses::table)
                .filter(students::id.eq(id.value()))
                .select((
                    StudentRow::as_select(),
                    users::full_name,
                    users::email,
                    courses::name.nullable(),
                    courses::code.nullable(),
                ))
                .first::<(StudentRow, String, String, Option<String>, Option<String>)>(conn)
                .optional()?;

            Ok(row.map(|(student, full_name, email, name, code)| StudentProfile {
                student_id: StudentId::new(student.id),
                user_id: UserId::new(student.user_id),
                full_name,
                email,
                course_label: label_from(name, code),
            }))
        })
        .await
    }

    async fn list_students(
        &self,
        course_id: Option<CourseId>,
    ) -> RepositoryResult<Vec<StudentProfile>> {
        self.run("list_students", move |conn| {
            let mut query = students::table
                .inner_join(users::table)
                .left_join(courses::table)
                .select((
                    StudentRow::as_select(),
                    users::full_name,
                    users::email,
                    courses::name.nullable(),
                    courses::code.nullable(),
                ))
                .into_boxed();

            if let Some(cid) = course_id {
                query = query.filter(students::course_id.eq(cid.value()));
            }

            let rows = query
                .load::<(StudentRow, String, String, Option<String>, Option<String>)>(conn)?;
            Ok(rows
                .into_iter()
                .map(|(student, full_name, email, name, code)| StudentProfile {
                    student_id: StudentId::new(student.id),
                    user_id: UserId::new(student.user_id),
                    full_name,
                    email,
                    course_label: label_from(name, code),
                })
                .collect())
        })
        .await
    }
}

#[async_trait]
impl AttendanceRepository for PostgresRepository {
    async fn replace_attendance(
        &self,
        date: NaiveDate,
        course_id: Option<CourseId>,
        records: Vec<NewAttendanceRecord>,
    ) -> RepositoryResult<usize> {
        self.run("replace_attendance", move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                match course_id {
                    Some(cid) => {
                        diesel::delete(
                            attendance_records::table
                                .filter(attendance_records::date.eq(date))
                                .filter(attendance_records::course_id.eq(cid.value())),
                        )
                        .execute(conn)?;
                    }
                    None => {
                        diesel::delete(
                            attendance_records::table.filter(attendance_records::date.eq(date)),
                        )
                        .execute(conn)?;
                    }
                }

                let rows: Vec<NewAttendanceRecordRow> = records
                    .into_iter()
                    .map(|r| NewAttendanceRecordRow {
                        date: r.date,
                        course_id: r.course_id.map(|c| c.value()),
                        student_id: r.student_id.value(),
                        status: r.status,
                    })
                    .collect();

                let inserted = diesel::insert_into(attendance_records::table)
                    .values(&rows)
                    .execute(conn)?;
                Ok(inserted)
            })
        })
        .await
    }

    async fn list_attendance(
        &self,
        date: NaiveDate,
        course_id: Option<CourseId>,
    ) -> RepositoryResult<Vec<AttendanceEntry>> {
        self.run("list_attendance", move |conn| {
            let mut query = attendance_records::table
                .inner_join(students::table.inner_join(users::table))
                .left_join(courses::table)
                .filter(attendance_records::date.eq(date))
                .select((
                    AttendanceRecordRow::as_select(),
                    users::full_name,
                    courses::name.nullable(),
                    courses::code.nullable(),
                ))
                .into_boxed();

            if let Some(cid) = course_id {
                query = query.filter(attendance_records::course_id.eq(cid.value()));
            }

            let rows = query
                .load::<(AttendanceRecordRow, String, Option<String>, Option<String>)>(conn)?;
            Ok(rows
                .into_iter()
                .map(|(record, full_name, name, code)| AttendanceEntry {
                    id: record.id,
                    date: record.date,
                    course_label: label_from(name, code),
                    student_id: StudentId::new(record.student_id),
                    student_name: Some(full_name),
                    status: record.status,
                })
                .collect())
        })
        .await
    }
}

#[async_trait]
impl ResultRepository for PostgresRepository {
    async fn insert_result(&self, new: NewResult) -> RepositoryResult<ResultEntry> {
        self.run("insert_result", move |conn| {
            let row = diesel::insert_into(results::table)
                .values(NewResultRow {
                    student_id: new.student_id.value(),
                    subject_name: new.subject_name,
                    ia1: new.ia1,
                    ia2: new.ia2,
                    ia3: new.ia3,
                    attendance: new.attendance,
                })
                .returning(ResultRow::as_returning())
                .get_result::<ResultRow>(conn)?;

            let student_name = students::table
                .inner_join(users::table)
                .filter(students::id.eq(row.student_id))
                .select(users::full_name)
                .first::<String>(conn)
                .optional()?;

            Ok(ResultEntry {
                id: row.id,
                student_id: StudentId::new(row.student_id),
                student_name,
                subject_name: row.subject_name,
                ia1: row.ia1,
                ia2: row.ia2,
                ia3: row.ia3,
                attendance: row.attendance,
            })
        })
        .await
    }

    async fn list_results(
        &self,
        student_id: Option<StudentId>,
        student_name: Option<&str>,
    ) -> RepositoryResult<Vec<ResultEntry>> {
        let student_name = student_name.map(|s| s.to_string());
        self.run("list_results", move |conn| {
            let mut query = results::table
                .inner_join(students::table.inner_join(users::table))
                .select((ResultRow::as_select(), users::full_name))
                .into_boxed();

            if let Some(id) = student_id {
                query = query.filter(results::student_id.eq(id.value()));
            } else if let Some(name) = student_name {
                query = query.filter(users::full_name.eq(name));
            }

            let rows = query.load::<(ResultRow, String)>(conn)?;
            Ok(rows
                .into_iter()
                .map(|(row, full_name)| ResultEntry {
                    id: row.id,
                    student_id: StudentId::new(row.student_id),
                    student_name: Some(full_name),
                    subject_name: row.subject_name,
                    ia1: row.ia1,
                    ia2: row.ia2,
                    ia3: row.ia3,
                    attendance: row.attendance,
                })
                .collect())
        })
        .await
    }
}

#[async_trait]
impl LeaveRepository for PostgresRepository {
    async fn insert_leave_request(
        &self,
        new: NewLeaveRequest,
    ) -> RepositoryResult<LeaveRequest> {
        self.run("insert_leave_request", move |conn| {
            let row = diesel::insert_into(leave_requests::table)
                .values(NewLeaveRequestRow {
                    student_id: new.student_id.value(),
                    reason: new.reason,
                    from_date: new.from_date,
                    to_date: new.to_date,
                    status: crate::api::LeaveStatus::Pending.as_str().to_string(),
                })
                .returning(LeaveRequestRow::as_returning())
                .get_result::<LeaveRequestRow>(conn)?;
            row.into_domain()
        })
        .await
    }

    async fn list_leave_requests(
        &self,
        student_id: Option<StudentId>,
    ) -> RepositoryResult<Vec<LeaveRequest>> {
        self.run("list_leave_requests", move |conn| {
            let mut query = leave_requests::table
                .order(leave_requests::created_at.desc())
                .select(LeaveRequestRow::as_select())
                .into_boxed();

            if let Some(id) = student_id {
                query = query.filter(leave_requests::student_id.eq(id.value()));
            }

            let rows = query.load::<LeaveRequestRow>(conn)?;
            rows.into_iter().map(LeaveRequestRow::into_domain).collect()
        })
        .await
    }
}

#[async_trait]
impl SubjectRepository for PostgresRepository {
    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        self.run("list_subjects", |conn| {
            let rows = subjects::table
                .order(subjects::name.asc())
                .select(SubjectRow::as_select())
                .load::<SubjectRow>(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn insert_subject(&self, new: NewSubject) -> RepositoryResult<Subject> {
        self.run("insert_subject", move |conn| {
            let row = diesel::insert_into(subjects::table)
                .values(NewSubjectRow {
                    name: new.name,
                    course_name: new.course_name,
                    staff_name: new.staff_name,
                    session_name: new.session_name,
                })
                .returning(SubjectRow::as_returning())
                .get_result::<SubjectRow>(conn)?;
            Ok(row.into())
        })
        .await
    }

    async fn delete_subject(&self, id: i64) -> RepositoryResult<bool> {
        self.run("delete_subject", move |conn| {
            let deleted =
                diesel::delete(subjects::table.find(id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl ReferenceBookRepository for PostgresRepository {
    async fn insert_reference_book(
        &self,
        new: NewReferenceBook,
    ) -> RepositoryResult<ReferenceBook> {
        self.run("insert_reference_book", move |conn| {
            let row = diesel::insert_into(reference_books::table)
                .values(NewReferenceBookRow {
                    author: new.author,
                    title: new.title,
                    pdf_url: new.pdf_url,
                    uploaded_by_id: new.uploaded_by_id.map(|u| u.value()),
                })
                .returning(ReferenceBookRow::as_returning())
                .get_result::<ReferenceBookRow>(conn)?;
            Ok(row.into())
        })
        .await
    }

    async fn list_reference_books(&self) -> RepositoryResult<Vec<ReferenceBook>> {
        self.run("list_reference_books", |conn| {
            let rows = reference_books::table
                .order(reference_books::created_at.desc())
                .select(ReferenceBookRow::as_select())
                .load::<ReferenceBookRow>(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn delete_reference_book(&self, id: i64) -> RepositoryResult<bool> {
        self.run("delete_reference_book", move |conn| {
            let deleted =
                diesel::delete(reference_books::table.find(id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn ping(&self) -> RepositoryResult<bool> {
        self.run("ping", |conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }
}
