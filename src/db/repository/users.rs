//! User and student repository trait.
//!
//! Users and students live in separate tables with a 1:1 link for the
//! student role, so their operations share one trait: student creation has
//! to write both rows atomically.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{CourseId, StudentId, UserId};
use crate::db::models::{NewUser, Student, StudentProfile, User};

/// Repository trait for user accounts and student records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by id.
    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>>;

    /// Find a user whose email OR username equals `identifier`.
    ///
    /// This is the login lookup; the frontend sends one field that may be
    /// either.
    async fn find_user_by_identifier(&self, identifier: &str)
        -> RepositoryResult<Option<User>>;

    /// Find a user by exact email.
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Insert a user account (admin or staff).
    async fn insert_user(&self, new: NewUser) -> RepositoryResult<User>;

    /// Insert a student: the user account plus the student row, atomically.
    ///
    /// # Arguments
    /// * `new` - The user account fields (role must be student)
    /// * `course_id` - Optional course the student belongs to
    ///
    /// # Returns
    /// * `Ok((User, Student))` - Both stored rows
    /// * `Err(RepositoryError)` - Neither row persisted
    async fn insert_student_user(
        &self,
        new: NewUser,
        course_id: Option<CourseId>,
    ) -> RepositoryResult<(User, Student)>;

    /// Fetch a student row by id.
    async fn get_student(&self, id: StudentId) -> RepositoryResult<Option<Student>>;

    /// Fetch the student row belonging to a user, if any.
    async fn student_for_user(&self, user_id: UserId) -> RepositoryResult<Option<Student>>;

    /// Find a student by the exact full name of its user.
    ///
    /// Fallback used when the frontend submits rows keyed by display name
    /// instead of id.
    async fn find_student_by_full_name(
        &self,
        full_name: &str,
    ) -> RepositoryResult<Option<Student>>;

    /// Fetch a student joined with its user and course label.
    async fn get_student_profile(
        &self,
        id: StudentId,
    ) -> RepositoryResult<Option<StudentProfile>>;

    /// List student profiles, optionally restricted to one course.
    async fn list_students(
        &self,
        course_id: Option<CourseId>,
    ) -> RepositoryResult<Vec<StudentProfile>>;
}
