//! Course repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::CourseId;
use crate::db::models::{Course, NewCourse};

/// Repository trait for course records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// List all courses, ordered alphabetically by name.
    async fn list_courses(&self) -> RepositoryResult<Vec<Course>>;

    /// Fetch a course by id.
    async fn get_course(&self, id: CourseId) -> RepositoryResult<Option<Course>>;

    /// Find a course by exact name.
    async fn find_course_by_name(&self, name: &str) -> RepositoryResult<Option<Course>>;

    /// Find a course whose name OR code equals `reference`.
    ///
    /// This is the resolution rule for the free-text course fields the
    /// frontend sends (staff creation, student filters, attendance).
    async fn find_course_by_name_or_code(
        &self,
        reference: &str,
    ) -> RepositoryResult<Option<Course>>;

    /// Insert a new course.
    ///
    /// # Returns
    /// * `Ok(Course)` - The stored course with its assigned id
    /// * `Err(RepositoryError::Conflict)` - If the unique name/code is taken
    async fn insert_course(&self, new: NewCourse) -> RepositoryResult<Course>;
}
