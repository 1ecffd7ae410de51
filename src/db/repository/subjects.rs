//! Subject repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::db::models::{NewSubject, Subject};

/// Repository trait for the denormalized subject records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// List all subjects, ordered alphabetically by name.
    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>>;

    /// Insert a subject.
    async fn insert_subject(&self, new: NewSubject) -> RepositoryResult<Subject>;

    /// Delete a subject by id.
    ///
    /// # Returns
    /// * `Ok(true)` - Row existed and was deleted
    /// * `Ok(false)` - No such row
    async fn delete_subject(&self, id: i64) -> RepositoryResult<bool>;
}
