//! Result (marks) repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::StudentId;
use crate::db::models::{NewResult, ResultEntry};

/// Repository trait for internal-assessment result rows.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Insert a result row and return it joined with the student's name.
    async fn insert_result(&self, new: NewResult) -> RepositoryResult<ResultEntry>;

    /// List results, filtered by student id or by exact student name.
    /// The id filter wins when both are present.
    async fn list_results(
        &self,
        student_id: Option<StudentId>,
        student_name: Option<&str>,
    ) -> RepositoryResult<Vec<ResultEntry>>;
}
