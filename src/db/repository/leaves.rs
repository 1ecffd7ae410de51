//! Leave request repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::StudentId;
use crate::db::models::{LeaveRequest, NewLeaveRequest};

/// Repository trait for leave requests.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    /// Insert a leave request. Status defaults to pending and `created_at`
    /// is set by the store.
    async fn insert_leave_request(
        &self,
        new: NewLeaveRequest,
    ) -> RepositoryResult<LeaveRequest>;

    /// List leave requests, optionally restricted to one student, newest
    /// first.
    async fn list_leave_requests(
        &self,
        student_id: Option<StudentId>,
    ) -> RepositoryResult<Vec<LeaveRequest>>;
}
