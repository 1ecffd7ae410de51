//! Attendance repository trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::api::CourseId;
use crate::db::models::{AttendanceEntry, NewAttendanceRecord};

/// Repository trait for attendance records.
///
/// Attendance is keyed by (date, course): a submission is authoritative for
/// that key, not additive.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Replace every record matching (date [, course]) with `records`.
    ///
    /// The delete and the inserts form a single transaction: a failed
    /// submission leaves the previous record set intact. When `course_id`
    /// is `None` the date's records are replaced across all courses.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows inserted
    async fn replace_attendance(
        &self,
        date: NaiveDate,
        course_id: Option<CourseId>,
        records: Vec<NewAttendanceRecord>,
    ) -> RepositoryResult<usize>;

    /// List records for a date, optionally filtered to one course, joined
    /// with student names and course labels.
    async fn list_attendance(
        &self,
        date: NaiveDate,
        course_id: Option<CourseId>,
    ) -> RepositoryResult<Vec<AttendanceEntry>>;
}
