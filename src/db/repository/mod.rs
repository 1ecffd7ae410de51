//! Repository trait definitions.
//!
//! Each concern gets its own trait so backends can be reasoned about (and
//! mocked) per table family; [`FullRepository`] bundles them for code that
//! needs the whole store, which is what the service layer takes.

pub mod attendance;
pub mod courses;
pub mod error;
pub mod leaves;
pub mod library;
pub mod results;
pub mod subjects;
pub mod users;

use async_trait::async_trait;

pub use attendance::AttendanceRepository;
pub use courses::CourseRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use leaves::LeaveRepository;
pub use library::ReferenceBookRepository;
pub use results::ResultRepository;
pub use subjects::SubjectRepository;
pub use users::UserRepository;

/// The complete storage interface: every per-concern repository trait plus
/// a connectivity probe.
#[async_trait]
pub trait FullRepository:
    UserRepository
    + CourseRepository
    + SubjectRepository
    + AttendanceRepository
    + ResultRepository
    + LeaveRepository
    + ReferenceBookRepository
{
    /// Check that the backing store is reachable.
    async fn ping(&self) -> RepositoryResult<bool>;
}
