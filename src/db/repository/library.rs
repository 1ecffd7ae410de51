//! Reference book repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::db::models::{NewReferenceBook, ReferenceBook};

/// Repository trait for uploaded reference book metadata.
///
/// The PDF bytes themselves live on disk under the upload directory; the
/// repository only tracks the catalog rows.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ReferenceBookRepository: Send + Sync {
    /// Insert a reference book row. `created_at` is set by the store.
    async fn insert_reference_book(
        &self,
        new: NewReferenceBook,
    ) -> RepositoryResult<ReferenceBook>;

    /// List reference books, newest first.
    async fn list_reference_books(&self) -> RepositoryResult<Vec<ReferenceBook>>;

    /// Delete a reference book row by id.
    ///
    /// # Returns
    /// * `Ok(true)` - Row existed and was deleted
    /// * `Ok(false)` - No such row
    async fn delete_reference_book(&self, id: i64) -> RepositoryResult<bool>;
}
