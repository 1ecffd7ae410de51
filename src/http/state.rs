//! Application state for the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Token signer shared by login and the auth extractors
    pub tokens: TokenSigner,
    /// Directory uploaded PDFs are written to and served from
    pub upload_dir: PathBuf,
    /// Directory the prebuilt frontend bundle is served from
    pub frontend_dir: PathBuf,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        repository: Arc<dyn FullRepository>,
        tokens: TokenSigner,
        upload_dir: impl Into<PathBuf>,
        frontend_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            tokens,
            upload_dir: upload_dir.into(),
            frontend_dir: frontend_dir.into(),
        }
    }
}
