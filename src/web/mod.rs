//! The single-page upload form.
//!
//! | Route              | Method | Response |
//! |--------------------|--------|----------|
//! | `/`                | GET    | the empty form |
//! | `/analyze`         | POST   | the form again, with the report or the failure |
//! | `/api/analyze`     | POST   | `analysis.pdf` as an attachment, or JSON `{ "error" }` |
//! | `/health`          | GET    | liveness |
//!
//! Both POST routes take the same multipart body (see [`form`]). Each request
//! is one independent run; nothing survives between requests.

pub mod error;
pub mod form;
pub mod handlers;
pub mod page;
pub mod router;
pub mod server;

use crate::config::AnalysisConfig;
use std::sync::Arc;

pub use error::ApiError;
pub use router::create_router;
pub use server::run_server;

/// Default cap on one request body: a year of statements fits easily.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared across request tasks.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AnalysisConfig>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config: Arc::new(config),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}
