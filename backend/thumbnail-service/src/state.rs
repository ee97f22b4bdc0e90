use std::sync::Arc;

use crate::config::Config;
use crate::db::{CreditLedger, GenerationStore};
use crate::error::{ApiError, ThumbnailError};
use crate::services::ThumbnailGenerator;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<ThumbnailGenerator>,
    pub ledger: Arc<dyn CreditLedger>,
    pub generations: Arc<dyn GenerationStore>,
}

impl AppState {
    /// Wrap a service error for the response, hiding details in production
    pub fn reject(&self, error: ThumbnailError) -> ApiError {
        ApiError::new(error, !self.config.is_production())
    }
}
