pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod services;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Result, ThumbnailError};
pub use services::{GenerationOutcome, ThumbnailGenerator};
pub use state::AppState;
