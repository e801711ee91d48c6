//! Talk-to-me library
//!
//! Forwards prompts to the OpenAI Responses API, normalizes the loosely
//! shaped response into a single answer and estimates token usage against
//! per-model context windows

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use handlers::{build_router, create_router, AppState};
pub use services::{
    count_tokens, normalize, ExtractedMessage, LimitStatus, ModelLimitTable, OpenAIClient, ResponsesApi,
    TokenUsage, UsageEstimator,
};
pub use utils::error::{AppError, AppResult, ClassifiedError, StatusClass};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
