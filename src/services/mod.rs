//! Service layer module
//!
//! Contains the upstream client, payload shaping, response normalization and
//! token usage estimation

pub mod client;
pub mod normalizer;
pub mod payload;
pub mod usage;

pub use client::{OpenAIClient, ResponsesApi};
pub use normalizer::{normalize, ContentMarker, ExtractedMessage};
pub use payload::{shape_request, PayloadDefaults};
pub use usage::{count_tokens, LimitStatus, ModelLimitTable, TokenUsage, UsageEstimator};
