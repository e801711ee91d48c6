//! Data models module
//!
//! Defines the end-user API bodies and the upstream Responses API request

pub mod api;
pub mod upstream;

pub use api::*;
pub use upstream::*;
