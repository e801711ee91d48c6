//! Middleware module
//!
//! HTTP middleware wrapped around every route

pub mod logging;

pub use logging::request_logging_middleware;
