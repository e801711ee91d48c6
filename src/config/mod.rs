//! Configuration management module
//!
//! Loads environment settings and the optional model limit file

pub mod file;
pub mod settings;

pub use file::{load_model_limits, ModelLimitsFile};
pub use settings::Settings;
