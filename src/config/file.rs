//! Model limit file
//!
//! Loads context window overrides from a JSON file:
//!
//! ```json
//! { "default": 8192, "models": { "gpt-4o": 32768, "my-finetune": 16384 } }
//! ```

use crate::services::usage::ModelLimitTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name searched in the default locations
pub const MODEL_LIMITS_FILE_NAME: &str = "model_limits.json";

/// Context window overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelLimitsFile {
    /// Replacement for the fallback limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<usize>,
    /// Per-model limits, merged over the built-in table
    #[serde(default)]
    pub models: HashMap<String, usize>,
}

impl ModelLimitsFile {
    /// Load overrides from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading model limits from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model limits file: {:?}", path))?;

        let file: ModelLimitsFile = serde_json::from_str(&content)
            .with_context(|| "Failed to parse model limits JSON")?;

        file.validate()?;

        debug!("Loaded {} model limits", file.models.len());
        Ok(file)
    }

    /// Search the default locations
    ///
    /// 1. ~/.config/talktome/model_limits.json
    /// 2. ./model_limits.json
    ///
    /// Returns `None` when neither exists.
    pub fn load_default() -> Result<Option<Self>> {
        match default_path() {
            Some(path) => Self::load(&path).map(Some),
            None => Ok(None),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.default == Some(0) {
            anyhow::bail!("Default context limit must be greater than 0");
        }

        for (model, limit) in &self.models {
            if model.trim().is_empty() {
                anyhow::bail!("Model names in the limits file cannot be empty");
            }
            if *limit == 0 {
                anyhow::bail!("Context limit for model '{}' must be greater than 0", model);
            }
        }

        Ok(())
    }

    /// Merge these overrides into `table`
    pub fn apply_to(&self, table: &mut ModelLimitTable) {
        if let Some(default) = self.default {
            table.set_default_limit(default);
        }
        for (model, limit) in &self.models {
            table.insert(model.clone(), *limit);
        }
    }
}

fn default_path() -> Option<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        let config_path = home.join(".config").join("talktome").join(MODEL_LIMITS_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
    }

    let local_path = PathBuf::from(MODEL_LIMITS_FILE_NAME);
    local_path.exists().then_some(local_path)
}

/// Build the process-wide limit table
///
/// An explicit `path` must exist; otherwise the default locations are tried
/// and the built-in table is used when none is found.
pub fn load_model_limits(path: Option<&Path>) -> Result<ModelLimitTable> {
    let overrides = match path {
        Some(path) => Some(ModelLimitsFile::load(path)?),
        None => ModelLimitsFile::load_default()?,
    };

    let mut table = ModelLimitTable::builtin();
    if let Some(overrides) = overrides {
        overrides.apply_to(&mut table);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_apply_overrides() {
        let file = ModelLimitsFile {
            default: Some(4096),
            models: HashMap::from([("custom".to_string(), 1000), ("gpt-4o".to_string(), 128000)]),
        };

        let mut table = ModelLimitTable::builtin();
        file.apply_to(&mut table);

        assert_eq!(table.default_limit(), 4096);
        assert_eq!(table.get("custom"), 1000);
        assert_eq!(table.get("gpt-4o"), 128000);
        assert_eq!(table.get("gpt-4"), 8192);
    }

    #[test]
    fn test_load_rejects_zero_limit() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, r#"{{"models": {{"broken": 0}}}}"#).unwrap();

        assert!(ModelLimitsFile::load(tmp.path()).is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        assert!(load_model_limits(Some(Path::new("/nonexistent/model_limits.json"))).is_err());
    }
}
