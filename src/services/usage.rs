//! Token usage estimation
//!
//! Counts tokens with a deterministic heuristic and compares the total against
//! a per-model context window. The heuristic is an approximation and does not
//! match any model's real tokenizer: a token is either a maximal run of ASCII
//! alphanumerics or a single non-whitespace, non-alphanumeric character.
//! Whitespace never counts. Whitespace means Unicode `White_Space` plus the
//! byte order mark U+FEFF, minus NEXT LINE U+0085.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Context window used for models missing from the table
pub const DEFAULT_CONTEXT_LIMIT: usize = 8192;

/// Built-in context window sizes
pub const BUILTIN_CONTEXT_LIMITS: &[(&str, usize)] = &[
    ("gpt-3.5-turbo", 16385),
    ("gpt-4", 8192),
    ("gpt-4-turbo", 128000),
    ("gpt-4o", 32768),
    ("gpt-4o-mini", 32768),
    ("gpt-4.1", 32768),
    ("gpt-4.1-mini", 32768),
];

/// Model identifier to context window size, with a default for unknown models
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLimitTable {
    limits: HashMap<String, usize>,
    default_limit: usize,
}

impl ModelLimitTable {
    /// Empty table that answers `default_limit` for every model
    pub fn new(default_limit: usize) -> Self {
        Self {
            limits: HashMap::new(),
            default_limit,
        }
    }

    /// Table preloaded with [`BUILTIN_CONTEXT_LIMITS`]
    pub fn builtin() -> Self {
        let mut table = Self::new(DEFAULT_CONTEXT_LIMIT);
        for (model, limit) in BUILTIN_CONTEXT_LIMITS {
            table.insert(*model, *limit);
        }
        table
    }

    pub fn with_limit(mut self, model: impl Into<String>, limit: usize) -> Self {
        self.insert(model, limit);
        self
    }

    pub fn insert(&mut self, model: impl Into<String>, limit: usize) {
        self.limits.insert(model.into(), limit);
    }

    pub fn set_default_limit(&mut self, limit: usize) {
        self.default_limit = limit;
    }

    /// Context window for `model`, or the default entry
    pub fn get(&self, model: &str) -> usize {
        self.limits.get(model).copied().unwrap_or(self.default_limit)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.limits.contains_key(model)
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

impl Default for ModelLimitTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Approximate token usage of one request
///
/// `total` is always `input + output`; build it with [`TokenUsage::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub model: String,
    pub context_limit: usize,
    pub input: usize,
    pub output: usize,
    pub total: usize,
}

impl TokenUsage {
    pub fn new(model: impl Into<String>, context_limit: usize, input: usize, output: usize) -> Self {
        Self {
            model: model.into(),
            context_limit,
            input,
            output,
            total: input + output,
        }
    }

    pub fn limit_status(&self) -> LimitStatus {
        LimitStatus::of(self)
    }
}

/// Where a usage total sits relative to its context limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStatus {
    Nominal,
    /// Above 90% of the limit
    NearLimit,
    /// At or above the limit
    OverLimit,
}

impl LimitStatus {
    pub fn of(usage: &TokenUsage) -> Self {
        let total = usage.total as u128;
        let limit = usage.context_limit as u128;

        if total >= limit {
            LimitStatus::OverLimit
        } else if total * 10 > limit * 9 {
            LimitStatus::NearLimit
        } else {
            LimitStatus::Nominal
        }
    }
}

/// Count tokens in `text` with the approximate heuristic
pub fn count_tokens(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if !in_word {
                count += 1;
                in_word = true;
            }
        } else {
            in_word = false;
            if !is_separator(ch) {
                count += 1;
            }
        }
    }

    count
}

fn is_separator(ch: char) -> bool {
    match ch {
        '\u{FEFF}' => true,
        '\u{0085}' => false,
        _ => ch.is_whitespace(),
    }
}

/// Estimates token usage against an injected limit table
#[derive(Debug, Clone)]
pub struct UsageEstimator {
    limits: Arc<ModelLimitTable>,
}

impl UsageEstimator {
    pub fn new(limits: Arc<ModelLimitTable>) -> Self {
        Self { limits }
    }

    /// Estimate usage for an input/output text pair sent to `model`
    pub fn estimate(&self, input_text: &str, output_text: &str, model: &str) -> TokenUsage {
        let usage = TokenUsage::new(
            model,
            self.limits.get(model),
            count_tokens(input_text),
            count_tokens(output_text),
        );

        debug!(
            model = %usage.model,
            input = usage.input,
            output = usage.output,
            total = usage.total,
            context_limit = usage.context_limit,
            "Estimated token usage"
        );

        usage
    }

    pub fn limits(&self) -> &ModelLimitTable {
        &self.limits
    }
}

impl Default for UsageEstimator {
    fn default() -> Self {
        Self::new(Arc::new(ModelLimitTable::builtin()))
    }
}
