//! Query configuration that handles carry and downstream crates can
//! serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Answer `count()` from a known length instead of iterating.
    pub use_length_hints: bool,

    /// Initial bucket capacity of the multimap behind `group_by` and the joins.
    pub group_capacity: usize,

    /// Emit a metrics span for every terminal operation.
    pub trace_terminals: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            use_length_hints: true,
            group_capacity: 16,
            trace_terminals: false,
        }
    }
}

impl QueryConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `LAZYQ_USE_LENGTH_HINTS`: `true`/`false`
    /// - `LAZYQ_GROUP_CAPACITY`: initial multimap capacity
    /// - `LAZYQ_TRACE_TERMINALS`: `true`/`false`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("LAZYQ_USE_LENGTH_HINTS") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.use_length_hints = v;
            }
        }

        if let Ok(s) = std::env::var("LAZYQ_GROUP_CAPACITY") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.group_capacity = v;
            }
        }

        if let Ok(s) = std::env::var("LAZYQ_TRACE_TERMINALS") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.trace_terminals = v;
            }
        }

        cfg
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(doc: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(doc)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.group_capacity == 0 {
            return Err(Error::Config("group_capacity must be at least 1".into()));
        }
        Ok(())
    }
}
