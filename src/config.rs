//! Configuration System
//!
//! Layered configuration for the debugger core: per-field serde defaults,
//! an optional TOML file, and `TICKSCOPE_`-prefixed environment overrides.

use crate::error::DebugError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which side of the simulation this context runs on. Dispatch is a no-op on
/// a pure observer/client context; only the authoritative server side
/// evaluates breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Server,
    Client,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebuggerConfig {
    /// Master instrumentation switch. When off, the mutation hook is a
    /// cheap no-op.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Execution side of this context.
    #[serde(default = "default_side")]
    pub side: Side,

    /// Bound on the stage tree's popped-stage history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_enabled() -> bool {
    true
}

fn default_side() -> Side {
    Side::Server
}

fn default_history_limit() -> usize {
    crate::stage::tree::DEFAULT_HISTORY_LIMIT
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            side: default_side(),
            history_limit: default_history_limit(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DebuggerConfig {
    /// Load configuration from an optional TOML file plus environment
    /// overrides (`TICKSCOPE_ENABLED`, `TICKSCOPE_LOGGING__LEVEL`, ...).
    pub fn load(path: Option<&Path>) -> Result<Self, DebugError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            let name = path
                .to_str()
                .ok_or_else(|| DebugError::Config(format!("non-UTF-8 config path: {:?}", path)))?;
            builder = builder.add_source(config::File::with_name(name).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("TICKSCOPE")
                .separator("__")
                .try_parsing(true),
        );
        let loaded = builder.build()?;
        Ok(loaded.try_deserialize()?)
    }
}
