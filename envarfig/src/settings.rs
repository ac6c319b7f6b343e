//! Options controlling env file loading and caching

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Options for [`bind`](crate::bind) and [`ConfigCache::bind`](crate::ConfigCache::bind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Load env files before binding. With no `env_files`, the default
    /// `.env` file is loaded if present.
    pub auto_load_env: bool,

    /// Env files to load, in order. Requires `auto_load_env`.
    pub env_files: Vec<PathBuf>,

    /// Reuse a previously bound record of the same type.
    ///
    /// Only read by [`ConfigCache::bind`](crate::ConfigCache::bind); plain
    /// [`bind`](crate::bind) and `EnvBind::from_env` always bind afresh.
    pub cache_config: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_load_env: true,
            env_files: Vec::new(),
            cache_config: true,
        }
    }
}

impl Settings {
    /// Set the env files to load.
    pub fn with_env_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.env_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable env file loading.
    pub fn with_auto_load_env(mut self, auto_load_env: bool) -> Self {
        self.auto_load_env = auto_load_env;
        self
    }

    /// Enable or disable caching of bound records.
    pub fn with_cache_config(mut self, cache_config: bool) -> Self {
        self.cache_config = cache_config;
        self
    }
}
