//! Pre-loading env files into the process environment
//!
//! Files use the usual dotenv `KEY=value` format. Variables that are already
//! set in the process environment are never overridden.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::BindError;

/// Default env file, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Loads env files into the process environment.
pub trait EnvFileLoader {
    /// Load the default env file. Returns `Ok(false)` if it does not exist.
    fn load_default(&self) -> Result<bool, dotenvy::Error>;

    /// Load a specific env file.
    fn load_path(&self, path: &Path) -> Result<(), dotenvy::Error>;
}

/// [`EnvFileLoader`] backed by `dotenvy`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dotenv;

impl EnvFileLoader for Dotenv {
    fn load_default(&self) -> Result<bool, dotenvy::Error> {
        match dotenvy::dotenv() {
            Ok(path) => {
                debug!(path = %path.display(), "loaded default env file");
                Ok(true)
            }
            Err(e) if e.not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn load_path(&self, path: &Path) -> Result<(), dotenvy::Error> {
        dotenvy::from_path(path)
    }
}

/// Pre-load env files with [`Dotenv`].
///
/// See [`preload_with`].
pub fn preload(auto_load: bool, paths: &[PathBuf]) -> Result<(), BindError> {
    preload_with(&Dotenv, auto_load, paths)
}

/// Pre-load env files with `loader`.
///
/// - `auto_load` off with explicit paths is a usage error
/// - `auto_load` on without paths loads [`DEFAULT_ENV_FILE`] if it exists
/// - otherwise every path is loaded in order, stopping at the first failure
pub fn preload_with(
    loader: &dyn EnvFileLoader,
    auto_load: bool,
    paths: &[PathBuf],
) -> Result<(), BindError> {
    if !auto_load {
        if !paths.is_empty() {
            return Err(BindError::AutoLoadDisabled);
        }
        return Ok(());
    }

    if paths.is_empty() {
        let found = loader
            .load_default()
            .map_err(|source| BindError::EnvFile {
                path: PathBuf::from(DEFAULT_ENV_FILE),
                source,
            })?;
        if !found {
            debug!("no default env file found");
        }
        return Ok(());
    }

    for path in paths {
        loader
            .load_path(path)
            .map_err(|source| BindError::EnvFile {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "loaded env file");
    }

    Ok(())
}
