//! Environment variable lookup

use std::collections::{BTreeMap, HashMap};
use std::env;

/// Source of environment variable values.
///
/// The binder only reads through this trait, so records can be bound from
/// the process environment or from any in-memory table.
pub trait Lookup {
    /// Value of `name`, or `None` if it is not set.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The process environment.
///
/// Empty names and values that are not valid UTF-8 are reported as absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        env::var(name).ok()
    }
}

impl Lookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Lookup for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<L: Lookup + ?Sized> Lookup for &L {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}
