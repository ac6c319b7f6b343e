//! Memoization of bound records
//!
//! A [`ConfigCache`] keeps one bound record per record type. It is an
//! ordinary value: create it at the composition root and share it by
//! reference (it is `Send + Sync`).

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::bind::{bind, bind_with, EnvBind};
use crate::error::BindError;
use crate::lookup::Lookup;
use crate::settings::Settings;

/// Cache of bound records, keyed by record type.
///
/// Insertion is insert-if-absent: when several threads bind the same type
/// concurrently, the first stored record wins and every caller receives a
/// copy of it.
#[derive(Default)]
pub struct ConfigCache {
    records: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ConfigCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `record` like [`crate::bind`], reusing a cached record when
    /// `settings.cache_config` is on.
    ///
    /// On a cache hit no env file is loaded and nothing is parsed.
    pub fn bind<T>(&self, record: &mut T, settings: &Settings) -> Result<(), BindError>
    where
        T: EnvBind + Clone + Send + Sync + 'static,
    {
        self.memoize(record, settings.cache_config, |record| bind(record, settings))
    }

    /// Bind `record` from `lookup`, reusing a cached record if present.
    pub fn bind_with<T>(&self, record: &mut T, lookup: &dyn Lookup) -> Result<(), BindError>
    where
        T: EnvBind + Clone + Send + Sync + 'static,
    {
        self.memoize(record, true, |record| bind_with(record, lookup))
    }

    fn memoize<T, F>(&self, record: &mut T, enabled: bool, bind_record: F) -> Result<(), BindError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut T) -> Result<(), BindError>,
    {
        if enabled {
            if let Some(cached) = self.get::<T>() {
                debug!(record = std::any::type_name::<T>(), "using cached record");
                *record = cached;
                return Ok(());
            }
        }

        bind_record(record)?;

        if enabled {
            if let Some(winner) = self.insert_if_absent(record.clone()) {
                *record = winner;
            }
        }
        Ok(())
    }

    /// Store `record` unless a record of type `T` is already cached.
    ///
    /// Returns a copy of the record that ends up in the cache.
    pub fn insert_if_absent<T>(&self, record: T) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = self
            .records
            .entry(TypeId::of::<T>())
            .or_insert_with(|| -> Arc<dyn Any + Send + Sync> { Arc::new(record) });
        entry.value().downcast_ref::<T>().cloned()
    }

    /// A copy of the cached record of type `T`.
    pub fn get<T>(&self) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.records
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value().downcast_ref::<T>().cloned())
    }

    /// Whether a record of type `T` is cached.
    pub fn contains<T: 'static>(&self) -> bool {
        self.records.contains_key(&TypeId::of::<T>())
    }

    /// Drop the cached record of type `T`.
    pub fn remove<T: 'static>(&self) -> bool {
        self.records.remove(&TypeId::of::<T>()).is_some()
    }

    /// Drop every cached record.
    pub fn clear(&self) {
        self.records.clear();
    }

    /// Number of cached record types.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("records", &self.records.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::Binder;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Limits {
        max: u32,
    }

    impl EnvBind for Limits {
        fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError> {
            binder.field("max", "MAX", &mut self.max)
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Names {
        name: String,
    }

    impl EnvBind for Names {
        fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError> {
            binder.field("name", "NAME,required", &mut self.name)
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_second_bind_uses_cache() {
        let cache = ConfigCache::new();

        let mut first = Limits::default();
        cache.bind_with(&mut first, &vars(&[("MAX", "10")])).unwrap();
        assert_eq!(first.max, 10);

        let mut second = Limits::default();
        cache.bind_with(&mut second, &vars(&[("MAX", "99")])).unwrap();
        assert_eq!(second.max, 10);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_types_are_cached_separately() {
        let cache = ConfigCache::new();
        let env = vars(&[("MAX", "3"), ("NAME", "svc")]);

        let mut limits = Limits::default();
        let mut names = Names::default();
        cache.bind_with(&mut limits, &env).unwrap();
        cache.bind_with(&mut names, &env).unwrap();

        assert_eq!(cache.get::<Limits>(), Some(Limits { max: 3 }));
        assert_eq!(cache.get::<Names>(), Some(Names { name: "svc".to_string() }));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_bind_is_not_cached() {
        let cache = ConfigCache::new();
        let mut names = Names::default();
        assert!(cache.bind_with(&mut names, &vars(&[])).is_err());
        assert!(!cache.contains::<Names>());

        cache
            .bind_with(&mut names, &vars(&[("NAME", "later")]))
            .unwrap();
        assert_eq!(names.name, "later");
    }

    #[test]
    fn test_insert_if_absent_keeps_first() {
        let cache = ConfigCache::new();
        assert_eq!(cache.insert_if_absent(Limits { max: 1 }), Some(Limits { max: 1 }));
        assert_eq!(cache.insert_if_absent(Limits { max: 2 }), Some(Limits { max: 1 }));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = ConfigCache::new();
        cache.insert_if_absent(Limits { max: 1 });
        cache.insert_if_absent(Names::default());

        assert!(cache.remove::<Limits>());
        assert!(!cache.remove::<Limits>());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_binds_agree() {
        let cache = ConfigCache::new();
        let counter = AtomicUsize::new(0);

        let results: Vec<u32> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let cache = &cache;
                    let counter = &counter;
                    scope.spawn(move || {
                        let n = counter.fetch_add(1, Ordering::SeqCst).to_string();
                        let mut limits = Limits::default();
                        cache.bind_with(&mut limits, &vars(&[("MAX", n.as_str())])).unwrap();
                        limits.max
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let stored = cache.get::<Limits>().unwrap().max;
        assert!(results.iter().all(|max| *max == stored));
    }
}
