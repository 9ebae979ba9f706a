//! Rebuild-on-change graph cache keyed by the spatial model's version.
//! Thread-safe via Mutex; invalidation is explicit and driven by the owning
//! application when the model is edited.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::debug;

use crate::errors::GraphError;
use crate::graph::builder::build_graph;
use crate::graph::NavigationGraph;
use crate::options::BuildOptions;
use crate::spatial::SpatialModel;

#[derive(Copy, Clone, Debug)]
pub struct GraphCacheConfig {
    /// Maximum number of model versions kept in memory. Oldest is evicted.
    pub capacity: usize,
}

impl Default for GraphCacheConfig {
    fn default() -> Self {
        Self { capacity: 4 }
    }
}

/// LRU cache of built graphs, keyed by `SpatialModel::version`. Searches hold
/// an `Arc` to a graph, so eviction or invalidation never races an in-flight
/// query.
pub struct GraphCache {
    build_options: BuildOptions,
    inner: Mutex<LruCache<u64, Arc<NavigationGraph>>>,
}

impl GraphCache {
    pub fn with_capacity(build_options: BuildOptions, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self { build_options, inner: Mutex::new(LruCache::new(cap)) }
    }

    pub fn new(build_options: BuildOptions) -> Self {
        Self::with_capacity(build_options, GraphCacheConfig::default().capacity)
    }

    /// Returns the cached graph for the model's version, building it on miss.
    /// Builds happen outside the lock; a concurrent build of the same version
    /// is resolved by a double-checked insert.
    pub fn get_or_build(&self, model: &SpatialModel) -> Arc<NavigationGraph> {
        if let Some(hit) = self.lookup(model.version) {
            return hit;
        }
        let built = Arc::new(build_graph(model, &self.build_options));

        let mut guard = self.inner.lock().expect("graph cache mutex poisoned");
        if let Some(existing) = guard.get(&model.version) {
            return existing.clone();
        }
        debug!(version = model.version, "caching freshly built navigation graph");
        guard.put(model.version, built.clone());
        built
    }

    /// Cached graph for a version the caller believes is loaded.
    pub fn get(&self, version: u64) -> Result<Arc<NavigationGraph>, GraphError> {
        self.lookup(version).ok_or(GraphError::ModelUnavailable(version))
    }

    /// Drops one version, forcing a rebuild on next use. Called by the owning
    /// application after an edit.
    pub fn invalidate(&self, version: u64) {
        let mut guard = self.inner.lock().expect("graph cache mutex poisoned");
        guard.pop(&version);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.lock().expect("graph cache mutex poisoned");
        guard.clear();
    }

    fn lookup(&self, version: u64) -> Option<Arc<NavigationGraph>> {
        let mut guard = self.inner.lock().expect("graph cache mutex poisoned");
        guard.get(&version).cloned()
    }
}
