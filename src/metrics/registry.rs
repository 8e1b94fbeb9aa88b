//! Cache of collectors keyed by target and metric-group selection.

use crate::config::ExporterConfig;
use crate::error::Result;
use crate::metrics::collector::Collector;
use crate::metrics::data::{CacheKey, MetricGroupType};
use crate::metrics::traits::ClientBinder;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Owns every [`Collector`] of the process.
///
/// Collectors are created lazily and live until [`CollectorRegistry::reset`]
/// drops their entry. The map lock only covers lookup and insertion; client
/// binding happens under the collector's own lock.
pub struct CollectorRegistry {
    config: Arc<ExporterConfig>,
    binder: Arc<dyn ClientBinder>,
    collectors: Mutex<HashMap<CacheKey, Arc<Collector>>>,
}

impl CollectorRegistry {
    pub fn new(config: Arc<ExporterConfig>, binder: Arc<dyn ClientBinder>) -> Self {
        Self {
            config,
            binder,
            collectors: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Arc<ExporterConfig> {
        &self.config
    }

    /// Return the collector for the key, creating and binding it as needed.
    ///
    /// A binding failure is returned to the caller but the entry stays in
    /// the cache unbound; the next lookup retries the binding.
    pub async fn get(&self, target: &str, group: MetricGroupType) -> Result<Arc<Collector>> {
        let key = CacheKey::new(target, group);
        let collector = {
            let mut collectors = self
                .collectors
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            collectors
                .entry(key)
                .or_insert_with_key(|key| {
                    debug!("Creating collector for host {} ({})", key.target, key.group);
                    Arc::new(Collector::new(key.clone(), &self.config))
                })
                .clone()
        };

        collector.bind_client(self.binder.as_ref()).await?;
        Ok(collector)
    }

    /// Drop the cached collector for the key, if any.
    ///
    /// Callers already holding the old collector finish against it; the next
    /// lookup creates a fresh, unbound one.
    pub fn reset(&self, target: &str, group: MetricGroupType) {
        let key = CacheKey::new(target, group);
        let removed = self
            .collectors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        if removed.is_some() {
            debug!("Removed collector for host {} ({})", target, group);
        }
    }

    pub fn len(&self) -> usize {
        self.collectors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, target: &str, group: MetricGroupType) -> bool {
        self.collectors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&CacheKey::new(target, group))
    }
}
