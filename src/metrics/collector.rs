//! Per-target collector with single-flight gathering.

use crate::config::{CollectConfig, ExporterConfig};
use crate::error::{ExporterError, Result};
use crate::metrics::data::{CacheKey, Descriptor, MetricKind, Sample, SampleSink};
use crate::metrics::dispatch::RefreshTable;
use crate::metrics::render::render;
use crate::metrics::traits::{ClientBinder, RemoteClient};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Outcome of one collection cycle, shared by every caller waiting on it.
type CycleResult = std::result::Result<Arc<str>, String>;
type InFlight = Shared<BoxFuture<'static, CycleResult>>;

/// Revision baked in at build time, if the build provides one.
const REVISION: &str = match option_env!("GIT_REVISION") {
    Some(revision) => revision,
    None => "unknown",
};

struct CollectorState {
    client: Option<Arc<dyn RemoteClient>>,
    in_flight: Option<InFlight>,
    rendered: Arc<str>,
}

impl Default for CollectorState {
    fn default() -> Self {
        Self {
            client: None,
            in_flight: None,
            rendered: Arc::from(""),
        }
    }
}

/// Collects and renders all metric groups for one [`CacheKey`].
///
/// At most one cycle runs at a time. Callers arriving while a cycle is in
/// flight wait for it, bounded by the configured gather timeout, and receive
/// the same rendered text. A cycle keeps running when its callers give up.
pub struct Collector {
    key: CacheKey,
    table: RefreshTable,
    collect: CollectConfig,
    gather_timeout: Duration,
    build_info: Arc<Descriptor>,
    scrape_errors: Arc<Descriptor>,
    errors: AtomicU64,
    cycles: AtomicU64,
    state: Mutex<CollectorState>,
}

impl Collector {
    pub fn new(key: CacheKey, config: &ExporterConfig) -> Self {
        Self::with_table(key, config, RefreshTable::new(&config.metrics_prefix))
    }

    /// Build a collector around a custom dispatch table.
    pub fn with_table(key: CacheKey, config: &ExporterConfig, table: RefreshTable) -> Self {
        let prefix = &config.metrics_prefix;
        Self {
            key,
            table,
            collect: config.collect.clone(),
            gather_timeout: config.gather_timeout(),
            build_info: Descriptor::with_const_labels(
                prefix,
                "exporter",
                "build_info",
                "Constant metric with build information for the exporter",
                MetricKind::Untyped,
                vec![
                    ("version".to_string(), env!("CARGO_PKG_VERSION").to_string()),
                    ("revision".to_string(), REVISION.to_string()),
                ],
            ),
            scrape_errors: Descriptor::new(
                prefix,
                "exporter",
                "scrape_errors_total",
                "Total number of errors encountered while scraping target",
                MetricKind::Gauge,
                &[],
            ),
            errors: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
            state: Mutex::new(CollectorState::default()),
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Bind a client unless one is already bound.
    ///
    /// Runs under the collector lock, so concurrent lookups of the same key
    /// never bind twice.
    pub async fn bind_client(&self, binder: &dyn ClientBinder) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.client.is_none() {
            debug!("Binding client for host {}", self.key.target);
            let client = binder.bind(&self.key.target).await?;
            state.client = Some(client);
        }
        Ok(())
    }

    pub async fn is_bound(&self) -> bool {
        self.state.lock().await.client.is_some()
    }

    pub async fn is_collecting(&self) -> bool {
        self.state.lock().await.in_flight.is_some()
    }

    /// Text produced by the last successful cycle.
    pub async fn last_rendered(&self) -> String {
        self.state.lock().await.rendered.to_string()
    }

    /// Cumulative number of failed group refreshes.
    pub fn scrape_errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Number of collection cycles that ran to completion.
    pub fn completed_cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Every descriptor this collector may emit.
    pub fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        let mut descriptors = vec![&self.build_info, &self.scrape_errors];
        descriptors.extend(self.table.descriptors());
        descriptors
    }

    /// Return the rendered metrics, starting a cycle or joining the one in flight.
    pub async fn gather(self: &Arc<Self>) -> Result<String> {
        let flight = {
            let mut state = self.state.lock().await;
            match &state.in_flight {
                Some(flight) => {
                    debug!(
                        "Collection for host {} already in progress, waiting for it",
                        self.key.target
                    );
                    flight.clone()
                }
                None => {
                    let client = state.client.clone().ok_or_else(|| {
                        ExporterError::bind_error(&self.key.target, "no client bound")
                    })?;
                    let flight = self.start_cycle(client);
                    state.in_flight = Some(flight.clone());
                    flight
                }
            }
        };

        match tokio::time::timeout(self.gather_timeout, flight).await {
            Ok(Ok(text)) => Ok(text.to_string()),
            Ok(Err(message)) => Err(ExporterError::serialization_error(message)),
            Err(_) => Err(ExporterError::GatherTimeout {
                target: self.key.target.clone(),
                seconds: self.gather_timeout.as_secs(),
            }),
        }
    }

    fn start_cycle(self: &Arc<Self>, client: Arc<dyn RemoteClient>) -> InFlight {
        let collector = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(collector.collect_cycle(client.as_ref()))
                .catch_unwind()
                .await;
            let result: CycleResult = match outcome {
                Ok(Ok(text)) => Ok(Arc::from(text)),
                Ok(Err(err)) => Err(err.to_string()),
                Err(_) => Err(format!(
                    "collection cycle for host {} panicked",
                    collector.key.target
                )),
            };
            collector.finish_cycle(&result).await;
            result
        });

        async move {
            handle
                .await
                .unwrap_or_else(|e| Err(format!("collection task failed: {}", e)))
        }
        .boxed()
        .shared()
    }

    async fn collect_cycle(&self, client: &dyn RemoteClient) -> Result<String> {
        let mut sink = SampleSink::new();
        let failed = self
            .table
            .run(client, self.key.group, &self.collect, &self.key.target, &mut sink)
            .await;
        let total = self.errors.fetch_add(failed, Ordering::Relaxed) + failed;

        sink.push(Sample::new(&self.build_info, 1.0, Vec::new()));
        sink.push(Sample::new(&self.scrape_errors, total as f64, Vec::new()));

        render(sink.samples())
    }

    async fn finish_cycle(&self, result: &CycleResult) {
        let mut state = self.state.lock().await;
        match result {
            Ok(text) => state.rendered = Arc::clone(text),
            Err(message) => error!(
                "Collection for host {} failed: {}",
                self.key.target, message
            ),
        }
        state.in_flight = None;
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::data::MetricGroupType;
    use crate::metrics::groups::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Client whose system refresh sleeps and counts invocations.
    struct SlowClient {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl RemoteClient for SlowClient {
        async fn refresh_system(&self, group: &SystemMetricGroup, sink: &mut SampleSink) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            sink.push(group.new_power_on("On"));
            Ok(())
        }

        async fn refresh_sensors(&self, _: &SensorsMetricGroup, _: &mut SampleSink) -> Result<()> {
            Ok(())
        }

        async fn refresh_power(&self, _: &PowerMetricGroup, _: &mut SampleSink) -> Result<()> {
            Err(ExporterError::refresh_error("power", "HTTP 503"))
        }

        async fn refresh_event_log(&self, _: &EventLogMetricGroup, _: &mut SampleSink) -> Result<()> {
            Ok(())
        }

        async fn refresh_storage(&self, _: &StorageMetricGroup, _: &mut SampleSink) -> Result<()> {
            Ok(())
        }

        async fn refresh_memory(&self, _: &MemoryMetricGroup, _: &mut SampleSink) -> Result<()> {
            Ok(())
        }
    }

    struct StaticBinder(Arc<SlowClient>);

    #[async_trait]
    impl ClientBinder for StaticBinder {
        async fn bind(&self, _target: &str) -> Result<Arc<dyn RemoteClient>> {
            Ok(self.0.clone())
        }
    }

    /// Client whose system refresh panics mid-cycle.
    struct PanickingClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteClient for PanickingClient {
        async fn refresh_system(&self, _: &SystemMetricGroup, _: &mut SampleSink) -> Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            panic!("malformed response on call {}", call);
        }

        async fn refresh_sensors(&self, _: &SensorsMetricGroup, _: &mut SampleSink) -> Result<()> {
            Ok(())
        }

        async fn refresh_power(&self, _: &PowerMetricGroup, _: &mut SampleSink) -> Result<()> {
            Ok(())
        }

        async fn refresh_event_log(&self, _: &EventLogMetricGroup, _: &mut SampleSink) -> Result<()> {
            Ok(())
        }

        async fn refresh_storage(&self, _: &StorageMetricGroup, _: &mut SampleSink) -> Result<()> {
            Ok(())
        }

        async fn refresh_memory(&self, _: &MemoryMetricGroup, _: &mut SampleSink) -> Result<()> {
            Ok(())
        }
    }

    struct PanickingBinder(Arc<PanickingClient>);

    #[async_trait]
    impl ClientBinder for PanickingBinder {
        async fn bind(&self, _target: &str) -> Result<Arc<dyn RemoteClient>> {
            Ok(self.0.clone())
        }
    }

    async fn bound_collector(delay: Duration, config: &ExporterConfig) -> (Arc<Collector>, Arc<SlowClient>) {
        let client = Arc::new(SlowClient {
            calls: AtomicUsize::new(0),
            delay,
        });
        let collector = Arc::new(Collector::new(
            CacheKey::new("bmc-01", MetricGroupType::Any),
            config,
        ));
        collector
            .bind_client(&StaticBinder(client.clone()))
            .await
            .unwrap();
        (collector, client)
    }

    #[tokio::test]
    async fn test_gather_without_client_fails() {
        let collector = Arc::new(Collector::new(
            CacheKey::new("bmc-01", MetricGroupType::Any),
            &ExporterConfig::default(),
        ));
        assert!(!collector.is_bound().await);
        assert!(matches!(
            collector.gather().await,
            Err(ExporterError::ClientBind { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_gathers_share_one_cycle() {
        let (collector, client) =
            bound_collector(Duration::from_millis(200), &ExporterConfig::default()).await;

        let results = futures_util::future::join_all((0..5).map(|_| {
            let collector = collector.clone();
            async move { collector.gather().await.unwrap() }
        }))
        .await;

        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(collector.completed_cycles(), 1);
        assert!(results.iter().all(|text| text == &results[0]));
        assert!(!collector.is_collecting().await);
    }

    #[tokio::test]
    async fn test_errors_accumulate_across_cycles() {
        let (collector, _client) =
            bound_collector(Duration::from_millis(1), &ExporterConfig::default()).await;

        let first = collector.gather().await.unwrap();
        assert!(first.contains("idrac_exporter_scrape_errors_total 1"));
        let second = collector.gather().await.unwrap();
        assert!(second.contains("idrac_exporter_scrape_errors_total 2"));
        assert!(second.contains("idrac_system_power_on 1"));
        assert_eq!(collector.scrape_errors(), 2);
        assert_eq!(collector.last_rendered().await, second);
    }

    #[tokio::test]
    async fn test_gather_wait_is_bounded() {
        let config = ExporterConfig {
            gather_timeout: 1,
            ..Default::default()
        };
        let (collector, client) = bound_collector(Duration::from_secs(3), &config).await;

        let result = collector.gather().await;
        assert!(matches!(result, Err(ExporterError::GatherTimeout { .. })));
        // The cycle keeps running after its caller gave up.
        assert!(collector.is_collecting().await);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_cycle_is_contained() {
        let client = Arc::new(PanickingClient {
            calls: AtomicUsize::new(0),
        });
        let collector = Arc::new(Collector::new(
            CacheKey::new("bmc-01", MetricGroupType::Any),
            &ExporterConfig::default(),
        ));
        collector
            .bind_client(&PanickingBinder(client.clone()))
            .await
            .unwrap();

        let first = collector.gather().await;
        assert!(matches!(first, Err(ExporterError::Serialization(_))));
        assert!(!collector.is_collecting().await);
        assert_eq!(collector.completed_cycles(), 1);

        // The slot was cleared, so the next gather runs a fresh cycle.
        let second = collector.gather().await;
        assert!(matches!(second, Err(ExporterError::Serialization(_))));
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert_eq!(collector.completed_cycles(), 2);
    }
}
