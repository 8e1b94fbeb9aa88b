//! Traits at the seams between metric groups, the collector and the
//! remote-device client.

use crate::config::CollectConfig;
use crate::error::Result;
use crate::metrics::data::{Descriptor, MetricGroupType, SampleSink};
use crate::metrics::groups::{
    EventLogMetricGroup, MemoryMetricGroup, PowerMetricGroup, SensorsMetricGroup,
    StorageMetricGroup, SystemMetricGroup,
};
use async_trait::async_trait;
use std::sync::Arc;

/// A domain of related measurements exported by the collector.
///
/// Implementations are immutable after construction: the descriptor names are
/// fixed by the namespace prefix given to the constructor.
pub trait MetricGroup: Send + Sync {
    /// The group this plugin implements.
    fn group_type(&self) -> MetricGroupType;

    /// Whether the configuration enables this group.
    fn is_enabled(&self, collect: &CollectConfig) -> bool;

    /// Every descriptor this group can emit samples for.
    fn descriptors(&self) -> Vec<&Arc<Descriptor>>;
}

/// Client bound to one management controller.
///
/// Each refresh performs the network calls for its domain, decodes the
/// response and pushes samples built by the group into the sink.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn refresh_system(&self, group: &SystemMetricGroup, sink: &mut SampleSink)
        -> Result<()>;

    async fn refresh_sensors(
        &self,
        group: &SensorsMetricGroup,
        sink: &mut SampleSink,
    ) -> Result<()>;

    async fn refresh_power(&self, group: &PowerMetricGroup, sink: &mut SampleSink) -> Result<()>;

    async fn refresh_event_log(
        &self,
        group: &EventLogMetricGroup,
        sink: &mut SampleSink,
    ) -> Result<()>;

    async fn refresh_storage(
        &self,
        group: &StorageMetricGroup,
        sink: &mut SampleSink,
    ) -> Result<()>;

    async fn refresh_memory(&self, group: &MemoryMetricGroup, sink: &mut SampleSink)
        -> Result<()>;
}

/// Creates clients for targets. Binding may perform network setup.
#[async_trait]
pub trait ClientBinder: Send + Sync {
    async fn bind(&self, target: &str) -> Result<Arc<dyn RemoteClient>>;
}
