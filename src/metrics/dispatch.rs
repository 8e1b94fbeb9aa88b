//! Dispatch table binding every metric group to its refresh function.

use crate::config::CollectConfig;
use crate::error::{ExporterError, Result};
use crate::metrics::data::{Descriptor, MetricGroupType, SampleSink};
use crate::metrics::groups::{
    EventLogMetricGroup, MemoryMetricGroup, PowerMetricGroup, SensorsMetricGroup,
    StorageMetricGroup, SystemMetricGroup,
};
use crate::metrics::traits::{MetricGroup, RemoteClient};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fetch-and-emit function for one concrete group type.
pub type RefreshFn<G> =
    for<'a> fn(&'a dyn RemoteClient, &'a G, &'a mut SampleSink) -> BoxFuture<'a, Result<()>>;

/// A group paired with the client call that refreshes it.
pub struct MetricGroupRefresher<G> {
    group: G,
    refresh: RefreshFn<G>,
}

impl<G: MetricGroup + 'static> MetricGroupRefresher<G> {
    pub fn new(group: G, refresh: RefreshFn<G>) -> Self {
        Self { group, refresh }
    }

    pub fn boxed(group: G, refresh: RefreshFn<G>) -> Box<dyn GroupRefresh> {
        Box::new(Self::new(group, refresh))
    }
}

/// Type-erased entry of the dispatch table.
pub trait GroupRefresh: Send + Sync {
    fn group(&self) -> &dyn MetricGroup;

    fn refresh<'a>(
        &'a self,
        client: &'a dyn RemoteClient,
        sink: &'a mut SampleSink,
    ) -> BoxFuture<'a, Result<()>>;
}

impl<G: MetricGroup + 'static> GroupRefresh for MetricGroupRefresher<G> {
    fn group(&self) -> &dyn MetricGroup {
        &self.group
    }

    fn refresh<'a>(
        &'a self,
        client: &'a dyn RemoteClient,
        sink: &'a mut SampleSink,
    ) -> BoxFuture<'a, Result<()>> {
        (self.refresh)(client, &self.group, sink)
    }
}

/// What the dispatcher does with one group for a given selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchAction {
    Run,
    Skip,
    /// The selector names this group but it is disabled.
    Reject,
}

/// Decide whether a group runs for `selector`.
pub fn dispatch_action(
    selector: MetricGroupType,
    group: MetricGroupType,
    enabled: bool,
) -> DispatchAction {
    match selector {
        MetricGroupType::Any if enabled => DispatchAction::Run,
        MetricGroupType::Any => DispatchAction::Skip,
        selected if selected == group && enabled => DispatchAction::Run,
        selected if selected == group => DispatchAction::Reject,
        _ => DispatchAction::Skip,
    }
}

fn refresh_system<'a>(
    client: &'a dyn RemoteClient,
    group: &'a SystemMetricGroup,
    sink: &'a mut SampleSink,
) -> BoxFuture<'a, Result<()>> {
    client.refresh_system(group, sink)
}

fn refresh_sensors<'a>(
    client: &'a dyn RemoteClient,
    group: &'a SensorsMetricGroup,
    sink: &'a mut SampleSink,
) -> BoxFuture<'a, Result<()>> {
    client.refresh_sensors(group, sink)
}

fn refresh_power<'a>(
    client: &'a dyn RemoteClient,
    group: &'a PowerMetricGroup,
    sink: &'a mut SampleSink,
) -> BoxFuture<'a, Result<()>> {
    client.refresh_power(group, sink)
}

fn refresh_event_log<'a>(
    client: &'a dyn RemoteClient,
    group: &'a EventLogMetricGroup,
    sink: &'a mut SampleSink,
) -> BoxFuture<'a, Result<()>> {
    client.refresh_event_log(group, sink)
}

fn refresh_storage<'a>(
    client: &'a dyn RemoteClient,
    group: &'a StorageMetricGroup,
    sink: &'a mut SampleSink,
) -> BoxFuture<'a, Result<()>> {
    client.refresh_storage(group, sink)
}

fn refresh_memory<'a>(
    client: &'a dyn RemoteClient,
    group: &'a MemoryMetricGroup,
    sink: &'a mut SampleSink,
) -> BoxFuture<'a, Result<()>> {
    client.refresh_memory(group, sink)
}

/// Ordered list of refreshers. Adding a domain means adding an entry here.
pub struct RefreshTable {
    entries: Vec<Box<dyn GroupRefresh>>,
}

impl RefreshTable {
    /// The six standard groups in dispatch order.
    pub fn new(prefix: &str) -> Self {
        Self::from_entries(vec![
            MetricGroupRefresher::boxed(SystemMetricGroup::new(prefix), refresh_system),
            MetricGroupRefresher::boxed(SensorsMetricGroup::new(prefix), refresh_sensors),
            MetricGroupRefresher::boxed(PowerMetricGroup::new(prefix), refresh_power),
            MetricGroupRefresher::boxed(EventLogMetricGroup::new(prefix), refresh_event_log),
            MetricGroupRefresher::boxed(StorageMetricGroup::new(prefix), refresh_storage),
            MetricGroupRefresher::boxed(MemoryMetricGroup::new(prefix), refresh_memory),
        ])
    }

    pub fn from_entries(entries: Vec<Box<dyn GroupRefresh>>) -> Self {
        Self { entries }
    }

    pub fn groups(&self) -> impl Iterator<Item = &dyn MetricGroup> + '_ {
        self.entries.iter().map(|entry| entry.group())
    }

    pub fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        self.groups().flat_map(|group| group.descriptors()).collect()
    }

    /// Run every entry allowed by `selector`, returning how many failed.
    ///
    /// Failures never stop the remaining groups; samples pushed before a
    /// failure stay in the sink.
    pub async fn run(
        &self,
        client: &dyn RemoteClient,
        selector: MetricGroupType,
        collect: &CollectConfig,
        target: &str,
        sink: &mut SampleSink,
    ) -> u64 {
        let mut errors = 0;

        for entry in &self.entries {
            let group = entry.group();
            let group_type = group.group_type();

            match dispatch_action(selector, group_type, group.is_enabled(collect)) {
                DispatchAction::Skip => continue,
                DispatchAction::Reject => {
                    let err = ExporterError::GroupDisabled(group_type.to_string());
                    warn!("Scrape of host {} failed: {}", target, err);
                    errors += 1;
                }
                DispatchAction::Run => {
                    debug!("Refreshing metric group {} for host {}", group_type, target);
                    if let Err(err) = entry.refresh(client, sink).await {
                        warn!(
                            "Failed to refresh metric group {} for host {}: {}",
                            group_type, target, err
                        );
                        errors += 1;
                    }
                }
            }
        }

        errors
    }
}
