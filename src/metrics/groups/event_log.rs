//! System event log entries.

use crate::config::CollectConfig;
use crate::metrics::data::{Descriptor, MetricGroupType, MetricKind, Sample};
use crate::metrics::traits::MetricGroup;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct EventLogMetricGroup {
    entry: Arc<Descriptor>,
}

impl EventLogMetricGroup {
    pub fn new(prefix: &str) -> Self {
        Self {
            entry: Descriptor::new(
                prefix,
                "sel",
                "entry",
                "Entry from the system event log",
                MetricKind::Counter,
                &["id", "message", "component", "severity"],
            ),
        }
    }

    /// Entry sample valued with its creation time in unix seconds.
    pub fn new_entry(
        &self,
        id: &str,
        message: &str,
        component: &str,
        severity: &str,
        created: DateTime<Utc>,
    ) -> Sample {
        Sample::new(
            &self.entry,
            created.timestamp() as f64,
            vec![
                id.to_string(),
                message.to_string(),
                component.to_string(),
                severity.to_string(),
            ],
        )
    }
}

impl MetricGroup for EventLogMetricGroup {
    fn group_type(&self) -> MetricGroupType {
        MetricGroupType::EventLog
    }

    fn is_enabled(&self, collect: &CollectConfig) -> bool {
        collect.sel
    }

    fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        vec![&self.entry]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_value_is_creation_time() {
        let group = EventLogMetricGroup::new("idrac");
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let sample = group.new_entry("42", "Fan 3 failed", "Fan", "Critical", created);
        assert_eq!(sample.value(), created.timestamp() as f64);
        assert_eq!(sample.label("component"), Some("Fan"));
        assert_eq!(sample.desc().kind(), MetricKind::Counter);
    }
}
