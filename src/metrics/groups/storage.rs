//! Physical drives.

use crate::config::CollectConfig;
use crate::metrics::data::{health_to_value, Descriptor, MetricGroupType, MetricKind, Sample};
use crate::metrics::traits::MetricGroup;
use std::sync::Arc;

/// Inventory fields of one drive.
#[derive(Debug, Clone, Default)]
pub struct DriveInfo<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub manufacturer: &'a str,
    pub model: &'a str,
    pub serial: &'a str,
    pub media_type: &'a str,
    pub protocol: &'a str,
    /// Bay number, when the controller reports one
    pub slot: Option<i64>,
}

pub struct StorageMetricGroup {
    drive_info: Arc<Descriptor>,
    drive_health: Arc<Descriptor>,
    drive_capacity: Arc<Descriptor>,
}

impl StorageMetricGroup {
    pub fn new(prefix: &str) -> Self {
        Self {
            drive_info: Descriptor::new(
                prefix,
                "drive",
                "info",
                "Information about disk drives",
                MetricKind::Untyped,
                &[
                    "id",
                    "manufacturer",
                    "mediatype",
                    "model",
                    "name",
                    "protocol",
                    "serial",
                    "slot",
                ],
            ),
            drive_health: Descriptor::new(
                prefix,
                "drive",
                "health",
                "Health status for disk drives",
                MetricKind::Gauge,
                &["id", "status"],
            ),
            drive_capacity: Descriptor::new(
                prefix,
                "drive",
                "capacity_bytes",
                "Capacity of disk drives in bytes",
                MetricKind::Gauge,
                &["id"],
            ),
        }
    }

    pub fn new_drive_info(&self, drive: &DriveInfo<'_>) -> Sample {
        // Negative slots mean "not reported".
        let slot = match drive.slot {
            Some(slot) if slot >= 0 => slot.to_string(),
            _ => String::new(),
        };
        Sample::new(
            &self.drive_info,
            1.0,
            vec![
                drive.id.to_string(),
                drive.manufacturer.to_string(),
                drive.media_type.to_string(),
                drive.model.to_string(),
                drive.name.to_string(),
                drive.protocol.to_string(),
                drive.serial.to_string(),
                slot,
            ],
        )
    }

    pub fn new_drive_health(&self, id: &str, health: &str) -> Sample {
        Sample::new(
            &self.drive_health,
            health_to_value(health),
            vec![id.to_string(), health.to_string()],
        )
    }

    pub fn new_drive_capacity(&self, id: &str, bytes: u64) -> Sample {
        Sample::new(&self.drive_capacity, bytes as f64, vec![id.to_string()])
    }
}

impl MetricGroup for StorageMetricGroup {
    fn group_type(&self) -> MetricGroupType {
        MetricGroupType::Storage
    }

    fn is_enabled(&self, collect: &CollectConfig) -> bool {
        collect.storage
    }

    fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        vec![&self.drive_info, &self.drive_health, &self.drive_capacity]
    }
}
