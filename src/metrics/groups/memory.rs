//! Memory modules (DIMMs).

use crate::config::CollectConfig;
use crate::metrics::data::{health_to_value, Descriptor, MetricGroupType, MetricKind, Sample};
use crate::metrics::traits::MetricGroup;
use std::sync::Arc;

/// Inventory fields of one memory module.
#[derive(Debug, Clone, Default)]
pub struct MemoryModuleInfo<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub manufacturer: &'a str,
    pub memory_type: &'a str,
    pub serial: &'a str,
    pub ecc: &'a str,
    pub rank: u32,
}

pub struct MemoryMetricGroup {
    module_info: Arc<Descriptor>,
    module_health: Arc<Descriptor>,
    module_capacity: Arc<Descriptor>,
    module_speed: Arc<Descriptor>,
}

impl MemoryMetricGroup {
    pub fn new(prefix: &str) -> Self {
        Self {
            module_info: Descriptor::new(
                prefix,
                "memory_module",
                "info",
                "Information about memory modules",
                MetricKind::Untyped,
                &["id", "ecc", "manufacturer", "type", "name", "serial", "rank"],
            ),
            module_health: Descriptor::new(
                prefix,
                "memory_module",
                "health",
                "Health status for memory modules",
                MetricKind::Gauge,
                &["id", "status"],
            ),
            module_capacity: Descriptor::new(
                prefix,
                "memory_module",
                "capacity_bytes",
                "Capacity of memory modules in bytes",
                MetricKind::Gauge,
                &["id"],
            ),
            module_speed: Descriptor::new(
                prefix,
                "memory_module",
                "speed_mhz",
                "Speed of memory modules in Mhz",
                MetricKind::Gauge,
                &["id"],
            ),
        }
    }

    pub fn new_module_info(&self, module: &MemoryModuleInfo<'_>) -> Sample {
        Sample::new(
            &self.module_info,
            1.0,
            vec![
                module.id.to_string(),
                module.ecc.to_string(),
                module.manufacturer.to_string(),
                module.memory_type.to_string(),
                module.name.to_string(),
                module.serial.to_string(),
                module.rank.to_string(),
            ],
        )
    }

    pub fn new_module_health(&self, id: &str, health: &str) -> Sample {
        Sample::new(
            &self.module_health,
            health_to_value(health),
            vec![id.to_string(), health.to_string()],
        )
    }

    pub fn new_module_capacity(&self, id: &str, bytes: u64) -> Sample {
        Sample::new(&self.module_capacity, bytes as f64, vec![id.to_string()])
    }

    pub fn new_module_speed(&self, id: &str, mhz: u32) -> Sample {
        Sample::new(&self.module_speed, f64::from(mhz), vec![id.to_string()])
    }
}

impl MetricGroup for MemoryMetricGroup {
    fn group_type(&self) -> MetricGroupType {
        MetricGroupType::Memory
    }

    fn is_enabled(&self, collect: &CollectConfig) -> bool {
        collect.memory
    }

    fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        vec![
            &self.module_info,
            &self.module_health,
            &self.module_capacity,
            &self.module_speed,
        ]
    }
}
