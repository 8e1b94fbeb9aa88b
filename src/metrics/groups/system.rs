//! Overall system state: power, health, LED, inventory.

use crate::config::CollectConfig;
use crate::metrics::data::{health_to_value, Descriptor, MetricGroupType, MetricKind, Sample};
use crate::metrics::traits::MetricGroup;
use std::sync::Arc;

pub struct SystemMetricGroup {
    power_on: Arc<Descriptor>,
    health: Arc<Descriptor>,
    indicator_led: Arc<Descriptor>,
    memory_size: Arc<Descriptor>,
    cpu_count: Arc<Descriptor>,
    bios_info: Arc<Descriptor>,
    machine_info: Arc<Descriptor>,
}

impl SystemMetricGroup {
    pub fn new(prefix: &str) -> Self {
        Self {
            power_on: Descriptor::new(
                prefix,
                "system",
                "power_on",
                "Power state of the system",
                MetricKind::Gauge,
                &[],
            ),
            health: Descriptor::new(
                prefix,
                "system",
                "health",
                "Health status of the system",
                MetricKind::Gauge,
                &["status"],
            ),
            indicator_led: Descriptor::new(
                prefix,
                "system",
                "indicator_led_on",
                "Indicator LED state of the system",
                MetricKind::Gauge,
                &["state"],
            ),
            memory_size: Descriptor::new(
                prefix,
                "system",
                "memory_size_bytes",
                "Total memory size of the system in bytes",
                MetricKind::Gauge,
                &[],
            ),
            cpu_count: Descriptor::new(
                prefix,
                "system",
                "cpu_count",
                "Total number of CPUs in the system",
                MetricKind::Gauge,
                &["model"],
            ),
            bios_info: Descriptor::new(
                prefix,
                "system",
                "bios_info",
                "Information about the BIOS",
                MetricKind::Untyped,
                &["version"],
            ),
            machine_info: Descriptor::new(
                prefix,
                "system",
                "machine_info",
                "Information about the machine",
                MetricKind::Untyped,
                &["manufacturer", "model", "serial", "sku"],
            ),
        }
    }

    /// 1 when the power state is exactly `On`.
    pub fn new_power_on(&self, state: &str) -> Sample {
        let value = if state == "On" { 1.0 } else { 0.0 };
        Sample::new(&self.power_on, value, Vec::new())
    }

    pub fn new_health(&self, health: &str) -> Sample {
        Sample::new(&self.health, health_to_value(health), vec![health.to_string()])
    }

    /// 1 for any LED state other than `Off`.
    pub fn new_indicator_led(&self, state: &str) -> Sample {
        let value = if state != "Off" { 1.0 } else { 0.0 };
        Sample::new(&self.indicator_led, value, vec![state.to_string()])
    }

    pub fn new_memory_size(&self, bytes: f64) -> Sample {
        Sample::new(&self.memory_size, bytes, Vec::new())
    }

    pub fn new_cpu_count(&self, cpus: u32, model: &str) -> Sample {
        Sample::new(&self.cpu_count, f64::from(cpus), vec![model.trim().to_string()])
    }

    pub fn new_bios_info(&self, version: &str) -> Sample {
        Sample::new(&self.bios_info, 1.0, vec![version.to_string()])
    }

    pub fn new_machine_info(&self, manufacturer: &str, model: &str, serial: &str, sku: &str) -> Sample {
        Sample::new(
            &self.machine_info,
            1.0,
            vec![
                manufacturer.to_string(),
                model.to_string(),
                serial.to_string(),
                sku.to_string(),
            ],
        )
    }
}

impl MetricGroup for SystemMetricGroup {
    fn group_type(&self) -> MetricGroupType {
        MetricGroupType::System
    }

    fn is_enabled(&self, collect: &CollectConfig) -> bool {
        collect.system
    }

    fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        vec![
            &self.power_on,
            &self.health,
            &self.indicator_led,
            &self.memory_size,
            &self.cpu_count,
            &self.bios_info,
            &self.machine_info,
        ]
    }
}
