//! Thermal sensors and fans.

use crate::config::CollectConfig;
use crate::metrics::data::{Descriptor, MetricGroupType, MetricKind, Sample};
use crate::metrics::traits::MetricGroup;
use std::sync::Arc;

pub struct SensorsMetricGroup {
    temperature: Arc<Descriptor>,
    fan_speed: Arc<Descriptor>,
}

impl SensorsMetricGroup {
    pub fn new(prefix: &str) -> Self {
        Self {
            temperature: Descriptor::new(
                prefix,
                "sensors",
                "temperature",
                "Sensors reporting temperature measurements",
                MetricKind::Gauge,
                &["id", "name", "units"],
            ),
            fan_speed: Descriptor::new(
                prefix,
                "sensors",
                "fan_speed",
                "Sensors reporting fan speed measurements",
                MetricKind::Gauge,
                &["id", "name", "units"],
            ),
        }
    }

    pub fn new_temperature(&self, value: f64, id: &str, name: &str, units: &str) -> Sample {
        Sample::new(&self.temperature, value, labels(id, name, units))
    }

    pub fn new_fan_speed(&self, value: f64, id: &str, name: &str, units: &str) -> Sample {
        Sample::new(&self.fan_speed, value, labels(id, name, units))
    }
}

fn labels(id: &str, name: &str, units: &str) -> Vec<String> {
    vec![id.to_string(), name.to_string(), units.to_string()]
}

impl MetricGroup for SensorsMetricGroup {
    fn group_type(&self) -> MetricGroupType {
        MetricGroupType::Sensors
    }

    fn is_enabled(&self, collect: &CollectConfig) -> bool {
        collect.sensors
    }

    fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        vec![&self.temperature, &self.fan_speed]
    }
}
