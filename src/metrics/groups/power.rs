//! Power supplies and power control readings.

use crate::config::CollectConfig;
use crate::metrics::data::{Descriptor, MetricGroupType, MetricKind, Sample};
use crate::metrics::traits::MetricGroup;
use std::sync::Arc;

pub struct PowerMetricGroup {
    supply_output_watts: Arc<Descriptor>,
    supply_input_watts: Arc<Descriptor>,
    supply_capacity_watts: Arc<Descriptor>,
    supply_input_voltage: Arc<Descriptor>,
    supply_efficiency_percent: Arc<Descriptor>,
    control_consumed_watts: Arc<Descriptor>,
    control_capacity_watts: Arc<Descriptor>,
    control_min_consumed_watts: Arc<Descriptor>,
    control_max_consumed_watts: Arc<Descriptor>,
    control_avg_consumed_watts: Arc<Descriptor>,
    control_interval: Arc<Descriptor>,
}

fn supply(prefix: &str, name: &str, help: &'static str) -> Arc<Descriptor> {
    Descriptor::new(prefix, "power_supply", name, help, MetricKind::Gauge, &["id"])
}

fn control(prefix: &str, name: &str, help: &'static str) -> Arc<Descriptor> {
    Descriptor::new(prefix, "power_control", name, help, MetricKind::Gauge, &["id", "name"])
}

impl PowerMetricGroup {
    pub fn new(prefix: &str) -> Self {
        Self {
            supply_output_watts: supply(prefix, "output_watts", "Power supply output in watts"),
            supply_input_watts: supply(prefix, "input_watts", "Power supply input in watts"),
            supply_capacity_watts: supply(
                prefix,
                "capacity_watts",
                "Power supply capacity in watts",
            ),
            supply_input_voltage: supply(prefix, "input_voltage", "Power supply input voltage"),
            supply_efficiency_percent: supply(
                prefix,
                "efficiency_percent",
                "Power supply efficiency in percentage",
            ),
            control_consumed_watts: control(
                prefix,
                "consumed_watts",
                "Consumption of power control system in watts",
            ),
            control_capacity_watts: control(
                prefix,
                "capacity_watts",
                "Capacity of power control system in watts",
            ),
            control_min_consumed_watts: control(
                prefix,
                "min_consumed_watts",
                "Minimum consumption of power control system during the reported interval",
            ),
            control_max_consumed_watts: control(
                prefix,
                "max_consumed_watts",
                "Maximum consumption of power control system during the reported interval",
            ),
            control_avg_consumed_watts: control(
                prefix,
                "avg_consumed_watts",
                "Average consumption of power control system during the reported interval",
            ),
            control_interval: control(
                prefix,
                "interval_in_minutes",
                "Interval for measurements of power control system",
            ),
        }
    }

    pub fn new_supply_output_watts(&self, value: f64, id: &str) -> Sample {
        Sample::new(&self.supply_output_watts, value, vec![id.to_string()])
    }

    pub fn new_supply_input_watts(&self, value: f64, id: &str) -> Sample {
        Sample::new(&self.supply_input_watts, value, vec![id.to_string()])
    }

    pub fn new_supply_capacity_watts(&self, value: f64, id: &str) -> Sample {
        Sample::new(&self.supply_capacity_watts, value, vec![id.to_string()])
    }

    pub fn new_supply_input_voltage(&self, value: f64, id: &str) -> Sample {
        Sample::new(&self.supply_input_voltage, value, vec![id.to_string()])
    }

    pub fn new_supply_efficiency_percent(&self, value: f64, id: &str) -> Sample {
        Sample::new(&self.supply_efficiency_percent, value, vec![id.to_string()])
    }

    pub fn new_control_consumed_watts(&self, value: f64, id: &str, name: &str) -> Sample {
        Sample::new(&self.control_consumed_watts, value, id_name(id, name))
    }

    pub fn new_control_capacity_watts(&self, value: f64, id: &str, name: &str) -> Sample {
        Sample::new(&self.control_capacity_watts, value, id_name(id, name))
    }

    pub fn new_control_min_consumed_watts(&self, value: f64, id: &str, name: &str) -> Sample {
        Sample::new(&self.control_min_consumed_watts, value, id_name(id, name))
    }

    pub fn new_control_max_consumed_watts(&self, value: f64, id: &str, name: &str) -> Sample {
        Sample::new(&self.control_max_consumed_watts, value, id_name(id, name))
    }

    pub fn new_control_avg_consumed_watts(&self, value: f64, id: &str, name: &str) -> Sample {
        Sample::new(&self.control_avg_consumed_watts, value, id_name(id, name))
    }

    pub fn new_control_interval(&self, minutes: u32, id: &str, name: &str) -> Sample {
        Sample::new(&self.control_interval, f64::from(minutes), id_name(id, name))
    }
}

fn id_name(id: &str, name: &str) -> Vec<String> {
    vec![id.to_string(), name.to_string()]
}

impl MetricGroup for PowerMetricGroup {
    fn group_type(&self) -> MetricGroupType {
        MetricGroupType::Power
    }

    fn is_enabled(&self, collect: &CollectConfig) -> bool {
        collect.power
    }

    fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        vec![
            &self.supply_output_watts,
            &self.supply_input_watts,
            &self.supply_capacity_watts,
            &self.supply_input_voltage,
            &self.supply_efficiency_percent,
            &self.control_consumed_watts,
            &self.control_capacity_watts,
            &self.control_min_consumed_watts,
            &self.control_max_consumed_watts,
            &self.control_avg_consumed_watts,
            &self.control_interval,
        ]
    }
}
