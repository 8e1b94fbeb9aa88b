//! Redfish resources decoded from controller responses, and how each one
//! maps onto its metric group.
//!
//! Only the fields the exporter publishes are modelled. Controllers report
//! `null` for many of them, so every field tolerates both absence and null.

use crate::metrics::data::SampleSink;
use crate::metrics::groups::{
    DriveInfo, EventLogMetricGroup, MemoryMetricGroup, MemoryModuleInfo, PowerMetricGroup,
    SensorsMetricGroup, StorageMetricGroup, SystemMetricGroup,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::debug;

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reference to another resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Link {
    #[serde(rename = "@odata.id", default)]
    pub odata_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Collection {
    #[serde(deserialize_with = "nullable")]
    pub members: Vec<Link>,
}

impl Collection {
    pub fn first_member(&self) -> Option<&str> {
        self.members
            .first()
            .map(|link| link.odata_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Status {
    #[serde(deserialize_with = "nullable")]
    pub health: String,
    #[serde(deserialize_with = "nullable")]
    pub state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MemorySummary {
    #[serde(rename = "TotalSystemMemoryGiB", deserialize_with = "nullable")]
    pub total_system_memory_gib: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProcessorSummary {
    #[serde(deserialize_with = "nullable")]
    pub count: u32,
    #[serde(deserialize_with = "nullable")]
    pub model: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ComputerSystem {
    #[serde(deserialize_with = "nullable")]
    pub power_state: String,
    #[serde(deserialize_with = "nullable")]
    pub status: Status,
    #[serde(rename = "IndicatorLED", deserialize_with = "nullable")]
    pub indicator_led: String,
    #[serde(deserialize_with = "nullable")]
    pub memory_summary: MemorySummary,
    #[serde(deserialize_with = "nullable")]
    pub processor_summary: ProcessorSummary,
    #[serde(deserialize_with = "nullable")]
    pub bios_version: String,
    #[serde(deserialize_with = "nullable")]
    pub manufacturer: String,
    #[serde(deserialize_with = "nullable")]
    pub model: String,
    #[serde(deserialize_with = "nullable")]
    pub serial_number: String,
    #[serde(rename = "SKU", deserialize_with = "nullable")]
    pub sku: String,
}

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

impl ComputerSystem {
    pub fn emit(&self, group: &SystemMetricGroup, sink: &mut SampleSink) {
        sink.push(group.new_power_on(&self.power_state));
        sink.push(group.new_health(&self.status.health));
        if !self.indicator_led.is_empty() {
            sink.push(group.new_indicator_led(&self.indicator_led));
        }
        sink.push(group.new_memory_size(self.memory_summary.total_system_memory_gib * GIB));
        sink.push(group.new_cpu_count(
            self.processor_summary.count,
            &self.processor_summary.model,
        ));
        sink.push(group.new_bios_info(&self.bios_version));
        sink.push(group.new_machine_info(
            &self.manufacturer,
            &self.model,
            &self.serial_number,
            &self.sku,
        ));
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Temperature {
    #[serde(deserialize_with = "nullable")]
    pub member_id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub reading_celsius: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Fan {
    #[serde(deserialize_with = "nullable")]
    pub member_id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Older firmware names fans here instead of `Name`
    #[serde(deserialize_with = "nullable")]
    pub fan_name: String,
    pub reading: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub reading_units: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Thermal {
    #[serde(deserialize_with = "nullable")]
    pub temperatures: Vec<Temperature>,
    #[serde(deserialize_with = "nullable")]
    pub fans: Vec<Fan>,
}

impl Thermal {
    /// Sensors without a reading are left out.
    pub fn emit(&self, group: &SensorsMetricGroup, sink: &mut SampleSink) {
        for sensor in &self.temperatures {
            if let Some(value) = sensor.reading_celsius {
                sink.push(group.new_temperature(value, &sensor.member_id, &sensor.name, "celsius"));
            }
        }
        for fan in &self.fans {
            let Some(value) = fan.reading else { continue };
            let name = if fan.name.is_empty() { &fan.fan_name } else { &fan.name };
            let units = fan.reading_units.to_lowercase();
            sink.push(group.new_fan_speed(value, &fan.member_id, name, &units));
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PowerSupply {
    #[serde(deserialize_with = "nullable")]
    pub member_id: String,
    pub power_output_watts: Option<f64>,
    pub power_input_watts: Option<f64>,
    pub power_capacity_watts: Option<f64>,
    pub line_input_voltage: Option<f64>,
    pub efficiency_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PowerMetrics {
    pub min_consumed_watts: Option<f64>,
    pub max_consumed_watts: Option<f64>,
    pub average_consumed_watts: Option<f64>,
    pub interval_in_min: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PowerControl {
    #[serde(deserialize_with = "nullable")]
    pub member_id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub power_consumed_watts: Option<f64>,
    pub power_capacity_watts: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub power_metrics: PowerMetrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Power {
    #[serde(deserialize_with = "nullable")]
    pub power_supplies: Vec<PowerSupply>,
    #[serde(deserialize_with = "nullable")]
    pub power_control: Vec<PowerControl>,
}

impl Power {
    pub fn emit(&self, group: &PowerMetricGroup, sink: &mut SampleSink) {
        for psu in &self.power_supplies {
            let id = psu.member_id.as_str();
            if let Some(v) = psu.power_output_watts {
                sink.push(group.new_supply_output_watts(v, id));
            }
            if let Some(v) = psu.power_input_watts {
                sink.push(group.new_supply_input_watts(v, id));
            }
            if let Some(v) = psu.power_capacity_watts {
                sink.push(group.new_supply_capacity_watts(v, id));
            }
            if let Some(v) = psu.line_input_voltage {
                sink.push(group.new_supply_input_voltage(v, id));
            }
            if let Some(v) = psu.efficiency_percent {
                sink.push(group.new_supply_efficiency_percent(v, id));
            }
        }

        for control in &self.power_control {
            let (id, name) = (control.member_id.as_str(), control.name.as_str());
            let metrics = &control.power_metrics;
            if let Some(v) = control.power_consumed_watts {
                sink.push(group.new_control_consumed_watts(v, id, name));
            }
            if let Some(v) = control.power_capacity_watts {
                sink.push(group.new_control_capacity_watts(v, id, name));
            }
            if let Some(v) = metrics.min_consumed_watts {
                sink.push(group.new_control_min_consumed_watts(v, id, name));
            }
            if let Some(v) = metrics.max_consumed_watts {
                sink.push(group.new_control_max_consumed_watts(v, id, name));
            }
            if let Some(v) = metrics.average_consumed_watts {
                sink.push(group.new_control_avg_consumed_watts(v, id, name));
            }
            if let Some(v) = metrics.interval_in_min {
                sink.push(group.new_control_interval(v, id, name));
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LogEntry {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    #[serde(deserialize_with = "nullable")]
    pub sensor_type: String,
    #[serde(deserialize_with = "nullable")]
    pub severity: String,
    #[serde(deserialize_with = "nullable")]
    pub created: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LogEntries {
    #[serde(deserialize_with = "nullable")]
    pub members: Vec<LogEntry>,
}

impl LogEntries {
    /// Entries with an unparseable creation time are dropped.
    pub fn emit(&self, group: &EventLogMetricGroup, sink: &mut SampleSink) {
        for entry in &self.members {
            let created = match DateTime::parse_from_rfc3339(&entry.created) {
                Ok(created) => created.with_timezone(&Utc),
                Err(e) => {
                    debug!("Skipping event log entry {}: bad timestamp: {}", entry.id, e);
                    continue;
                }
            };
            sink.push(group.new_entry(
                &entry.id,
                entry.message.trim(),
                &entry.sensor_type,
                &entry.severity,
                created,
            ));
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StorageController {
    #[serde(deserialize_with = "nullable")]
    pub drives: Vec<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PartLocation {
    pub location_ordinal_value: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PhysicalLocation {
    #[serde(deserialize_with = "nullable")]
    pub part_location: PartLocation,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Drive {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub manufacturer: String,
    #[serde(deserialize_with = "nullable")]
    pub model: String,
    #[serde(deserialize_with = "nullable")]
    pub serial_number: String,
    #[serde(deserialize_with = "nullable")]
    pub media_type: String,
    #[serde(deserialize_with = "nullable")]
    pub protocol: String,
    pub capacity_bytes: Option<u64>,
    #[serde(deserialize_with = "nullable")]
    pub status: Status,
    #[serde(deserialize_with = "nullable")]
    pub physical_location: PhysicalLocation,
}

impl Drive {
    pub fn emit(&self, group: &StorageMetricGroup, sink: &mut SampleSink) {
        sink.push(group.new_drive_info(&DriveInfo {
            id: &self.id,
            name: &self.name,
            manufacturer: &self.manufacturer,
            model: &self.model,
            serial: &self.serial_number,
            media_type: &self.media_type,
            protocol: &self.protocol,
            slot: self.physical_location.part_location.location_ordinal_value,
        }));
        sink.push(group.new_drive_health(&self.id, &self.status.health));
        if let Some(bytes) = self.capacity_bytes {
            sink.push(group.new_drive_capacity(&self.id, bytes));
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MemoryModule {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub manufacturer: String,
    #[serde(deserialize_with = "nullable")]
    pub memory_device_type: String,
    #[serde(deserialize_with = "nullable")]
    pub serial_number: String,
    #[serde(deserialize_with = "nullable")]
    pub error_correction: String,
    #[serde(deserialize_with = "nullable")]
    pub rank_count: u32,
    #[serde(rename = "CapacityMiB")]
    pub capacity_mib: Option<u64>,
    pub operating_speed_mhz: Option<u32>,
    #[serde(deserialize_with = "nullable")]
    pub status: Status,
}

impl MemoryModule {
    pub fn is_absent(&self) -> bool {
        self.status.state == "Absent"
    }

    pub fn emit(&self, group: &MemoryMetricGroup, sink: &mut SampleSink) {
        sink.push(group.new_module_info(&MemoryModuleInfo {
            id: &self.id,
            name: &self.name,
            manufacturer: &self.manufacturer,
            memory_type: &self.memory_device_type,
            serial: &self.serial_number,
            ecc: &self.error_correction,
            rank: self.rank_count,
        }));
        sink.push(group.new_module_health(&self.id, &self.status.health));
        if let Some(mib) = self.capacity_mib {
            sink.push(group.new_module_capacity(&self.id, mib.saturating_mul(1024 * 1024)));
        }
        if let Some(mhz) = self.operating_speed_mhz {
            sink.push(group.new_module_speed(&self.id, mhz));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_tolerates_nulls() {
        let system: ComputerSystem = serde_json::from_value(json!({
            "PowerState": "On",
            "Status": {"Health": null, "State": "Enabled"},
            "IndicatorLED": null,
            "MemorySummary": {"TotalSystemMemoryGiB": 64},
            "ProcessorSummary": {"Count": 2, "Model": "Intel(R) Xeon(R) Silver 4114 "},
            "BiosVersion": "2.12.2",
            "SKU": null
        }))
        .unwrap();

        let group = SystemMetricGroup::new("idrac");
        let mut sink = SampleSink::new();
        system.emit(&group, &mut sink);

        let samples = sink.samples();
        // No LED sample when the controller does not report one.
        assert_eq!(samples.len(), 6);
        assert_eq!(samples[1].value(), 10.0);
        assert_eq!(samples[2].value(), 64.0 * GIB);
        assert_eq!(samples[3].label("model"), Some("Intel(R) Xeon(R) Silver 4114"));
    }

    #[test]
    fn test_thermal_skips_missing_readings() {
        let thermal: Thermal = serde_json::from_value(json!({
            "Temperatures": [
                {"MemberId": "iDRAC.Embedded.1#SystemBoardInletTemp", "Name": "System Board Inlet Temp", "ReadingCelsius": 22},
                {"MemberId": "iDRAC.Embedded.1#CPU2Temp", "Name": "CPU2 Temp", "ReadingCelsius": null}
            ],
            "Fans": [
                {"MemberId": "0x17||Fan.Embedded.1A", "FanName": "System Board Fan1A", "Reading": 4800, "ReadingUnits": "RPM"}
            ]
        }))
        .unwrap();

        let group = SensorsMetricGroup::new("idrac");
        let mut sink = SampleSink::new();
        thermal.emit(&group, &mut sink);

        assert_eq!(sink.len(), 2);
        let fan = &sink.samples()[1];
        assert_eq!(fan.label("name"), Some("System Board Fan1A"));
        assert_eq!(fan.label("units"), Some("rpm"));
        assert_eq!(fan.value(), 4800.0);
    }

    #[test]
    fn test_power_emits_present_fields_only() {
        let power: Power = serde_json::from_value(json!({
            "PowerSupplies": [
                {"MemberId": "PSU.Slot.1", "PowerInputWatts": 230, "LineInputVoltage": 232, "PowerOutputWatts": null}
            ],
            "PowerControl": [
                {"MemberId": "PowerControl", "Name": "System Power Control", "PowerConsumedWatts": 210,
                 "PowerMetrics": {"IntervalInMin": 1, "AverageConsumedWatts": 205}}
            ]
        }))
        .unwrap();

        let group = PowerMetricGroup::new("idrac");
        let mut sink = SampleSink::new();
        power.emit(&group, &mut sink);

        let names: Vec<&str> = sink.samples().iter().map(|s| s.desc().fq_name()).collect();
        assert_eq!(
            names,
            vec![
                "idrac_power_supply_input_watts",
                "idrac_power_supply_input_voltage",
                "idrac_power_control_consumed_watts",
                "idrac_power_control_avg_consumed_watts",
                "idrac_power_control_interval_in_minutes",
            ]
        );
    }

    #[test]
    fn test_event_log_drops_bad_timestamps() {
        let entries: LogEntries = serde_json::from_value(json!({
            "Members": [
                {"Id": "1", "Message": "The process of installing an operating system is completed. ", "SensorType": "OS Boot", "Severity": "OK", "Created": "2024-02-11T09:15:02-06:00"},
                {"Id": "2", "Message": "Broken", "Severity": "Warning", "Created": "yesterday"}
            ]
        }))
        .unwrap();

        let group = EventLogMetricGroup::new("idrac");
        let mut sink = SampleSink::new();
        entries.emit(&group, &mut sink);

        assert_eq!(sink.len(), 1);
        let entry = &sink.samples()[0];
        assert_eq!(
            entry.label("message"),
            Some("The process of installing an operating system is completed.")
        );
        assert_eq!(entry.value(), 1_707_664_502.0);
    }

    #[test]
    fn test_huge_module_capacity_saturates() {
        let module: MemoryModule = serde_json::from_value(json!({
            "Id": "DIMM.Socket.B2",
            "CapacityMiB": 18446744073709551u64
        }))
        .unwrap();
        let memory = MemoryMetricGroup::new("idrac");
        let mut sink = SampleSink::new();
        module.emit(&memory, &mut sink);
        assert_eq!(sink.samples()[2].value(), u64::MAX as f64);
    }

    #[test]
    fn test_drive_and_memory_mapping() {
        let drive: Drive = serde_json::from_value(json!({
            "Id": "Disk.Bay.1:Enclosure.Internal.0-1:RAID.Integrated.1-1",
            "Name": "Physical Disk 0:1:1",
            "MediaType": "SSD",
            "Protocol": "SATA",
            "CapacityBytes": 479559942144u64,
            "Status": {"Health": "OK"},
            "PhysicalLocation": {"PartLocation": {"LocationOrdinalValue": 1}}
        }))
        .unwrap();
        let storage = StorageMetricGroup::new("idrac");
        let mut sink = SampleSink::new();
        drive.emit(&storage, &mut sink);
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.samples()[0].label("slot"), Some("1"));
        assert_eq!(sink.samples()[1].value(), 0.0);

        let module: MemoryModule = serde_json::from_value(json!({
            "Id": "DIMM.Socket.A1",
            "MemoryDeviceType": "DDR4",
            "RankCount": 2,
            "CapacityMiB": 16384,
            "OperatingSpeedMhz": 2666,
            "Status": {"Health": "Warning", "State": "Enabled"}
        }))
        .unwrap();
        let memory = MemoryMetricGroup::new("idrac");
        let mut sink = SampleSink::new();
        module.emit(&memory, &mut sink);
        assert!(!module.is_absent());
        assert_eq!(sink.len(), 4);
        assert_eq!(sink.samples()[1].value(), 1.0);
        assert_eq!(sink.samples()[2].value(), 16384.0 * 1024.0 * 1024.0);
    }
}
