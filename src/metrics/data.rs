//! Data structures shared by metric groups, the collector and the renderer.

use crate::error::{ExporterError, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which metric groups a scrape asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricGroupType {
    /// Every enabled group
    Any,
    System,
    Sensors,
    Power,
    /// System event log
    EventLog,
    Storage,
    Memory,
}

impl MetricGroupType {
    /// All concrete groups, in dispatch order.
    pub const GROUPS: [MetricGroupType; 6] = [
        MetricGroupType::System,
        MetricGroupType::Sensors,
        MetricGroupType::Power,
        MetricGroupType::EventLog,
        MetricGroupType::Storage,
        MetricGroupType::Memory,
    ];

    /// Name used in the `metric_group` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricGroupType::Any => "any",
            MetricGroupType::System => "system",
            MetricGroupType::Sensors => "sensors",
            MetricGroupType::Power => "power",
            MetricGroupType::EventLog => "sel",
            MetricGroupType::Storage => "storage",
            MetricGroupType::Memory => "memory",
        }
    }
}

impl fmt::Display for MetricGroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricGroupType {
    type Err = ExporterError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "" | "any" => Ok(MetricGroupType::Any),
            "system" => Ok(MetricGroupType::System),
            "sensors" => Ok(MetricGroupType::Sensors),
            "power" => Ok(MetricGroupType::Power),
            "sel" => Ok(MetricGroupType::EventLog),
            "storage" => Ok(MetricGroupType::Storage),
            "memory" => Ok(MetricGroupType::Memory),
            other => Err(ExporterError::parameter_error(format!(
                "Unrecognized value for query parameter 'metric_group': '{}'",
                other
            ))),
        }
    }
}

/// Registry lookup key: one collector per target and group selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub target: String,
    pub group: MetricGroupType,
}

impl CacheKey {
    pub fn new(target: impl Into<String>, group: MetricGroupType) -> Self {
        Self {
            target: target.into(),
            group,
        }
    }
}

/// Exposition type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
    Untyped,
}

/// Static metadata describing a family of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    fq_name: String,
    help: &'static str,
    kind: MetricKind,
    label_names: Vec<&'static str>,
    const_labels: Vec<(String, String)>,
}

impl Descriptor {
    pub fn new(
        prefix: &str,
        subsystem: &str,
        name: &str,
        help: &'static str,
        kind: MetricKind,
        label_names: &[&'static str],
    ) -> Arc<Self> {
        Arc::new(Self {
            fq_name: build_fq_name(prefix, subsystem, name),
            help,
            kind,
            label_names: label_names.to_vec(),
            const_labels: Vec::new(),
        })
    }

    /// Same as [`Descriptor::new`] with labels fixed for every sample.
    pub fn with_const_labels(
        prefix: &str,
        subsystem: &str,
        name: &str,
        help: &'static str,
        kind: MetricKind,
        const_labels: Vec<(String, String)>,
    ) -> Arc<Self> {
        Arc::new(Self {
            fq_name: build_fq_name(prefix, subsystem, name),
            help,
            kind,
            label_names: Vec::new(),
            const_labels,
        })
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn label_names(&self) -> &[&'static str] {
        &self.label_names
    }

    pub fn const_labels(&self) -> &[(String, String)] {
        &self.const_labels
    }
}

/// One emitted measurement.
#[derive(Debug, Clone)]
pub struct Sample {
    desc: Arc<Descriptor>,
    value: f64,
    label_values: Vec<String>,
}

impl Sample {
    pub fn new(desc: &Arc<Descriptor>, value: f64, label_values: Vec<String>) -> Self {
        debug_assert_eq!(
            desc.label_names.len(),
            label_values.len(),
            "label cardinality mismatch for {}",
            desc.fq_name
        );
        Self {
            desc: Arc::clone(desc),
            value,
            label_values,
        }
    }

    pub fn desc(&self) -> &Arc<Descriptor> {
        &self.desc
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Value of a named label, if the descriptor carries it.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .label_names
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }
}

/// Output channel refresh functions write their samples into.
#[derive(Debug, Default)]
pub struct SampleSink {
    samples: Vec<Sample>,
}

impl SampleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Map a Redfish health string to an ordinal severity.
pub fn health_to_value(health: &str) -> f64 {
    match health {
        "OK" => 0.0,
        "Warning" => 1.0,
        "Critical" => 2.0,
        _ => 10.0,
    }
}

/// Join non-empty name parts with underscores.
pub fn build_fq_name(prefix: &str, subsystem: &str, name: &str) -> String {
    [prefix, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_group_parsing() {
        assert_eq!("".parse::<MetricGroupType>().unwrap(), MetricGroupType::Any);
        assert_eq!("any".parse::<MetricGroupType>().unwrap(), MetricGroupType::Any);
        for group in MetricGroupType::GROUPS {
            assert_eq!(group.as_str().parse::<MetricGroupType>().unwrap(), group);
        }
        assert!("sel".parse::<MetricGroupType>().is_ok());
        assert!("SEL".parse::<MetricGroupType>().is_err());
        assert!("fans".parse::<MetricGroupType>().is_err());
    }

    #[test]
    fn test_health_mapping() {
        assert_eq!(health_to_value("OK"), 0.0);
        assert_eq!(health_to_value("Warning"), 1.0);
        assert_eq!(health_to_value("Critical"), 2.0);
        assert_eq!(health_to_value(""), 10.0);
        assert_eq!(health_to_value("ok"), 10.0);
    }

    #[test]
    fn test_build_fq_name() {
        assert_eq!(build_fq_name("idrac", "system", "health"), "idrac_system_health");
        assert_eq!(build_fq_name("", "system", "health"), "system_health");
        assert_eq!(build_fq_name("idrac", "", "up"), "idrac_up");
    }

    #[test]
    fn test_sample_label_lookup() {
        let desc = Descriptor::new(
            "idrac",
            "drive",
            "health",
            "Health status for disk drives",
            MetricKind::Gauge,
            &["id", "status"],
        );
        let sample = Sample::new(&desc, 1.0, vec!["Disk.0".to_string(), "Warning".to_string()]);
        assert_eq!(sample.label("status"), Some("Warning"));
        assert_eq!(sample.label("serial"), None);
        assert_eq!(sample.desc().fq_name(), "idrac_drive_health");
    }
}
