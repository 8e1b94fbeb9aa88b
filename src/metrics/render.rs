//! Text exposition of collected samples.

use crate::error::{ExporterError, Result};
use crate::metrics::data::{Descriptor, MetricKind, Sample};
use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType, Untyped};
use prometheus::{Encoder, TextEncoder};
use std::collections::HashMap;

/// Content type of the rendered text.
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Group samples into families in first-seen order and encode them.
pub fn render(samples: &[Sample]) -> Result<String> {
    let mut families: Vec<MetricFamily> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sample in samples {
        let desc = sample.desc();
        let slot = *index.entry(desc.fq_name()).or_insert_with(|| {
            families.push(new_family(desc));
            families.len() - 1
        });
        families[slot].mut_metric().push(new_metric(sample));
    }

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&families, &mut buffer)
        .map_err(|e| ExporterError::serialization_error(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| ExporterError::serialization_error(e.to_string()))
}

fn new_family(desc: &Descriptor) -> MetricFamily {
    let mut family = MetricFamily::default();
    family.set_name(desc.fq_name().to_string());
    family.set_help(desc.help().to_string());
    family.set_field_type(match desc.kind() {
        MetricKind::Gauge => MetricType::GAUGE,
        MetricKind::Counter => MetricType::COUNTER,
        MetricKind::Untyped => MetricType::UNTYPED,
    });
    family
}

fn new_metric(sample: &Sample) -> Metric {
    let desc = sample.desc();
    let variable = desc
        .label_names()
        .iter()
        .map(|name| name.to_string())
        .zip(sample.label_values().iter().cloned());
    let constant = desc.const_labels().iter().cloned();

    let labels: Vec<LabelPair> = variable
        .chain(constant)
        .map(|(name, value)| {
            let mut pair = LabelPair::default();
            pair.set_name(name);
            pair.set_value(value);
            pair
        })
        .collect();

    let mut metric = Metric::default();
    metric.set_label(labels.into());
    match desc.kind() {
        MetricKind::Gauge => {
            let mut gauge = Gauge::default();
            gauge.set_value(sample.value());
            metric.set_gauge(gauge);
        }
        MetricKind::Counter => {
            let mut counter = Counter::default();
            counter.set_value(sample.value());
            metric.set_counter(counter);
        }
        MetricKind::Untyped => {
            let mut untyped = Untyped::default();
            untyped.set_value(sample.value());
            metric.set_untyped(untyped);
        }
    }
    metric
}
