use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use redfish_exporter::metrics::groups::*;
use redfish_exporter::metrics::render::render;
use redfish_exporter::metrics::{CacheKey, Collector};
use redfish_exporter::{ClientBinder, ExporterConfig, MetricGroupType, RemoteClient, Result, SampleSink};
use std::sync::Arc;

/// Controller answering instantly with a fixed number of sensors.
struct StaticClient {
    sensors: usize,
}

#[async_trait]
impl RemoteClient for StaticClient {
    async fn refresh_system(&self, group: &SystemMetricGroup, sink: &mut SampleSink) -> Result<()> {
        sink.push(group.new_power_on("On"));
        sink.push(group.new_health("OK"));
        sink.push(group.new_cpu_count(2, "Intel(R) Xeon(R) Gold 6130"));
        Ok(())
    }

    async fn refresh_sensors(&self, group: &SensorsMetricGroup, sink: &mut SampleSink) -> Result<()> {
        for i in 0..self.sensors {
            let id = i.to_string();
            sink.push(group.new_temperature(20.0 + i as f64, &id, "Temp", "celsius"));
            sink.push(group.new_fan_speed(4800.0, &id, "Fan", "rpm"));
        }
        Ok(())
    }

    async fn refresh_power(&self, group: &PowerMetricGroup, sink: &mut SampleSink) -> Result<()> {
        sink.push(group.new_control_consumed_watts(212.0, "PowerControl", "System Power Control"));
        Ok(())
    }

    async fn refresh_event_log(&self, _: &EventLogMetricGroup, _: &mut SampleSink) -> Result<()> {
        Ok(())
    }

    async fn refresh_storage(&self, group: &StorageMetricGroup, sink: &mut SampleSink) -> Result<()> {
        for i in 0..self.sensors {
            sink.push(group.new_drive_health(&format!("Disk.Bay.{}", i), "OK"));
        }
        Ok(())
    }

    async fn refresh_memory(&self, group: &MemoryMetricGroup, sink: &mut SampleSink) -> Result<()> {
        sink.push(group.new_module_speed("DIMM.Socket.A1", 2666));
        Ok(())
    }
}

struct StaticBinder(usize);

#[async_trait]
impl ClientBinder for StaticBinder {
    async fn bind(&self, _target: &str) -> Result<Arc<dyn RemoteClient>> {
        Ok(Arc::new(StaticClient { sensors: self.0 }))
    }
}

/// Benchmark a full collection cycle
fn bench_gather(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Should create tokio runtime");
    let config = ExporterConfig::default();
    let mut group = c.benchmark_group("gather");

    for sensors in [4usize, 64] {
        let collector = Arc::new(Collector::new(
            CacheKey::new("bmc-01", MetricGroupType::Any),
            &config,
        ));
        rt.block_on(collector.bind_client(&StaticBinder(sensors)))
            .expect("Should bind client");

        group.bench_with_input(BenchmarkId::from_parameter(sensors), &sensors, |b, _| {
            b.to_async(&rt).iter(|| {
                let collector = collector.clone();
                async move { collector.gather().await.expect("Should gather") }
            })
        });
    }
    group.finish();
}

/// Benchmark text rendering on its own
fn bench_render(c: &mut Criterion) {
    let sensors = SensorsMetricGroup::new("idrac");
    let mut sink = SampleSink::new();
    for i in 0..256 {
        sink.push(sensors.new_temperature(20.0 + i as f64, &i.to_string(), "Temp", "celsius"));
    }

    c.bench_function("render_256_samples", |b| {
        b.iter(|| render(sink.samples()).expect("Should render"))
    });
}

criterion_group!(benches, bench_gather, bench_render);
criterion_main!(benches);
