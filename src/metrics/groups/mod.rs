//! Metric-group plugins, one per hardware domain.

pub mod event_log;
pub mod memory;
pub mod power;
pub mod sensors;
pub mod storage;
pub mod system;

pub use event_log::EventLogMetricGroup;
pub use memory::{MemoryMetricGroup, MemoryModuleInfo};
pub use power::PowerMetricGroup;
pub use sensors::SensorsMetricGroup;
pub use storage::{DriveInfo, StorageMetricGroup};
pub use system::SystemMetricGroup;
