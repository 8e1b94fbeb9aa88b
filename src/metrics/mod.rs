//! Metric collection: group plugins, dispatch, collectors and their cache.
//!
//! A scrape resolves a [`Collector`] from the [`CollectorRegistry`], which
//! runs the [`RefreshTable`] against the client bound to its target and
//! renders the resulting samples as text.

pub mod collector;
pub mod data;
pub mod dispatch;
pub mod groups;
pub mod registry;
pub mod render;
pub mod traits;

// Re-export commonly used items
pub use collector::Collector;
pub use data::{health_to_value, CacheKey, Descriptor, MetricGroupType, MetricKind, Sample, SampleSink};
pub use dispatch::RefreshTable;
pub use registry::CollectorRegistry;
pub use traits::{ClientBinder, MetricGroup, RemoteClient};
