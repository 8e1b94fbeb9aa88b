//! Redfish implementation of the remote client seam.
//!
//! [`RedfishBinder`] connects to a controller over HTTPS and discovers its
//! system, chassis and manager resources; the resulting [`RedfishClient`]
//! refreshes each metric group from the matching Redfish endpoint.

pub mod client;
pub mod models;

pub use client::{RedfishBinder, RedfishClient};
