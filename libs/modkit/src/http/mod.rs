//! Outgoing HTTP helpers.

pub mod client;
pub mod simple_otel;
