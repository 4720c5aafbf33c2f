//! Microgrid telemetry simulator: synthetic readings, threshold alerts,
//! advisory predictions, and daily analytics.

pub mod config;
pub mod devices;
/// CSV export.
pub mod io;
pub mod logging;
/// Wall-clock timer driving an engine.
pub mod service;
/// Reading generation, detection, advisories, and the event bus.
pub mod sim;
