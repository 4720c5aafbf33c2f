//! Device simulation components for microgrid telemetry.

/// Battery bank state-of-charge integrator.
pub mod battery;
/// Community demand profile generator.
pub mod load;
/// Solar array generation model.
pub mod solar;
pub mod types;
/// Wind turbine generation model.
pub mod wind;

// Re-export the main types for convenience
pub use battery::BatteryPack;
pub use load::Load;
pub use solar::SolarArray;
pub use types::Device;
pub use types::DeviceContext;
pub use wind::WindTurbine;
