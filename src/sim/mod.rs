/// Randomized daily energy rollups.
pub mod analytics;
pub mod anomaly;
/// Reading and alert topics.
pub mod bus;
/// Logical clock for batch runs.
pub mod clock;
pub mod engine;
pub mod generator;
pub mod prediction;
pub mod summary;
pub mod types;
