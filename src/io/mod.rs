/// CSV export of readings and alerts.
pub mod export;
