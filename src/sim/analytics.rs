//! Synthetic daily energy rollups.

use chrono::{DateTime, Local};
use rand::{Rng, rngs::StdRng};
use uuid::Uuid;

use super::types::{AnalyticsPeriod, EnergyAnalytics};

/// Returns `base + span * r` for a uniform `r` in `[0, 1)`.
fn band(rng: &mut StdRng, base: f64, span: f64) -> f64 {
    base + rng.random::<f64>() * span
}

/// Produces a randomized daily rollup for `microgrid_id`.
///
/// Values are drawn independently and are not derived from any readings.
pub fn generate_daily_analytics(
    rng: &mut StdRng,
    microgrid_id: &str,
    date: DateTime<Local>,
) -> EnergyAnalytics {
    EnergyAnalytics {
        id: Uuid::new_v4(),
        microgrid_id: microgrid_id.to_string(),
        date,
        period: AnalyticsPeriod::Daily,
        solar_energy_kwh: band(rng, 85.0, 30.0),
        wind_energy_kwh: band(rng, 45.0, 20.0),
        battery_charged_kwh: band(rng, 35.0, 15.0),
        battery_discharged_kwh: band(rng, 40.0, 15.0),
        load_consumed_kwh: band(rng, 95.0, 20.0),
        grid_export_kwh: band(rng, 15.0, 10.0),
        grid_import_kwh: band(rng, 5.0, 5.0),
        efficiency_percent: band(rng, 88.0, 8.0),
    }
}
