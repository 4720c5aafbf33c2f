use std::f64::consts::PI;

use crate::devices::types::{Device, DeviceContext, centered_noise, jittered_voltage, smooth};
use crate::sim::types::WindReading;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// A wind turbine driven by gusty, loosely diurnal wind.
///
/// The wind multiplier is a uniform base in `[0.3, 1.0)` plus a slow
/// sinusoid over the day (amplitude 0.2, peaking at 06:00). Output power is
/// smoothed the same way as [`super::solar::SolarArray`].
#[derive(Debug, Clone)]
pub struct WindTurbine {
    /// Rated output (W).
    pub capacity_w: f64,

    /// Smoothed power carried between samples (W).
    last_power_w: f64,

    rng: StdRng,
}

impl WindTurbine {
    pub const DEFAULT_CAPACITY_W: f64 = 5_000.0;
    const NOISE_W: f64 = 500.0;
    const RETAIN: f64 = 0.7;
    const VOLTAGE_JITTER_V: f64 = 2.0;
    /// Wind speed at a zero multiplier (m/s).
    const BASE_SPEED_MS: f64 = 3.0;
    /// Wind speed gained per unit of multiplier (m/s).
    const SPEED_PER_UNIT_MS: f64 = 12.0;

    /// Creates a wind turbine.
    ///
    /// # Arguments
    ///
    /// * `capacity_w` - Rated output in watts (negative values clamp to zero)
    /// * `initial_power_w` - Seed for the smoothing state
    /// * `seed` - Random seed for reproducible gusts
    pub fn new(capacity_w: f64, initial_power_w: f64, seed: u64) -> Self {
        Self {
            capacity_w: capacity_w.max(0.0),
            last_power_w: initial_power_w.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn last_power_w(&self) -> f64 {
        self.last_power_w
    }

    fn multiplier(&mut self, hour: u32) -> f64 {
        let diurnal = (f64::from(hour) / 24.0 * 2.0 * PI).sin() * 0.2;
        0.3 + self.rng.random::<f64>() * 0.7 + diurnal
    }
}

impl Device for WindTurbine {
    type Reading = WindReading;

    fn read(&mut self, context: &DeviceContext) -> WindReading {
        let m = self.multiplier(context.hour);
        let instant_w =
            (self.capacity_w * m + centered_noise(&mut self.rng, Self::NOISE_W)).max(0.0);
        self.last_power_w = smooth(self.last_power_w, instant_w, Self::RETAIN);

        let voltage_v = jittered_voltage(&mut self.rng, Self::VOLTAGE_JITTER_V);
        WindReading {
            voltage_v,
            current_a: self.last_power_w / voltage_v,
            power_w: self.last_power_w,
            speed_ms: Self::BASE_SPEED_MS + m * Self::SPEED_PER_UNIT_MS,
        }
    }

    fn device_type(&self) -> &'static str {
        "WindTurbine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_range() {
        let mut wt = WindTurbine::new(5_000.0, 3_000.0, 1);
        for hour in 0..24 {
            for _ in 0..50 {
                let m = wt.multiplier(hour);
                assert!((0.1..1.2).contains(&m), "hour {hour}: {m}");
            }
        }
    }

    #[test]
    fn test_speed_tracks_multiplier() {
        let mut wt = WindTurbine::new(5_000.0, 3_000.0, 1);
        for hour in 0..240 {
            let r = wt.read(&DeviceContext::new(hour % 24));
            assert!(r.speed_ms >= 3.0 + 0.1 * 12.0 - 1e-9);
            assert!(r.speed_ms < 3.0 + 1.2 * 12.0);
            assert!(r.power_w >= 0.0);
        }
    }

    #[test]
    fn test_smoothing_limits_step_change() {
        let mut wt = WindTurbine::new(5_000.0, 3_000.0, 9);
        let mut last = wt.last_power_w();
        for step in 0..100 {
            let p = wt.read(&DeviceContext::new(step % 24)).power_w;
            // The instantaneous sample is bounded by 1.2 * 5000 + 250 W.
            assert!((p - last).abs() <= 0.3 * 6_250.0 + 1e-9);
            last = p;
        }
    }

    #[test]
    fn test_current_is_power_over_voltage() {
        let mut wt = WindTurbine::new(5_000.0, 3_000.0, 3);
        let r = wt.read(&DeviceContext::new(12));
        assert!((r.current_a - r.power_w / r.voltage_v).abs() < 1e-9);
    }
}
