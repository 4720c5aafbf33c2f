use std::f64::consts::PI;

use crate::devices::types::{Device, DeviceContext, centered_noise, jittered_voltage, smooth};
use crate::sim::types::PowerReading;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// A solar array following a diurnal half-sine curve with weather noise.
///
/// Output is zero outside `[sunrise_hour, sunset_hour]`. Inside that window
/// the instantaneous output is `capacity_w * sin(pi * (hour - sunrise) / span)`
/// scaled by a random weather factor in `[0.8, 1.2)`, plus additive noise.
/// The reported power is exponentially smoothed to model panel and inverter
/// inertia.
#[derive(Debug, Clone)]
pub struct SolarArray {
    /// Nameplate output under ideal irradiance (W).
    pub capacity_w: f64,

    /// First hour of generation (inclusive).
    pub sunrise_hour: u32,

    /// Last hour of generation (inclusive).
    pub sunset_hour: u32,

    /// Smoothed power carried between samples (W).
    last_power_w: f64,

    /// Random number generator for weather and sensor noise.
    rng: StdRng,
}

impl SolarArray {
    pub const DEFAULT_CAPACITY_W: f64 = 10_000.0;
    /// Total width of the additive output noise (W).
    const NOISE_W: f64 = 1_000.0;
    /// Weight of the previous smoothed value.
    const RETAIN: f64 = 0.7;
    /// Total width of the voltage jitter (V).
    const VOLTAGE_JITTER_V: f64 = 2.0;

    /// Creates a solar array with the default 06:00–18:00 generation window.
    ///
    /// # Arguments
    ///
    /// * `capacity_w` - Nameplate output in watts (negative values clamp to zero)
    /// * `initial_power_w` - Seed for the smoothing state
    /// * `seed` - Random seed for reproducible noise generation
    pub fn new(capacity_w: f64, initial_power_w: f64, seed: u64) -> Self {
        Self {
            capacity_w: capacity_w.max(0.0),
            sunrise_hour: 6,
            sunset_hour: 18,
            last_power_w: initial_power_w.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Smoothed power reported by the last sample (W).
    pub fn last_power_w(&self) -> f64 {
        self.last_power_w
    }

    /// Irradiance multiplier for `hour`, including the random weather factor.
    fn multiplier(&mut self, hour: u32) -> f64 {
        if hour < self.sunrise_hour || hour > self.sunset_hour {
            return 0.0;
        }
        let span = f64::from(self.sunset_hour - self.sunrise_hour);
        let frac = f64::from(hour - self.sunrise_hour) / span;
        (frac * PI).sin() * (0.8 + self.rng.random::<f64>() * 0.4)
    }
}

impl Device for SolarArray {
    type Reading = PowerReading;

    fn read(&mut self, context: &DeviceContext) -> PowerReading {
        let m = self.multiplier(context.hour);
        let instant_w =
            (self.capacity_w * m + centered_noise(&mut self.rng, Self::NOISE_W)).max(0.0);
        self.last_power_w = smooth(self.last_power_w, instant_w, Self::RETAIN);

        let voltage_v = jittered_voltage(&mut self.rng, Self::VOLTAGE_JITTER_V);
        PowerReading::from_power(self.last_power_w, voltage_v)
    }

    fn device_type(&self) -> &'static str {
        "SolarArray"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(hour: u32) -> DeviceContext {
        DeviceContext::new(hour)
    }

    #[test]
    fn test_new_solar_array() {
        let pv = SolarArray::new(10_000.0, 5_000.0, 42);
        assert_eq!(pv.capacity_w, 10_000.0);
        assert_eq!(pv.sunrise_hour, 6);
        assert_eq!(pv.sunset_hour, 18);
        assert_eq!(pv.last_power_w(), 5_000.0);
    }

    #[test]
    fn test_negative_capacity_clamped_to_zero() {
        let pv = SolarArray::new(-1.0, 0.0, 42);
        assert_eq!(pv.capacity_w, 0.0);
    }

    #[test]
    fn test_multiplier_zero_at_night() {
        let mut pv = SolarArray::new(10_000.0, 0.0, 42);
        for hour in [0, 3, 5, 19, 23] {
            assert_eq!(pv.multiplier(hour), 0.0);
        }
    }

    #[test]
    fn test_multiplier_peaks_at_noon() {
        let mut pv = SolarArray::new(10_000.0, 0.0, 42);
        for _ in 0..100 {
            let m = pv.multiplier(12);
            assert!((0.8..1.2).contains(&m));
        }
        // sin(0) at sunrise and sin(pi) at sunset are (numerically) zero.
        assert!(pv.multiplier(6).abs() < 1e-12);
        assert!(pv.multiplier(18).abs() < 1e-12);
    }

    #[test]
    fn test_night_output_decays_towards_zero() {
        let mut pv = SolarArray::new(10_000.0, 5_000.0, 42);
        let mut last = pv.last_power_w();
        for _ in 0..60 {
            let p = pv.read(&ctx(2)).power_w;
            // Night noise is centered, so the floored sample is at most 500 W.
            assert!(p <= last.max(500.0) + 1e-9);
            last = p;
        }
        assert!(last < 600.0);
    }

    #[test]
    fn test_output_never_negative() {
        let mut pv = SolarArray::new(10_000.0, 0.0, 42);
        for step in 0..240 {
            let r = pv.read(&ctx(step % 24));
            assert!(r.power_w >= 0.0);
            assert!((47.0..49.0).contains(&r.voltage_v));
        }
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let mut pv1 = SolarArray::new(10_000.0, 5_000.0, 42);
        let mut pv2 = SolarArray::new(10_000.0, 5_000.0, 42);
        for hour in 0..24 {
            assert_eq!(pv1.read(&ctx(hour)), pv2.read(&ctx(hour)));
        }
    }
}
