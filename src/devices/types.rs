//! Common types and traits for device simulation components.

use rand::{Rng, rngs::StdRng};

/// Nominal DC bus voltage shared by every subsystem (V).
pub const NOMINAL_BUS_VOLTAGE_V: f64 = 48.0;

/// Contextual information passed to devices when sampling a reading.
/// # Fields
/// * `hour` - Local wall-clock hour of the sample (0..=23)
/// * `net_power_w` - Smoothed generation minus load, for devices that integrate it (W)
pub struct DeviceContext {
    pub hour: u32,
    pub net_power_w: Option<f64>,
}

impl DeviceContext {
    /// Creates a new DeviceContext for the given hour and no power balance.
    pub fn new(hour: u32) -> Self {
        Self {
            hour,
            net_power_w: None,
        }
    }

    /// Creates a new DeviceContext carrying the microgrid power balance.
    pub fn with_net_power(hour: u32, net_power_w: f64) -> Self {
        Self {
            hour,
            net_power_w: Some(net_power_w),
        }
    }
}

/// Trait defining a simulated device that reports a measurement each tick.
///
/// Reading a device advances its internal state (smoothing filters, state of
/// charge), so devices must be read in increasing time order.
pub trait Device {
    /// Measurement produced per sample.
    type Reading;

    /// Samples the device at the given context and advances its state.
    fn read(&mut self, context: &DeviceContext) -> Self::Reading;

    /// Returns a human-readable type name for the device.
    fn device_type(&self) -> &'static str;
}

/// Exponential smoothing (first-order IIR low-pass) of `last` towards `sample`.
///
/// `retain` is the weight kept from the previous value.
pub fn smooth(last: f64, sample: f64, retain: f64) -> f64 {
    last * retain + sample * (1.0 - retain)
}

/// Uniform noise in `[-amplitude / 2, amplitude / 2)`.
pub fn centered_noise(rng: &mut StdRng, amplitude: f64) -> f64 {
    (rng.random::<f64>() - 0.5) * amplitude
}

/// Nominal bus voltage with a uniform jitter of total width `jitter_v`.
pub fn jittered_voltage(rng: &mut StdRng, jitter_v: f64) -> f64 {
    NOMINAL_BUS_VOLTAGE_V + centered_noise(rng, jitter_v)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn smooth_blends_previous_and_sample() {
        assert!((smooth(5000.0, 0.0, 0.7) - 3500.0).abs() < 1e-9);
        assert!((smooth(4000.0, 6000.0, 0.8) - 4400.0).abs() < 1e-9);
    }

    #[test]
    fn centered_noise_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let n = centered_noise(&mut rng, 1000.0);
            assert!((-500.0..500.0).contains(&n));
        }
    }

    #[test]
    fn jittered_voltage_is_near_nominal() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = jittered_voltage(&mut rng, 2.0);
            assert!((47.0..49.0).contains(&v));
        }
    }
}
