use crate::devices::types::{Device, DeviceContext, jittered_voltage, smooth};
use crate::sim::types::PowerReading;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Community electrical demand with an evening peak.
///
/// Each sample draws a uniform demand in `[base_w, base_w + spread_w)` and adds
/// `evening_peak_w` between 18:00 and 22:00 (inclusive). Demand is smoothed
/// more heavily than generation.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::{Device, DeviceContext, Load};
///
/// let mut load = Load::new(4000.0, 42);
/// let evening = load.read(&DeviceContext::new(20));
/// assert!(evening.power_w > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Load {
    /// Minimum instantaneous demand (W).
    pub base_w: f64,

    /// Width of the uniform demand band above `base_w` (W).
    pub spread_w: f64,

    /// Flat addition during evening hours (W).
    pub evening_peak_w: f64,

    last_power_w: f64,

    rng: StdRng,
}

impl Load {
    const RETAIN: f64 = 0.8;
    const VOLTAGE_JITTER_V: f64 = 1.0;
    const EVENING_START_HOUR: u32 = 18;
    const EVENING_END_HOUR: u32 = 22;

    /// Creates a load with the standard 3–6 kW band and a 2 kW evening peak.
    ///
    /// # Arguments
    ///
    /// * `initial_power_w` - Seed for the smoothing state
    /// * `seed` - Random seed for reproducible demand noise
    pub fn new(initial_power_w: f64, seed: u64) -> Self {
        Self {
            base_w: 3_000.0,
            spread_w: 3_000.0,
            evening_peak_w: 2_000.0,
            last_power_w: initial_power_w.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn last_power_w(&self) -> f64 {
        self.last_power_w
    }

    /// Returns `true` for hours that receive the evening peak offset.
    pub fn is_evening_peak(hour: u32) -> bool {
        (Self::EVENING_START_HOUR..=Self::EVENING_END_HOUR).contains(&hour)
    }
}

impl Device for Load {
    type Reading = PowerReading;

    fn read(&mut self, context: &DeviceContext) -> PowerReading {
        let peak = if Self::is_evening_peak(context.hour) {
            self.evening_peak_w
        } else {
            0.0
        };
        let instant_w = self.base_w + self.rng.random::<f64>() * self.spread_w + peak;
        self.last_power_w = smooth(self.last_power_w, instant_w, Self::RETAIN);

        let voltage_v = jittered_voltage(&mut self.rng, Self::VOLTAGE_JITTER_V);
        PowerReading::from_power(self.last_power_w, voltage_v)
    }

    fn device_type(&self) -> &'static str {
        "Load"
    }
}
