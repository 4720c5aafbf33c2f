use crate::devices::types::{Device, DeviceContext, NOMINAL_BUS_VOLTAGE_V};
use crate::sim::types::BatteryReading;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// A battery bank tracked by a simple energy-balance integrator.
///
/// `BatteryPack` integrates the microgrid power balance into its state of
/// charge and degrades its state of health by a small random amount each
/// sample. It is not an electrochemical model.
///
/// # Power Flow Convention
/// - Positive net power / current: charging
/// - Negative net power / current: discharging
#[derive(Debug, Clone)]
pub struct BatteryPack {
    /// State of charge (%), within `[MIN_SOC, MAX_SOC]`.
    pub soc: f64,

    /// State of health (%), within `[MIN_SOH, 100]`.
    pub soh: f64,

    rng: StdRng,
}

impl BatteryPack {
    /// SoC floor enforced by the battery management system (%).
    pub const MIN_SOC: f64 = 10.0;
    pub const MAX_SOC: f64 = 100.0;
    /// SoH floor; capacity loss is modelled as saturating here (%).
    pub const MIN_SOH: f64 = 80.0;
    pub const MAX_SOH: f64 = 100.0;
    /// Net watts per percentage point of SoC change in one sample.
    const WATTS_PER_SOC_POINT: f64 = 10_000.0;
    /// Upper bound of the per-sample SoH decrement (%).
    const MAX_SOH_DECREMENT: f64 = 0.0001;
    /// Voltage shift per SoC point away from 50% (V).
    const VOLTS_PER_SOC_POINT: f64 = 0.1;

    /// Creates a battery pack.
    ///
    /// # Arguments
    ///
    /// * `soc` - Initial state of charge (%), clamped into `[10, 100]`
    /// * `soh` - Initial state of health (%), clamped into `[80, 100]`
    /// * `seed` - Random seed for degradation and temperature noise
    pub fn new(soc: f64, soh: f64, seed: u64) -> Self {
        Self {
            soc: soc.clamp(Self::MIN_SOC, Self::MAX_SOC),
            soh: soh.clamp(Self::MIN_SOH, Self::MAX_SOH),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pack voltage for the current state of charge (V).
    pub fn voltage_v(&self) -> f64 {
        NOMINAL_BUS_VOLTAGE_V + (self.soc - 50.0) * Self::VOLTS_PER_SOC_POINT
    }
}

impl Device for BatteryPack {
    type Reading = BatteryReading;

    /// Integrates `context.net_power_w` (zero when absent) and reports the pack.
    fn read(&mut self, context: &DeviceContext) -> BatteryReading {
        let net_w = context.net_power_w.unwrap_or(0.0);

        self.soc = (self.soc + net_w / Self::WATTS_PER_SOC_POINT)
            .clamp(Self::MIN_SOC, Self::MAX_SOC);
        self.soh = (self.soh - self.rng.random::<f64>() * Self::MAX_SOH_DECREMENT)
            .max(Self::MIN_SOH);

        let voltage_v = self.voltage_v();
        BatteryReading {
            voltage_v,
            current_a: net_w / voltage_v,
            soc: self.soc,
            soh: self.soh,
            temperature_c: 25.0 + self.rng.random::<f64>() * 10.0,
        }
    }

    fn device_type(&self) -> &'static str {
        "BatteryPack"
    }
}
