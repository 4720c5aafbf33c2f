//! Simulation engine tying the generator, detector, and event bus together.

use chrono::{DateTime, Local};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::config::ScenarioConfig;

use super::analytics::generate_daily_analytics;
use super::anomaly::detect_anomalies;
use super::bus::{EventBus, Subscription};
use super::generator::ReadingGenerator;
use super::prediction::generate_predictions;
use super::types::{AiPrediction, Alert, AlertType, EnergyAnalytics, SensorReading};

/// Seed offset for the advisory RNG to avoid correlation with the devices.
const ADVISORY_SEED_OFFSET: u64 = 101;

/// Result of one simulation tick.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub reading: SensorReading,
    pub alerts: Vec<Alert>,
}

/// One simulated microgrid: generator state plus its subscribers.
///
/// Create one per microgrid session; engines share no state, and dropping
/// one releases its listeners. It is driven either by a
/// logical [`super::clock::Clock`] through [`SimulationEngine::tick_at`] or
/// by the wall-clock timer in [`crate::service::SimulationService`].
#[derive(Debug)]
pub struct SimulationEngine {
    generator: ReadingGenerator,
    bus: EventBus,
    /// Noise source for predictions and analytics.
    advisory_rng: StdRng,
    ticks: u64,
}

impl SimulationEngine {
    /// Creates an engine around `generator`, with `seed` driving advisory noise.
    pub fn new(generator: ReadingGenerator, seed: u64) -> Self {
        Self {
            generator,
            bus: EventBus::new(),
            advisory_rng: StdRng::seed_from_u64(seed.wrapping_add(ADVISORY_SEED_OFFSET)),
            ticks: 0,
        }
    }

    /// Builds an engine from a scenario, drawing a seed from entropy when
    /// the scenario leaves it unset.
    pub fn from_config(config: &ScenarioConfig) -> Self {
        let seed = config.simulation.seed.unwrap_or_else(rand::random);
        Self::new(ReadingGenerator::new(config.initial_state(), seed), seed)
    }

    /// Generates and evaluates one reading at the current local time without
    /// notifying subscribers.
    pub fn step(&mut self, microgrid_id: &str) -> TickOutput {
        self.step_at(microgrid_id, Local::now())
    }

    /// Generates and evaluates one reading at `at` without notifying subscribers.
    pub fn step_at(&mut self, microgrid_id: &str, at: DateTime<Local>) -> TickOutput {
        let reading = self.generator.generate_reading_at(microgrid_id, at);
        let alerts = detect_anomalies(&reading);
        self.ticks += 1;

        debug!(
            microgrid = microgrid_id,
            tick = self.ticks,
            solar_w = reading.solar.power_w,
            wind_w = reading.wind.power_w,
            load_w = reading.load.power_w,
            soc = reading.battery.soc,
            soh = reading.battery.soh,
            alerts = alerts.len(),
            "tick"
        );
        for alert in &alerts {
            match alert.alert_type {
                AlertType::Critical | AlertType::Fault => warn!(
                    microgrid = microgrid_id,
                    rule = alert.rule.as_str(),
                    severity = alert.severity.level(),
                    "{}",
                    alert.title
                ),
                AlertType::Warning | AlertType::Info => info!(
                    microgrid = microgrid_id,
                    rule = alert.rule.as_str(),
                    severity = alert.severity.level(),
                    "{}",
                    alert.title
                ),
            }
        }

        TickOutput { reading, alerts }
    }

    /// One full tick at the current local time: step, then deliver to subscribers.
    pub fn tick(&mut self, microgrid_id: &str) -> TickOutput {
        self.tick_at(microgrid_id, Local::now())
    }

    /// One full tick at `at`: reading listeners are notified first, then
    /// alert listeners once per alert.
    pub fn tick_at(&mut self, microgrid_id: &str, at: DateTime<Local>) -> TickOutput {
        let output = self.step_at(microgrid_id, at);
        self.bus.deliver(&output.reading, &output.alerts);
        output
    }

    pub fn on_reading<F>(&self, listener: F) -> Subscription<SensorReading>
    where
        F: Fn(&SensorReading) + Send + Sync + 'static,
    {
        self.bus.readings.subscribe(listener)
    }

    pub fn on_alert<F>(&self, listener: F) -> Subscription<Alert>
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        self.bus.alerts.subscribe(listener)
    }

    /// Handle to the engine's topics, shareable across threads.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Advisory records for `reading`; independent of the tick cycle.
    pub fn predictions(&mut self, microgrid_id: &str, reading: &SensorReading) -> Vec<AiPrediction> {
        generate_predictions(&mut self.advisory_rng, microgrid_id, reading)
    }

    /// Randomized daily rollup dated now.
    pub fn daily_analytics(&mut self, microgrid_id: &str) -> EnergyAnalytics {
        generate_daily_analytics(&mut self.advisory_rng, microgrid_id, Local::now())
    }

    /// Number of readings generated so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn generator(&self) -> &ReadingGenerator {
        &self.generator
    }
}
