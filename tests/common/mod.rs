//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone};
use parking_lot::Mutex;

use microgrid_sim::sim::clock::Clock;
use microgrid_sim::sim::engine::SimulationEngine;
use microgrid_sim::sim::generator::{InitialState, ReadingGenerator};
use microgrid_sim::sim::types::{Alert, SensorReading};

/// Seed used across integration tests.
pub const SEED: u64 = 42;

/// Local midnight on 2024-06-01, clear of any daylight-saving transition.
pub fn day_start() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

/// Engine with the default seed state.
pub fn default_engine(seed: u64) -> SimulationEngine {
    engine_with(InitialState::default(), seed)
}

pub fn engine_with(initial: InitialState, seed: u64) -> SimulationEngine {
    SimulationEngine::new(ReadingGenerator::new(initial, seed), seed)
}

/// Everything the bus delivered during a run.
#[derive(Debug, Default)]
pub struct Recorded {
    pub readings: Vec<SensorReading>,
    pub alerts: Vec<Alert>,
}

/// Ticks `engine` over one simulated day at `step_minutes` resolution and
/// returns what subscribers received.
pub fn run_day(engine: &mut SimulationEngine, microgrid_id: &str, step_minutes: i64) -> Recorded {
    let steps = (24 * 60 / step_minutes) as usize;
    let mut clock = Clock::new(day_start(), Duration::minutes(step_minutes), steps);
    run_clock(engine, microgrid_id, &mut clock)
}

pub fn run_clock(engine: &mut SimulationEngine, microgrid_id: &str, clock: &mut Clock) -> Recorded {
    let recorded = Arc::new(Mutex::new(Recorded::default()));

    let sink = Arc::clone(&recorded);
    let readings = engine.on_reading(move |r| sink.lock().readings.push(r.clone()));
    let sink = Arc::clone(&recorded);
    let alerts = engine.on_alert(move |a| sink.lock().alerts.push(a.clone()));

    clock.run(|_, at| {
        engine.tick_at(microgrid_id, at);
    });

    readings.unsubscribe();
    alerts.unsubscribe();
    std::mem::take(&mut *recorded.lock())
}
