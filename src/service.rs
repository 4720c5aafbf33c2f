//! Wall-clock driver that ticks a [`SimulationEngine`] on a repeating timer.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::sim::bus::{EventBus, Subscription};
use crate::sim::engine::SimulationEngine;
use crate::sim::types::{AiPrediction, Alert, EnergyAnalytics, SensorReading};

/// Interval used when the caller has no preference.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2_000);

/// Shortest interval the timer accepts; shorter requests are raised to it.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Period of the prediction refresh unless configured otherwise.
pub const DEFAULT_PREDICTION_INTERVAL: Duration = Duration::from_millis(30_000);

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("the simulation timer needs a tokio runtime; call start from within one")]
    NoRuntime,
}

/// Owns one engine and at most one live timer driving it.
///
/// Each tick locks the engine only long enough to generate and evaluate a
/// reading; subscribers are notified after the lock is released, so a
/// listener may call back into the service (for example to request
/// predictions) without deadlocking.
///
/// While running, the same task also refreshes predictions from the latest
/// delivered reading on a coarser period (see
/// [`SimulationService::set_prediction_interval`]).
///
/// Dropping the service stops the timer.
#[derive(Debug)]
pub struct SimulationService {
    engine: Arc<Mutex<SimulationEngine>>,
    bus: EventBus,
    prediction_interval: Option<Duration>,
    timer: Option<JoinHandle<()>>,
}

impl SimulationService {
    pub fn new(engine: SimulationEngine) -> Self {
        let bus = engine.bus().clone();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            bus,
            prediction_interval: Some(DEFAULT_PREDICTION_INTERVAL),
            timer: None,
        }
    }

    /// Sets the prediction refresh period, `None` to disable it.
    ///
    /// Takes effect on the next [`SimulationService::start`].
    pub fn set_prediction_interval(&mut self, interval: Option<Duration>) {
        self.prediction_interval = interval;
    }

    /// Starts ticking every `interval`, first tick one interval from now.
    ///
    /// A running timer is stopped first, so there is never more than one.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NoRuntime`] when called outside a tokio runtime.
    pub fn start(
        &mut self,
        microgrid_id: impl Into<String>,
        interval: Duration,
    ) -> Result<(), ServiceError> {
        let handle = Handle::try_current().map_err(|_| ServiceError::NoRuntime)?;
        self.stop();

        let microgrid_id = microgrid_id.into();
        let period = interval.max(MIN_INTERVAL);
        let refresh = self.prediction_interval.map(|p| p.max(MIN_INTERVAL));
        let engine = Arc::clone(&self.engine);
        let bus = self.bus.clone();

        info!(
            microgrid = %microgrid_id,
            interval_ms = period.as_millis() as u64,
            prediction_interval = ?refresh,
            "simulation started"
        );

        self.timer = Some(handle.spawn(async move {
            let mut ticker = repeating(period);
            let mut refresher = refresh.map(repeating);
            let mut latest: Option<SensorReading> = None;
            loop {
                tokio::select! {
                    biased;
                    _ = ticker.tick() => {
                        let output = engine.lock().step(&microgrid_id);
                        bus.deliver(&output.reading, &output.alerts);
                        latest = Some(output.reading);
                    }
                    _ = next_refresh(&mut refresher) => {
                        // Nothing to forecast before the first reading.
                        if let Some(reading) = &latest {
                            let predictions = engine.lock().predictions(&microgrid_id, reading);
                            debug!(
                                microgrid = %microgrid_id,
                                count = predictions.len(),
                                "predictions refreshed"
                            );
                            bus.predictions.publish(&predictions);
                        }
                    }
                }
            }
        }));
        Ok(())
    }

    /// Cancels the timer. Calling it while stopped does nothing.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!("simulation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Registers a reading listener; remains registered across restarts.
    pub fn on_reading<F>(&self, listener: F) -> Subscription<SensorReading>
    where
        F: Fn(&SensorReading) + Send + Sync + 'static,
    {
        self.bus.readings.subscribe(listener)
    }

    /// Registers an alert listener; remains registered across restarts.
    pub fn on_alert<F>(&self, listener: F) -> Subscription<Alert>
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        self.bus.alerts.subscribe(listener)
    }

    /// Registers a listener for the periodic prediction batches.
    pub fn on_predictions<F>(&self, listener: F) -> Subscription<Vec<AiPrediction>>
    where
        F: Fn(&Vec<AiPrediction>) + Send + Sync + 'static,
    {
        self.bus.predictions.subscribe(listener)
    }

    pub fn generate_predictions(
        &self,
        microgrid_id: &str,
        reading: &SensorReading,
    ) -> Vec<AiPrediction> {
        self.engine.lock().predictions(microgrid_id, reading)
    }

    pub fn generate_daily_analytics(&self, microgrid_id: &str) -> EnergyAnalytics {
        self.engine.lock().daily_analytics(microgrid_id)
    }

    /// Number of readings the engine has produced.
    pub fn ticks(&self) -> u64 {
        self.engine.lock().ticks()
    }
}

/// Interval whose first tick is one `period` from now.
fn repeating(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_refresh(refresher: &mut Option<Interval>) {
    match refresher {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

impl Drop for SimulationService {
    fn drop(&mut self) {
        self.stop();
    }
}
