//! Microgrid simulator entry point: CLI wiring and scenario-driven runs.

mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info};

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::io::export::{export_alerts_csv, export_readings_csv};
use microgrid_sim::logging;
use microgrid_sim::service::SimulationService;
use microgrid_sim::sim::clock::Clock;
use microgrid_sim::sim::engine::SimulationEngine;
use microgrid_sim::sim::summary::RunSummary;
use microgrid_sim::sim::types::{
    AiPrediction, Alert, EnergyAnalytics, SensorReading, SystemStatus,
};

use cli::{AdviseArgs, BatchArgs, Cli, Command, RunArgs};

/// Loads the scenario (`--scenario` first, then `--preset`, else baseline)
/// and applies global overrides.
fn load_scenario(cli: &Cli) -> Result<ScenarioConfig> {
    let mut scenario = if let Some(path) = &cli.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(name) = &cli.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = Some(seed);
    }
    if let Some(id) = &cli.microgrid_id {
        scenario.simulation.microgrid_id = id.clone();
    }
    Ok(scenario)
}

fn validate(scenario: &ScenarioConfig) -> Result<()> {
    let errors = scenario.validate();
    if errors.is_empty() {
        return Ok(());
    }
    for e in &errors {
        error!("{e}");
    }
    let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
    bail!("invalid scenario:\n  {}", joined.join("\n  "))
}

/// Prints `value` as one JSON line, or its `Display` form.
fn emit<T: Serialize + std::fmt::Display>(value: &T, json: bool) {
    if !json {
        println!("{value}");
        return;
    }
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => error!("failed to serialize record: {e}"),
    }
}

fn run_live(mut scenario: ScenarioConfig, args: RunArgs) -> Result<()> {
    if let Some(ms) = args.interval_ms {
        scenario.simulation.interval_ms = ms;
    }
    if let Some(ms) = args.prediction_interval_ms {
        scenario.simulation.prediction_interval_ms = ms;
    }
    validate(&scenario)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    runtime.block_on(live(scenario, args))
}

async fn live(scenario: ScenarioConfig, args: RunArgs) -> Result<()> {
    let id = scenario.simulation.microgrid_id.clone();
    let interval = Duration::from_millis(scenario.simulation.interval_ms);
    let mut service = SimulationService::new(SimulationEngine::from_config(&scenario));
    service.set_prediction_interval(scenario.prediction_interval());

    let json = args.json;
    let readings = service.on_reading(move |r| emit(r, json));
    let alerts = service.on_alert(move |a| emit(a, json));
    let predictions = service.on_predictions(move |batch| {
        for p in batch {
            emit(p, json);
        }
    });

    service.start(id.clone(), interval)?;
    match args.duration_secs {
        Some(secs) => tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
            result = tokio::signal::ctrl_c() => result.context("failed to listen for Ctrl-C")?,
        },
        None => tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")?,
    }
    service.stop();

    readings.unsubscribe();
    alerts.unsubscribe();
    predictions.unsubscribe();
    info!(microgrid = %id, ticks = service.ticks(), "live run finished");
    Ok(())
}

fn run_batch(mut scenario: ScenarioConfig, args: BatchArgs) -> Result<()> {
    if let Some(steps) = args.steps {
        scenario.batch.steps = steps;
    }
    if let Some(minutes) = args.step_minutes {
        scenario.batch.step_minutes = minutes;
    }
    validate(&scenario)?;

    let start = scenario
        .batch_start()
        .context("batch start does not exist in the local time zone")?;
    let step = chrono::Duration::minutes(i64::from(scenario.batch.step_minutes));
    let mut clock = Clock::new(start, step, scenario.batch.steps);
    let mut engine = SimulationEngine::from_config(&scenario);
    let id = scenario.simulation.microgrid_id.clone();

    // Alerts are collected through the bus the way a live consumer would see them.
    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    let subscription = engine.on_alert(move |a| sink.lock().push(a.clone()));

    let mut readings = Vec::with_capacity(scenario.batch.steps);
    clock.run(|_, at| {
        let output = engine.tick_at(&id, at);
        if !args.quiet {
            println!("{}", output.reading);
            for alert in &output.alerts {
                println!("  ! {alert}");
            }
        }
        readings.push(output.reading);
    });
    subscription.unsubscribe();
    let alerts = std::mem::take(&mut *collected.lock());

    let summary = RunSummary::from_run(&readings, &alerts, clock.step_hours());
    println!("\n{summary}");

    if let Some(path) = &args.telemetry_out {
        export_readings_csv(&readings, path)
            .with_context(|| format!("failed to write telemetry to {}", path.display()))?;
        eprintln!("Telemetry written to {}", path.display());
    }
    if let Some(path) = &args.alerts_out {
        export_alerts_csv(&alerts, path)
            .with_context(|| format!("failed to write alerts to {}", path.display()))?;
        eprintln!("Alerts written to {}", path.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct Advice<'a> {
    reading: &'a SensorReading,
    status: SystemStatus,
    alerts: &'a [Alert],
    predictions: &'a [AiPrediction],
    analytics: &'a EnergyAnalytics,
}

fn run_advise(scenario: ScenarioConfig, args: AdviseArgs) -> Result<()> {
    validate(&scenario)?;
    let id = scenario.simulation.microgrid_id.clone();
    let mut engine = SimulationEngine::from_config(&scenario);

    let output = engine.step(&id);
    let predictions = engine.predictions(&id, &output.reading);
    let analytics = engine.daily_analytics(&id);

    if args.json {
        let advice = Advice {
            reading: &output.reading,
            status: output.reading.status(),
            alerts: &output.alerts,
            predictions: &predictions,
            analytics: &analytics,
        };
        let text = serde_json::to_string_pretty(&advice).context("failed to serialize advice")?;
        println!("{text}");
        return Ok(());
    }

    println!("{}", output.reading);
    for alert in &output.alerts {
        println!("  ! {alert}");
    }
    println!("\n--- Predictions ---");
    for p in &predictions {
        println!("{p}");
    }
    println!("\n{analytics}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let scenario = load_scenario(&cli)?;
    match cli.command {
        Command::Run(args) => run_live(scenario, args),
        Command::Batch(args) => run_batch(scenario, args),
        Command::Advise(args) => run_advise(scenario, args),
    }
}
