use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "microgrid-sim",
    version,
    about = "Microgrid telemetry simulator with threshold alerts and advisory forecasts",
    long_about = None
)]
pub struct Cli {
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with = "preset",
        help = "Load scenario from a TOML file"
    )]
    pub scenario: Option<PathBuf>,

    #[arg(long, value_name = "NAME", help = "Use a built-in preset (default: baseline)")]
    pub preset: Option<String>,

    #[arg(long, global = true, help = "Override the random seed")]
    pub seed: Option<u64>,

    #[arg(long, global = true, value_name = "ID", help = "Override the microgrid identifier")]
    pub microgrid_id: Option<String>,

    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Stream live readings on a wall-clock timer")]
    Run(RunArgs),
    #[command(about = "Simulate a fixed number of steps on a logical clock")]
    Batch(BatchArgs),
    #[command(about = "Print predictions and a daily analytics rollup")]
    Advise(AdviseArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, value_name = "MS", help = "Timer period, overriding the scenario")]
    pub interval_ms: Option<u64>,

    #[arg(
        long,
        value_name = "MS",
        help = "Prediction refresh period, overriding the scenario (0 turns it off)"
    )]
    pub prediction_interval_ms: Option<u64>,

    #[arg(long, value_name = "SECS", help = "Stop after this many seconds (default: until Ctrl-C)")]
    pub duration_secs: Option<u64>,

    #[arg(long, help = "Print readings and alerts as JSON lines")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    #[arg(long, help = "Number of readings, overriding the scenario")]
    pub steps: Option<usize>,

    #[arg(long, value_name = "MIN", help = "Simulated minutes between readings")]
    pub step_minutes: Option<u32>,

    #[arg(long, value_name = "FILE", help = "Export readings to CSV")]
    pub telemetry_out: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Export alerts to CSV")]
    pub alerts_out: Option<PathBuf>,

    #[arg(short, long, help = "Print only the run summary")]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct AdviseArgs {
    #[arg(long, help = "Print as JSON")]
    pub json: bool,
}
