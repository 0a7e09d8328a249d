use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use eaf_app::{
    AppResult, Observer, ObserverError, RunManager, SimulatorConfig, StartRequest, run_batch,
};
use eaf_core::TracingTelemetry;
use eaf_materials::filter_catalog;

#[derive(Parser)]
#[command(name = "eaf-cli")]
#[command(about = "EAF simulator CLI - Electric arc furnace thermal simulation", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the batch pipeline (simulate, log, visualize)
    Run {
        /// Path to the simulator YAML config (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory for CSV/JSON artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Start a real-time run and stream JSON payloads to stdout
    Live {
        /// Path to the simulator YAML config (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stop the run after this many wall-clock seconds
        #[arg(long)]
        stop_after: Option<f64>,
    },
    /// List catalog materials matching an optional query
    Materials {
        query: Option<String>,
    },
    /// Write the example configuration file
    ExampleConfig {
        path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries `live` payloads.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Run { config, output } => cmd_run(config.as_deref(), output.as_deref()),
        Commands::Live { config, stop_after } => cmd_live(config.as_deref(), stop_after),
        Commands::Materials { query } => cmd_materials(query.as_deref().unwrap_or("")),
        Commands::ExampleConfig { path } => cmd_example_config(&path),
    }
}

fn load_config(path: Option<&Path>) -> AppResult<SimulatorConfig> {
    match path {
        Some(path) => SimulatorConfig::load_yaml(path),
        None => Ok(SimulatorConfig::example()),
    }
}

fn cmd_run(config_path: Option<&Path>, output: Option<&Path>) -> AppResult<()> {
    let config = load_config(config_path)?;
    println!(
        "Running batch simulation: {} t, {} s at dt = {} s",
        config.furnace_capacity, config.simulation_duration, config.time_step
    );

    let outcome = run_batch(&config, output, TracingTelemetry::shared())?;
    let report = &outcome.report;

    if report.is_success() {
        println!(
            "✓ Pipeline completed in {:.3} s",
            report.metadata.total_execution_time
        );
    } else {
        println!("✗ Pipeline finished with failed stages:");
        for (stage, err) in report.failures() {
            println!("  {stage}: {err}");
        }
    }

    if let Some(sim) = report.simulation() {
        let fs = &sim.results.final_state;
        println!("  Snapshots: {}", sim.results.snapshots.len());
        println!("  Final metal temperature: {:.2} K", fs.metal_temperature);
        println!("  Final slag temperature: {:.2} K", fs.slag_temperature);
        println!("  Average arc power: {:.1} W", fs.average_power);
        println!("  Energy consumed: {:.1} kWh", fs.total_energy_consumed / 3.6e6);
        println!(
            "  Mass balance error: {:.1} kg",
            sim.mass_balance.mass_balance_error
        );
    }
    if let Some(log) = report.log() {
        println!("  Logged points: {}", log.logged_points);
    }

    if let Some(saved) = &outcome.artifacts {
        println!("Artifacts:");
        for path in [&saved.snapshots, &saved.visualization].into_iter().flatten() {
            println!("  {}", path.display());
        }
        println!("  {}", saved.summary.display());
    }
    Ok(())
}

/// Prints each payload as one JSON line.
struct StdoutObserver;

impl Observer for StdoutObserver {
    fn send(&mut self, message: &str) -> Result<(), ObserverError> {
        let mut out = io::stdout().lock();
        writeln!(out, "{message}").map_err(|e| ObserverError::Send(e.to_string()))
    }
}

fn cmd_live(config_path: Option<&Path>, stop_after: Option<f64>) -> AppResult<()> {
    let config = load_config(config_path)?;
    let manager = RunManager::from_config(&config, TracingTelemetry::shared())?;
    manager.register(Box::new(StdoutObserver))?;

    // The request carries the configured parameters so the first tick uses them.
    let run_id = manager.start(StartRequest::from(&config))?;
    tracing::info!(run_id = %run_id, "live run started");

    let phase = match stop_after {
        Some(seconds) => {
            let limit = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
            match manager.wait_for_terminal(limit)? {
                Some(phase) => phase,
                None => manager.stop()?.phase,
            }
        }
        None => loop {
            if let Some(phase) = manager.wait_for_terminal(Duration::from_secs(60))? {
                break phase;
            }
        },
    };

    let status = manager.status()?;
    let balance = manager.energy_balance()?;
    eprintln!("Run {run_id} {phase} at t = {:.1} s", status.current_time);
    eprintln!("  Metal temperature: {:.2} K", status.current_temperature);
    eprintln!("  Electrical input per step: {:.2} kJ", balance.electrical_energy);
    eprintln!("  Energy efficiency: {:.1}%", balance.energy_efficiency);
    Ok(())
}

fn cmd_materials(query: &str) -> AppResult<()> {
    let specs = filter_catalog(query);
    if specs.is_empty() {
        println!("No materials match '{query}'");
        return Ok(());
    }

    println!("Materials:");
    for spec in specs {
        println!(
            "  {:<12} {:<12} melts at {:>7.2} K, ρ(l) {:>6.0} kg/m³",
            spec.key, spec.display_name, spec.melting_point_k, spec.density_liquid
        );
    }
    Ok(())
}

fn cmd_example_config(path: &Path) -> AppResult<()> {
    SimulatorConfig::example().save_yaml(path)?;
    println!("✓ Example configuration written to {}", path.display());
    Ok(())
}
