//! climate-analyze: run the anomaly pipeline over sensor readings from a
//! JSON file and print verdicts, consensus and recommendations as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use climate_compute::{AnalysisEngine, ConsensusSummary, SensorReport, SensorSeries};
use climate_core::config::{load_dotenv, Config};
use climate_core::{Quantity, Reading, Series};
use climate_rules::loader::{LoadStatus, RuleLoader};
use climate_rules::AnalysisRules;

// ── CLI ─────────────────────────────────────────────────────────────

/// Microclimate anomaly analysis and recommendations.
#[derive(Parser, Debug)]
#[command(name = "climate-analyze", version, about)]
struct Cli {
    /// Directory of YAML analysis configuration (defaults to built-ins).
    #[arg(long, global = true, env = "CLIMATE_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one or more sensor series from a JSON file.
    Analyze {
        /// JSON file: one sensor object or an array of them.
        #[arg(long, short)]
        input: PathBuf,

        /// Room type for sensors that do not name one.
        #[arg(long)]
        room: Option<String>,

        /// Quantity for sensors that do not name one.
        #[arg(long)]
        quantity: Option<String>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Load and validate the analysis configuration.
    CheckConfig,
}

// ── Input / output ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SensorInput {
    #[serde(default)]
    sensor_id: Option<String>,
    #[serde(default)]
    quantity: Option<String>,
    #[serde(default)]
    room_type: Option<String>,
    #[serde(default)]
    ambient_temperature: Option<f64>,
    readings: Vec<Reading>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputFile {
    Many(Vec<SensorInput>),
    One(SensorInput),
}

#[derive(Debug, Serialize)]
struct Failure {
    sensor_id: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct Output {
    reports: Vec<SensorReport>,
    failures: Vec<Failure>,
    summary: ConsensusSummary,
}

impl SensorInput {
    fn into_series(self, index: usize, quantity: Option<Quantity>) -> Result<SensorSeries> {
        let sensor_id = self.sensor_id.unwrap_or_else(|| format!("sensor-{}", index + 1));
        let quantity = match self.quantity {
            Some(q) => q
                .parse::<Quantity>()
                .with_context(|| format!("sensor '{}'", sensor_id))?,
            None => quantity.with_context(|| {
                format!("sensor '{}' names no quantity and --quantity is not set", sensor_id)
            })?,
        };
        let series = Series::new(self.readings)
            .with_context(|| format!("sensor '{}' has invalid readings", sensor_id))?
            .with_sensor_id(sensor_id.clone());
        Ok(SensorSeries {
            sensor_id,
            quantity,
            room_type: self.room_type,
            ambient_temperature: self.ambient_temperature,
            series,
        })
    }
}

// ── Commands ────────────────────────────────────────────────────────

fn analyze(
    config: &Config,
    input: PathBuf,
    room: Option<String>,
    quantity: Option<String>,
    pretty: bool,
) -> Result<()> {
    let raw = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let parsed: InputFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let inputs = match parsed {
        InputFile::Many(v) => v,
        InputFile::One(s) => vec![s],
    };
    let default_quantity = quantity
        .map(|q| q.parse::<Quantity>())
        .transpose()
        .context("invalid --quantity")?;

    let sensors = inputs
        .into_iter()
        .enumerate()
        .map(|(i, s)| s.into_series(i, default_quantity))
        .collect::<Result<Vec<_>>>()?;

    let mut engine = AnalysisEngine::from_config(&config.analysis)
        .context("failed to build analysis engine")?;
    if let Some(room) = room {
        engine = engine.with_default_room(room);
    }

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (sensor, result) in sensors.iter().zip(engine.report_all(&sensors)) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                warn!(sensor = %sensor.sensor_id, error = %e, "sensor analysis failed");
                failures.push(Failure {
                    sensor_id: sensor.sensor_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    let summary = AnalysisEngine::summarize(&reports);
    info!(
        analyzed = reports.len(),
        failed = failures.len(),
        anomalies = summary.anomalies,
        "analysis complete"
    );

    let output = Output {
        reports,
        failures,
        summary,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);
    Ok(())
}

fn check_config(config: &Config) -> Result<()> {
    if let Some(dir) = &config.analysis.config_dir {
        let mut loader = RuleLoader::new(dir);
        let results = loader
            .load_all()
            .with_context(|| format!("failed to scan {}", dir.display()))?;
        for r in &results {
            match &r.status {
                LoadStatus::Loaded { id } => println!("loaded   {} ({})", r.path.display(), id),
                LoadStatus::Skipped { reason } => {
                    println!("skipped  {} ({})", r.path.display(), reason)
                }
                LoadStatus::Failed { error } => {
                    println!("FAILED   {}: {}", r.path.display(), error)
                }
            }
        }
    }

    let rules = AnalysisRules::load(config.analysis.config_dir.as_deref())
        .context("failed to load analysis configuration")?;
    let validation = rules.validate();
    for w in &validation.warnings {
        println!("warning  {}: {}", w.path, w.message);
    }
    for e in &validation.errors {
        match &e.suggestion {
            Some(s) => println!("error    {}: {} (did you mean '{}'?)", e.path, e.message, s),
            None => println!("error    {}: {}", e.path, e.message),
        }
    }
    if !validation.valid {
        bail!("configuration has {} error(s)", validation.errors.len());
    }
    println!(
        "ok: {} room profiles, default room '{}'",
        rules.rooms.rooms.len(),
        rules.rooms.default_room
    );
    Ok(())
}

// ── Main ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if cli.config_dir.is_some() {
        config.analysis.config_dir = cli.config_dir.clone();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.logging.filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    config.log_summary();
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.analysis.resolved_worker_threads())
        .build_global()
        .context("failed to configure worker threads")?;

    match cli.command {
        Command::Analyze {
            input,
            room,
            quantity,
            pretty,
        } => analyze(&config, input, room, quantity, pretty),
        Command::CheckConfig => check_config(&config),
    }
}
