mod forcing;

use anyhow::{Context, Result};
use clap::Parser;
use forcing::{read_drivers, synthetic_drivers, SyntheticForcing};
use serde::Serialize;
use std::path::PathBuf;
use stomatal_core::{run_time_series, Drivers, ModelConfig, Preset, TimeSeriesOutput};
use tracing::info;

/// Stomatal optimisation batch runner
#[derive(Parser, Debug)]
#[command(name = "stomatal-demo")]
#[command(
    about = "Runs the stomatal profit-optimisation model over a driver time series",
    long_about = None
)]
struct Args {
    /// JSON model configuration (overrides --preset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Preset model (profit-max, sox)
    #[arg(short, long, default_value = "profit-max")]
    preset: Preset,

    /// CSV drivers file; a synthetic drydown is generated when absent
    #[arg(long)]
    drivers: Option<PathBuf>,

    /// Days of synthetic forcing
    #[arg(long, default_value_t = 10)]
    days: usize,

    /// Timestep in seconds
    #[arg(short, long, default_value_t = 1800.0)]
    timestep: f64,

    /// Seed of the synthetic weather noise
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Soil water potential on day one in MPa
    #[arg(long, default_value_t = -0.3, allow_hyphen_values = true)]
    soil_start: f64,

    /// Soil drydown rate in MPa per day
    #[arg(long, default_value_t = 0.25)]
    drydown_rate: f64,

    /// Feed each optimum back into the xylem damage state
    #[arg(long)]
    damage: bool,

    /// Leaf water potential samples per optimisation (overrides the config)
    #[arg(short, long)]
    samples: Option<usize>,

    /// Output CSV (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

/// One output CSV row
#[derive(Debug, Serialize)]
struct OutputRecord {
    step: usize,
    time_s: f64,
    soil_water_potential: f64,
    leaf_water_potential: f64,
    net_assimilation: f64,
    transpiration: f64,
    intercellular_co2: f64,
    stomatal_conductance: f64,
    maximum_conductance: f64,
}

fn load_config(args: &Args) -> Result<ModelConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ModelConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => args.preset.config(),
    };
    if let Some(samples) = args.samples {
        config.settings.sample_points = samples;
    }
    Ok(config)
}

fn load_drivers(args: &Args) -> Result<Vec<Drivers>> {
    match &args.drivers {
        Some(path) => read_drivers(path),
        None => synthetic_drivers(&SyntheticForcing {
            days: args.days,
            timestep: args.timestep,
            seed: args.seed,
            initial_soil_water_potential: args.soil_start,
            drydown_rate: args.drydown_rate,
        }),
    }
}

fn write_output(args: &Args, drivers: &[Drivers], output: &TimeSeriesOutput) -> Result<()> {
    let sink: Box<dyn std::io::Write> = match &args.output {
        Some(path) => Box::new(
            std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(sink);
    for (step, forcing) in drivers.iter().enumerate() {
        let state = output.state(step);
        writer.serialize(OutputRecord {
            step,
            time_s: step as f64 * args.timestep,
            soil_water_potential: forcing.soil_water_potential,
            leaf_water_potential: state.leaf_water_potential,
            net_assimilation: state.net_assimilation,
            transpiration: state.transpiration,
            intercellular_co2: state.intercellular_co2,
            stomatal_conductance: state.stomatal_conductance,
            maximum_conductance: output.maximum_conductance[step],
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    if args.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let mut model = config.build().context("building the optimisation model")?;
    let drivers = load_drivers(&args)?;
    info!(
        "Loaded {} timesteps ({})",
        drivers.len(),
        args.drivers
            .as_ref()
            .map_or_else(|| "synthetic drydown".to_string(), |p| p.display().to_string())
    );

    let output = run_time_series(&mut model, &drivers, args.timestep, args.damage)?;

    let total_assimilation: f64 = output
        .net_assimilation
        .iter()
        .filter(|a| a.is_finite())
        .map(|a| a * args.timestep)
        .sum();
    info!(
        "Net assimilation over the run: {:.1} mmol m⁻², final k_max {:.4}",
        total_assimilation / 1000.0,
        output.maximum_conductance.last().copied().unwrap_or(f64::NAN)
    );

    write_output(&args, &drivers, &output)
}
