//! NitroGIS CLI - groundwater nitrate vs. cancer rate analysis

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use nitrogis_algorithms::interpolation::IdwParams;
use nitrogis_core::io::{read_tracts_geojson, read_wells_csv};
use nitrogis_core::{Reprojector, TractPolygon, TransverseMercator, WellPoint};
use nitrogis_pipeline::export::{sweep_file_name, write_run_artifacts, write_sweep_table};
use nitrogis_pipeline::{
    run_once, run_sweep, PipelineConfig, RunInput, SweepInput, DEFAULT_POWERS,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "nitrogis")]
#[command(author, version, about = "Groundwater nitrate vs. cancer rate analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpolate, aggregate by tract and regress for one IDW power
    Run {
        #[command(flatten)]
        inputs: InputArgs,
        /// IDW power parameter
        #[arg(short, long, default_value = "2.0")]
        power: f64,
    },
    /// Repeat the regression over a list of IDW powers
    Sweep {
        #[command(flatten)]
        inputs: InputArgs,
        /// Comma-separated IDW powers
        #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_POWERS)]
        powers: Vec<f64>,
    },
    /// Convert a coordinate between lon/lat and Wisconsin Transverse Mercator
    Project {
        /// Longitude, or easting with --inverse
        #[arg(allow_hyphen_values = true)]
        a: f64,
        /// Latitude, or northing with --inverse
        #[arg(allow_hyphen_values = true)]
        b: f64,
        /// Planar metres to degrees
        #[arg(short, long)]
        inverse: bool,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Configuration file to load instead of the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Well samples CSV (lon, lat, nitrate)
    wells: PathBuf,
    /// Census tracts GeoJSON (GEOID10, canrate)
    tracts: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out")]
    out: PathBuf,
    /// Nearest wells per estimate
    #[arg(short = 'k', long, default_value = "12")]
    neighbors: usize,
    /// Grid cell size in metres
    #[arg(short = 's', long, default_value = "1000")]
    cell_size: f64,
    /// Pipeline configuration TOML
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Worker threads (overrides config)
    #[arg(short, long)]
    workers: Option<usize>,
    /// Grid margin in metres (overrides config)
    #[arg(long)]
    margin: Option<f64>,
    /// Abort after this many seconds (overrides config)
    #[arg(long)]
    timeout: Option<u64>,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_toml_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Config file values with command-line overrides applied
fn effective_config(args: &InputArgs) -> Result<PipelineConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(margin) = args.margin {
        config.margin = margin;
    }
    if args.timeout.is_some() {
        config.timeout_secs = args.timeout;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_inputs(
    args: &InputArgs,
    reprojector: &dyn Reprojector,
) -> Result<(Vec<WellPoint>, Vec<TractPolygon>)> {
    let pb = spinner("Reading inputs...")?;
    let wells = read_wells_csv(&args.wells, reprojector)
        .with_context(|| format!("Failed to read wells {}", args.wells.display()))?;
    let tracts = read_tracts_geojson(&args.tracts, reprojector)
        .with_context(|| format!("Failed to read tracts {}", args.tracts.display()))?;
    pb.finish_and_clear();
    info!("Input: {} wells, {} tracts", wells.len(), tracts.len());
    Ok((wells, tracts))
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let reprojector = TransverseMercator::wisconsin();

    match cli.command {
        Commands::Run { inputs, power } => {
            let config = effective_config(&inputs)?;
            let (wells, tracts) = read_inputs(&inputs, &reprojector)?;

            let start = Instant::now();
            let pb = spinner("Interpolating...")?;
            let output = run_once(
                &RunInput {
                    wells: &wells,
                    tracts: &tracts,
                    params: IdwParams::new(inputs.neighbors, power),
                    cell_size: inputs.cell_size,
                },
                &config,
                &config.cancel_token(),
            )
            .context("Analysis failed")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            let stats = output.grid.statistics();
            info!(
                "Grid: {} x {}, {} valid cells, nitrate {:.3}..{:.3} (mean {:.3})",
                output.grid.width(),
                output.grid.height(),
                stats.valid_count,
                stats.min.unwrap_or(f64::NAN),
                stats.max.unwrap_or(f64::NAN),
                stats.mean.unwrap_or(f64::NAN),
            );
            info!("Outcome units: {}", output.units.label());

            let summary = write_run_artifacts(&inputs.out, &output, &tracts, &reprojector)
                .context("Failed to write artifacts")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            done("Overlay", &summary.png, elapsed);
        }

        Commands::Sweep { inputs, powers } => {
            let config = effective_config(&inputs)?;
            let (wells, tracts) = read_inputs(&inputs, &reprojector)?;

            let start = Instant::now();
            let pb = spinner(&format!("Sweeping {} powers...", powers.len()))?;
            let rows = run_sweep(
                &SweepInput {
                    wells: &wells,
                    tracts: &tracts,
                    powers: &powers,
                    neighbors: inputs.neighbors,
                    cell_size: inputs.cell_size,
                },
                &config,
                &config.cancel_token(),
            )
            .context("Sweep failed")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            std::fs::create_dir_all(&inputs.out)
                .with_context(|| format!("Failed to create {}", inputs.out.display()))?;
            let path = inputs.out.join(sweep_file_name(inputs.neighbors, inputs.cell_size));
            write_sweep_table(&path, &rows).context("Failed to write sweep table")?;

            println!("{:>6} {:>4} {:>8} {:>10} {:>10}", "power", "n", "r2", "slope", "p_value");
            for row in &rows {
                match &row.result {
                    Ok(fit) => println!(
                        "{:>6.2} {:>4} {:>8.4} {:>10.4e} {:>10.3e}",
                        row.power, fit.n, fit.r_squared, fit.slope, fit.p_value
                    ),
                    Err(e) => warn!("power {}: {}", row.power, e),
                }
            }
            done("Sensitivity table", &path, elapsed);
        }

        Commands::Project { a, b, inverse } => {
            if inverse {
                let (lon, lat) = reprojector.to_geographic(a, b)?;
                println!("{:.8} {:.8}", lon, lat);
            } else {
                let (x, y) = reprojector.to_planar(a, b)?;
                println!("{:.3} {:.3}", x, y);
            }
        }

        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
