use super::CliError;
use super::helpers::*;
use krige_core::config::{KrigingConfig, load_kriging_config};
use krige_core::domain::KrigeError;
use krige_core::kriging::{CellFailurePolicy, solve_kriging_grid_with_policy};
use krige_core::spatial::DetrendedKriging;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct WeightsArgs {
    /// Problem JSON with station distances, grid distances and elevations
    #[arg(long)]
    input: PathBuf,

    /// Report output path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Worker threads used for grid cells
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Fill failed cells with this value instead of aborting
    #[arg(long, allow_negative_numbers = true)]
    sentinel: Option<f64>,
}

impl WeightsArgs {
    fn failure_policy(&self) -> CellFailurePolicy {
        match self.sentinel {
            Some(sentinel) => CellFailurePolicy::Substitute { sentinel },
            None => CellFailurePolicy::Abort,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct InterpolateArgs {
    /// Dataset JSON with stations, grid cells and station values
    #[arg(long)]
    input: PathBuf,

    /// Kriging config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report output path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(super) fn run_weights_command(args: WeightsArgs) -> Result<i32, CliError> {
    let problem: WeightsProblem = read_json_input(&args.input)?;
    let problem = problem.flatten()?;

    let grid = solve_kriging_grid_with_policy(
        problem.station_count,
        problem.grid_count,
        &problem.ad,
        &problem.dgrid,
        &problem.elevations,
        args.workers,
        args.failure_policy(),
    )
    .map_err(KrigeError::from)?;

    info!(
        grid_count = grid.grid_count,
        failed = grid.failed_cells.len(),
        "solved kriging weights"
    );
    write_json_output(args.output.as_deref(), &WeightsReport::from(&grid))?;
    Ok(0)
}

pub(super) fn run_interpolate_command(args: InterpolateArgs) -> Result<i32, CliError> {
    let config = match &args.config {
        Some(path) => load_kriging_config(path).map_err(KrigeError::from)?,
        None => KrigingConfig::default(),
    };
    let dataset: Dataset = read_json_input(&args.input)?;
    let values = dataset.station_values();

    let mut dk = DetrendedKriging::new(dataset.stations, dataset.cells, config);
    let estimate = dk.calculate(&values).map_err(KrigeError::from)?;

    write_json_output(
        args.output.as_deref(),
        &InterpolateReport {
            trend: estimate.trend,
            values: estimate.values,
        },
    )?;
    Ok(0)
}
