use super::CliError;
use anyhow::Context;
use krige_core::domain::KrigeError;
use krige_core::kriging::GridWeights;
use krige_core::spatial::{ElevationTrend, Location};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WeightsProblem {
    pub(super) station_distances: Vec<Vec<f64>>,
    pub(super) grid_distances: Vec<Vec<f64>>,
    pub(super) elevations: Vec<f64>,
}

/// Row-major buffers ready for the grid solver.
pub(super) struct FlatProblem {
    pub(super) station_count: usize,
    pub(super) grid_count: usize,
    pub(super) ad: Vec<f64>,
    pub(super) dgrid: Vec<f64>,
    pub(super) elevations: Vec<f64>,
}

impl WeightsProblem {
    pub(super) fn flatten(self) -> Result<FlatProblem, CliError> {
        let station_count = self.station_distances.len();
        let grid_count = self.grid_distances.len();

        let ad = flatten_rows("stationDistances", self.station_distances, station_count)?;
        let dgrid = flatten_rows("gridDistances", self.grid_distances, station_count)?;

        Ok(FlatProblem {
            station_count,
            grid_count,
            ad,
            dgrid,
            elevations: self.elevations,
        })
    }
}

fn flatten_rows(name: &str, rows: Vec<Vec<f64>>, width: usize) -> Result<Vec<f64>, CliError> {
    let mut flat = Vec::with_capacity(rows.len() * width);
    for (index, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(CliError::Compute(KrigeError::input_validation(
                "INPUT.ARRAY_LENGTH",
                format!(
                    "{name} row {index} has {} entries, expected {width}",
                    row.len()
                ),
            )));
        }
        flat.extend(row);
    }
    Ok(flat)
}

#[derive(Debug, Deserialize)]
pub(super) struct Dataset {
    pub(super) stations: Vec<Location>,
    pub(super) cells: Vec<Location>,
    /// `null` marks a station without a measurement.
    pub(super) values: Vec<Option<f64>>,
}

impl Dataset {
    pub(super) fn station_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|value| value.unwrap_or(f64::NAN))
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WeightsReport {
    pub(super) station_count: usize,
    pub(super) grid_count: usize,
    pub(super) weights: Vec<Vec<f64>>,
    pub(super) failed_cells: Vec<usize>,
}

impl From<&GridWeights> for WeightsReport {
    fn from(grid: &GridWeights) -> Self {
        Self {
            station_count: grid.station_count,
            grid_count: grid.grid_count,
            weights: grid.rows().map(<[f64]>::to_vec).collect(),
            failed_cells: grid.failed_cells.iter().map(|failure| failure.cell).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct InterpolateReport {
    pub(super) trend: ElevationTrend,
    pub(super) values: Vec<f64>,
}

pub(super) fn read_json_input<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read input '{}'", path.display()))?;
    serde_json::from_str(&source).map_err(|source| {
        CliError::Compute(KrigeError::input_validation(
            "INPUT.JSON_PARSE",
            format!("failed to parse input '{}': {source}", path.display()),
        ))
    })
}

pub(super) fn write_json_output<T: Serialize>(
    output: Option<&Path>,
    report: &T,
) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(report).context("failed to serialize JSON report")?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })?;
            }
            fs::write(path, rendered + "\n")
                .with_context(|| format!("failed to write output '{}'", path.display()))?;
            info!(path = %path.display(), "wrote JSON report");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
