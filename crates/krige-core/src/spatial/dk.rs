//! Detrended kriging over a fixed station network and grid.
//!
//! Station values are detrended against elevation, the residuals are
//! distributed with ordinary kriging weights, and the elevation trend is added
//! back at every grid cell. Weights depend only on which stations report a
//! value, so they are cached until that set changes.

use super::SpatialError;
use super::distance::{Location, grid_station_distances, station_distance_matrix};
use super::trend::{ElevationTrend, fit_elevation_trend};
use crate::config::KrigingConfig;
use crate::kriging::{CellFailurePolicy, GridWeights, solve_kriging_grid_with_policy};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct DetrendedEstimate {
    pub trend: ElevationTrend,
    /// One value per grid cell, in cell order.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
struct WeightCache {
    missing: Vec<bool>,
    weights: GridWeights,
}

#[derive(Debug, Clone)]
pub struct DetrendedKriging {
    stations: Vec<Location>,
    cells: Vec<Location>,
    config: KrigingConfig,
    cache: Option<WeightCache>,
    weight_solves: usize,
}

impl DetrendedKriging {
    pub fn new(stations: Vec<Location>, cells: Vec<Location>, config: KrigingConfig) -> Self {
        Self {
            stations,
            cells,
            config,
            cache: None,
            weight_solves: 0,
        }
    }

    pub fn stations(&self) -> &[Location] {
        &self.stations
    }

    pub fn cells(&self) -> &[Location] {
        &self.cells
    }

    pub fn config(&self) -> &KrigingConfig {
        &self.config
    }

    /// Number of times the grid weights have been solved.
    pub fn weight_solves(&self) -> usize {
        self.weight_solves
    }

    /// Weights from the most recent calculation, over reporting stations only.
    pub fn weights(&self) -> Option<&GridWeights> {
        self.cache.as_ref().map(|cache| &cache.weights)
    }

    /// Interpolates one set of station values. NaN marks a missing value.
    pub fn calculate(&mut self, values: &[f64]) -> Result<DetrendedEstimate, SpatialError> {
        if values.len() != self.stations.len() {
            return Err(SpatialError::LengthMismatch {
                name: "station values",
                expected: self.stations.len(),
                actual: values.len(),
            });
        }

        let missing: Vec<bool> = values.iter().map(|value| value.is_nan()).collect();
        let reporting: Vec<usize> = (0..values.len()).filter(|&i| !missing[i]).collect();
        if reporting.is_empty() {
            return Err(SpatialError::NoReportingStations);
        }

        let elevations: Vec<f64> = reporting.iter().map(|&i| self.stations[i].z).collect();
        let observed: Vec<f64> = reporting.iter().map(|&i| values[i]).collect();
        let trend = fit_elevation_trend(&elevations, &observed, self.config.trend_constraint)?;
        let residuals: Vec<f64> = elevations
            .iter()
            .zip(&observed)
            .map(|(&elevation, &value)| trend.detrend(elevation, value))
            .collect();

        let cache = match self.cache.take() {
            Some(cache) if cache.missing == missing => cache,
            _ => WeightCache {
                weights: self.solve_weights(&reporting)?,
                missing,
            },
        };
        let weights = &self.cache.insert(cache).weights;

        let sentinel = match self.config.cell_failure_policy {
            CellFailurePolicy::Substitute { sentinel } => sentinel,
            CellFailurePolicy::Abort => f64::NAN,
        };
        let values = self
            .cells
            .iter()
            .enumerate()
            .map(|(cell, location)| {
                if weights.is_failed(cell) {
                    return sentinel;
                }
                let residual: f64 = weights
                    .row(cell)
                    .iter()
                    .zip(&residuals)
                    .map(|(weight, residual)| weight * residual)
                    .sum();
                trend.retrend(location.z, residual)
            })
            .collect();

        Ok(DetrendedEstimate { trend, values })
    }

    fn solve_weights(&mut self, reporting: &[usize]) -> Result<GridWeights, SpatialError> {
        debug!(
            station_count = reporting.len(),
            cell_count = self.cells.len(),
            "recalculating detrended kriging weights"
        );

        let stations: Vec<Location> = reporting.iter().map(|&i| self.stations[i]).collect();
        let elevations: Vec<f64> = stations.iter().map(|station| station.z).collect();
        let ad = station_distance_matrix(&stations);
        let dgrid = grid_station_distances(&self.cells, &stations);

        let weights = solve_kriging_grid_with_policy(
            stations.len(),
            self.cells.len(),
            &ad,
            &dgrid,
            &elevations,
            self.config.worker_count,
            self.config.cell_failure_policy,
        )?;
        self.weight_solves += 1;

        Ok(weights)
    }
}
