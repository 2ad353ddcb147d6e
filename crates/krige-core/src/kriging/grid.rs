use super::weights::{
    KrigingError, solve_validated_cell, validate_station_inputs, validate_values,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info_span, warn};

/// What the dispatcher does when a single cell cannot be solved.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum CellFailurePolicy {
    /// Fail the whole grid call with the lowest failing cell index.
    #[default]
    Abort,
    /// Fill the failed cell's row with `sentinel` and keep going.
    Substitute { sentinel: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("grid cell {cell} failed with {active_count} active stations")]
pub struct CellFailure {
    pub cell: usize,
    pub active_count: usize,
    #[source]
    pub source: KrigingError,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridSolveError {
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error(transparent)]
    InvalidInput(KrigingError),
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
    #[error(transparent)]
    Cell(#[from] CellFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridWeights {
    pub station_count: usize,
    pub grid_count: usize,
    /// Row-major `grid_count x station_count` weights.
    pub weights: Vec<f64>,
    /// Cells replaced by the sentinel, ordered by cell index.
    pub failed_cells: Vec<CellFailure>,
}

impl GridWeights {
    pub fn row(&self, cell: usize) -> &[f64] {
        let start = cell * self.station_count;
        &self.weights[start..start + self.station_count]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.weights.chunks(self.station_count)
    }

    pub fn is_failed(&self, cell: usize) -> bool {
        self.failed_cells
            .binary_search_by_key(&cell, |failure| failure.cell)
            .is_ok()
    }
}

/// Kriging weights for every grid cell, aborting on the first failing cell.
///
/// Returns the flattened `grid_count x station_count` weight array.
pub fn solve_kriging_grid(
    station_count: usize,
    grid_count: usize,
    station_distance_matrix: &[f64],
    grid_station_distances: &[f64],
    station_elevations: &[f64],
    worker_count: usize,
) -> Result<Vec<f64>, GridSolveError> {
    solve_kriging_grid_with_policy(
        station_count,
        grid_count,
        station_distance_matrix,
        grid_station_distances,
        station_elevations,
        worker_count,
        CellFailurePolicy::Abort,
    )
    .map(|grid| grid.weights)
}

pub fn solve_kriging_grid_with_policy(
    station_count: usize,
    grid_count: usize,
    station_distance_matrix: &[f64],
    grid_station_distances: &[f64],
    station_elevations: &[f64],
    worker_count: usize,
    policy: CellFailurePolicy,
) -> Result<GridWeights, GridSolveError> {
    if worker_count == 0 {
        return Err(GridSolveError::NoWorkers);
    }
    validate_station_inputs(station_count, station_distance_matrix, station_elevations)
        .map_err(GridSolveError::InvalidInput)?;
    validate_values(
        "grid station distances",
        grid_count * station_count,
        grid_station_distances,
    )
    .map_err(GridSolveError::InvalidInput)?;

    let span = info_span!("kriging_grid", station_count, grid_count, worker_count);
    let _guard = span.enter();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .build()
        .map_err(|error| GridSolveError::WorkerPool(error.to_string()))?;

    let mut weights = vec![0.0; grid_count * station_count];
    let mut failed_cells: Vec<CellFailure> = pool.install(|| {
        weights
            .par_chunks_mut(station_count)
            .zip(grid_station_distances.par_chunks(station_count))
            .enumerate()
            .filter_map(|(cell, (row, distances))| {
                match solve_validated_cell(
                    station_count,
                    station_distance_matrix,
                    distances,
                    station_elevations,
                ) {
                    Ok(solution) => {
                        row.copy_from_slice(&solution.weights);
                        None
                    }
                    Err(source) => Some(CellFailure {
                        cell,
                        active_count: source.active_count().unwrap_or(station_count),
                        source,
                    }),
                }
            })
            .collect()
    });
    failed_cells.sort_by_key(|failure| failure.cell);

    match policy {
        CellFailurePolicy::Abort => {
            if !failed_cells.is_empty() {
                return Err(GridSolveError::Cell(failed_cells.swap_remove(0)));
            }
        }
        CellFailurePolicy::Substitute { sentinel } => {
            for failure in &failed_cells {
                warn!(
                    cell = failure.cell,
                    active_count = failure.active_count,
                    error = %failure.source,
                    "substituting sentinel weights for failed cell"
                );
                let start = failure.cell * station_count;
                weights[start..start + station_count].fill(sentinel);
            }
        }
    }

    Ok(GridWeights {
        station_count,
        grid_count,
        weights,
        failed_cells,
    })
}

#[cfg(test)]
mod tests {
    use super::{CellFailurePolicy, GridSolveError, solve_kriging_grid, solve_kriging_grid_with_policy};
    use crate::kriging::KrigingError;

    const AD_3: [f64; 9] = [0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0];
    const ELEVATIONS_3: [f64; 3] = [100.0, 200.0, 50.0];

    #[test]
    fn identical_cells_produce_identical_rows_for_any_worker_count() {
        let dgrid: Vec<f64> = [0.5, 0.5, 1.5].repeat(4);

        let serial = solve_kriging_grid(3, 4, &AD_3, &dgrid, &ELEVATIONS_3, 1).expect("serial");
        let parallel = solve_kriging_grid(3, 4, &AD_3, &dgrid, &ELEVATIONS_3, 4).expect("parallel");

        assert_eq!(serial.len(), 12);
        assert_eq!(serial, parallel);
        for row in serial.chunks(3) {
            assert_eq!(row, &serial[..3]);
        }
    }

    #[test]
    fn empty_grid_returns_empty_weights() {
        let weights = solve_kriging_grid(3, 0, &AD_3, &[], &ELEVATIONS_3, 2).expect("empty");
        assert!(weights.is_empty());
    }

    #[test]
    fn rejects_zero_workers_and_bad_lengths() {
        assert_eq!(
            solve_kriging_grid(3, 1, &AD_3, &[0.5, 0.5, 1.5], &ELEVATIONS_3, 0)
                .expect_err("no workers"),
            GridSolveError::NoWorkers
        );
        assert_eq!(
            solve_kriging_grid(3, 2, &AD_3, &[0.5, 0.5, 1.5], &ELEVATIONS_3, 1)
                .expect_err("short grid"),
            GridSolveError::InvalidInput(KrigingError::LengthMismatch {
                name: "grid station distances",
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn abort_policy_reports_lowest_failing_cell() {
        // Stations 0 and 1 coincide, so every cell is singular.
        let ad = [0.0, 0.0, 0.0, 0.0];
        let dgrid = [1.0, 1.0, 2.0, 2.0, 3.0, 3.0];

        let error = solve_kriging_grid(2, 3, &ad, &dgrid, &[10.0, 20.0], 3).expect_err("singular");
        let GridSolveError::Cell(failure) = error else {
            panic!("expected cell failure, got {error:?}");
        };
        assert_eq!(failure.cell, 0);
        assert_eq!(failure.active_count, 2);
    }

    #[test]
    fn substitute_policy_fills_failed_rows_with_sentinel() {
        let ad = [0.0, 0.0, 0.0, 0.0];
        let dgrid = [1.0, 1.0, 2.0, 2.0];

        let grid = solve_kriging_grid_with_policy(
            2,
            2,
            &ad,
            &dgrid,
            &[10.0, 20.0],
            2,
            CellFailurePolicy::Substitute { sentinel: -9999.0 },
        )
        .expect("substituted grid");

        assert_eq!(grid.weights, vec![-9999.0; 4]);
        assert_eq!(
            grid.failed_cells
                .iter()
                .map(|failure| failure.cell)
                .collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert!(grid.is_failed(1));
        assert_eq!(grid.row(1), &[-9999.0, -9999.0]);
    }

    #[test]
    fn failure_policy_round_trips_through_json() {
        let policy: CellFailurePolicy =
            serde_json::from_str(r#"{ "mode": "substitute", "sentinel": -1.0 }"#).expect("policy");
        assert_eq!(policy, CellFailurePolicy::Substitute { sentinel: -1.0 });

        let abort: CellFailurePolicy = serde_json::from_str(r#"{ "mode": "abort" }"#).expect("abort");
        assert_eq!(abort, CellFailurePolicy::Abort);
    }
}
