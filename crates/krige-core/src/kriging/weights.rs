use crate::numerics::{DenseMatrix, LuError, solve_augmented};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KrigingError {
    #[error("station count must be positive")]
    NoStations,
    #[error("{name} has length {actual}, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{name} contains a non-finite value at index {index}")]
    NonFiniteInput { name: &'static str, index: usize },
    #[error("kriging system with {active_count} active stations is singular")]
    SingularSystem {
        active_count: usize,
        eliminated: Vec<usize>,
        #[source]
        source: LuError,
    },
    #[error("station elimination exhausted the active set (removed {eliminated:?})")]
    InsufficientStations { eliminated: Vec<usize> },
}

impl KrigingError {
    /// Active-station count at the point of failure, for solver failures.
    pub fn active_count(&self) -> Option<usize> {
        match self {
            Self::SingularSystem { active_count, .. } => Some(*active_count),
            Self::InsufficientStations { .. } => Some(0),
            _ => None,
        }
    }

    /// Stations removed before the failure, in removal order.
    pub fn eliminated(&self) -> &[usize] {
        match self {
            Self::SingularSystem { eliminated, .. } | Self::InsufficientStations { eliminated } => {
                eliminated
            }
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightSolution {
    /// One weight per station; zero for eliminated stations.
    pub weights: Vec<f64>,
    /// Stations removed for negative weights, in removal order.
    pub eliminated: Vec<usize>,
}

impl WeightSolution {
    pub fn active_count(&self) -> usize {
        self.weights.len() - self.eliminated.len()
    }

    pub fn iterations(&self) -> usize {
        self.eliminated.len() + 1
    }

    pub fn is_active(&self, station: usize) -> bool {
        !self.eliminated.contains(&station)
    }
}

/// Ordinary kriging weights for one grid cell.
///
/// `station_distance_matrix` is `station_count x station_count` row-major,
/// `grid_station_distances` holds the cell-to-station values. Weights are
/// non-negative and sum to one over the stations that survive elimination.
pub fn solve_kriging_weights(
    station_count: usize,
    station_distance_matrix: &[f64],
    grid_station_distances: &[f64],
    station_elevations: &[f64],
) -> Result<Vec<f64>, KrigingError> {
    solve_kriging_weights_traced(
        station_count,
        station_distance_matrix,
        grid_station_distances,
        station_elevations,
    )
    .map(|solution| solution.weights)
}

/// Same as [`solve_kriging_weights`], keeping the elimination trace.
pub fn solve_kriging_weights_traced(
    station_count: usize,
    station_distance_matrix: &[f64],
    grid_station_distances: &[f64],
    station_elevations: &[f64],
) -> Result<WeightSolution, KrigingError> {
    validate_station_inputs(station_count, station_distance_matrix, station_elevations)?;
    validate_values(
        "grid station distances",
        station_count,
        grid_station_distances,
    )?;

    solve_validated_cell(
        station_count,
        station_distance_matrix,
        grid_station_distances,
        station_elevations,
    )
}

pub(crate) fn validate_station_inputs(
    station_count: usize,
    station_distance_matrix: &[f64],
    station_elevations: &[f64],
) -> Result<(), KrigingError> {
    if station_count == 0 {
        return Err(KrigingError::NoStations);
    }
    validate_values(
        "station distance matrix",
        station_count * station_count,
        station_distance_matrix,
    )?;
    validate_values("station elevations", station_count, station_elevations)
}

pub(crate) fn validate_values(
    name: &'static str,
    expected: usize,
    values: &[f64],
) -> Result<(), KrigingError> {
    if values.len() != expected {
        return Err(KrigingError::LengthMismatch {
            name,
            expected,
            actual: values.len(),
        });
    }
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(KrigingError::NonFiniteInput { name, index }),
        None => Ok(()),
    }
}

pub(crate) fn solve_validated_cell(
    station_count: usize,
    station_distance_matrix: &[f64],
    grid_station_distances: &[f64],
    station_elevations: &[f64],
) -> Result<WeightSolution, KrigingError> {
    let mut active = vec![true; station_count];
    let mut eliminated = Vec::new();

    loop {
        let stations: Vec<usize> = (0..station_count).filter(|&m| active[m]).collect();
        if stations.is_empty() {
            return Err(KrigingError::InsufficientStations { eliminated });
        }

        let system = build_kriging_system(
            station_count,
            station_distance_matrix,
            grid_station_distances,
            &stations,
        );
        let solution =
            solve_augmented(system).map_err(|source| KrigingError::SingularSystem {
                active_count: stations.len(),
                eliminated: eliminated.clone(),
                source,
            })?;

        match select_station_to_remove(&stations, &solution, station_elevations) {
            Some(position) => {
                let station = stations[position];
                debug!(
                    station,
                    elevation = station_elevations[station],
                    weight = solution[position],
                    active_count = stations.len(),
                    "removing negative-weight station"
                );
                active[station] = false;
                eliminated.push(station);
            }
            None => {
                let mut weights = vec![0.0; station_count];
                for (position, &station) in stations.iter().enumerate() {
                    weights[station] = solution[position];
                }
                return Ok(WeightSolution {
                    weights,
                    eliminated,
                });
            }
        }
    }
}

/// Builds the `(ns + 1) x (ns + 2)` augmented ordinary kriging system for the
/// given active stations.
fn build_kriging_system(
    station_count: usize,
    station_distance_matrix: &[f64],
    grid_station_distances: &[f64],
    stations: &[usize],
) -> DenseMatrix {
    let ns = stations.len();
    let mut system = DenseMatrix::zeros(ns + 1, ns + 2);

    for (row, &m) in stations.iter().enumerate() {
        for (col, &n) in stations.iter().enumerate() {
            system[(row, col)] = station_distance_matrix[m * station_count + n];
        }
        system[(row, ns)] = 1.0;
        system[(ns, row)] = 1.0;
        system[(row, ns + 1)] = grid_station_distances[m];
    }
    system[(ns, ns)] = 0.0;
    system[(ns, ns + 1)] = 1.0;

    system
}

/// Position (within `stations`) of the highest-elevation station carrying a
/// negative weight. The first station found at the maximum elevation wins.
fn select_station_to_remove(
    stations: &[usize],
    solution: &[f64],
    station_elevations: &[f64],
) -> Option<usize> {
    let mut selected: Option<(usize, f64)> = None;
    for (position, &station) in stations.iter().enumerate() {
        if solution[position] >= 0.0 {
            continue;
        }
        let elevation = station_elevations[station];
        if selected.is_none_or(|(_, highest)| elevation > highest) {
            selected = Some((position, elevation));
        }
    }
    selected.map(|(position, _)| position)
}
