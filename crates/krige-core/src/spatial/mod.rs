pub mod distance;
pub mod dk;
pub mod trend;

pub use distance::{Location, grid_station_distances, station_distance_matrix};
pub use dk::{DetrendedEstimate, DetrendedKriging};
pub use trend::{ElevationTrend, TrendConstraint, fit_elevation_trend};

use crate::kriging::GridSolveError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpatialError {
    #[error("{name} has length {actual}, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error(
        "elevation trend needs at least two stations with distinct elevations, got {station_count} station(s)"
    )]
    DegenerateTrend { station_count: usize },
    #[error("no station reports a value")]
    NoReportingStations,
    #[error(transparent)]
    Grid(#[from] GridSolveError),
}
