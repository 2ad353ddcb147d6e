use serde::{Deserialize, Serialize};

/// Planar position with an elevation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal distance; elevation does not contribute.
    pub fn planar_distance(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Row-major `n x n` station-to-station distances.
pub fn station_distance_matrix(stations: &[Location]) -> Vec<f64> {
    let count = stations.len();
    let mut distances = vec![0.0; count * count];

    for i in 0..count {
        for j in (i + 1)..count {
            let distance = stations[i].planar_distance(&stations[j]);
            distances[i * count + j] = distance;
            distances[j * count + i] = distance;
        }
    }

    distances
}

/// Row-major `cells x stations` distances, one row per grid cell.
pub fn grid_station_distances(cells: &[Location], stations: &[Location]) -> Vec<f64> {
    cells
        .iter()
        .flat_map(|cell| stations.iter().map(|station| cell.planar_distance(station)))
        .collect()
}
