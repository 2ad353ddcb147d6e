use krige_core::kriging::{
    CellFailurePolicy, GridSolveError, solve_kriging_grid, solve_kriging_grid_with_policy,
    solve_kriging_weights, solve_kriging_weights_traced,
};
use krige_core::spatial::{Location, grid_station_distances, station_distance_matrix};

const WEIGHT_TOL: f64 = 1.0e-12;

fn four_station_network() -> (Vec<f64>, Vec<f64>) {
    let stations = [
        Location::new(6.0, 6.0, 0.0),
        Location::new(0.0, 1.0, 0.0),
        Location::new(4.0, 4.0, 0.0),
        Location::new(3.0, 1.0, 0.0),
    ];
    let cell = [Location::new(1.0, 0.0, 0.0)];
    (
        station_distance_matrix(&stations),
        grid_station_distances(&cell, &stations),
    )
}

#[test]
fn highest_negative_station_is_removed_before_more_negative_one() {
    // Unpruned weights are [-0.0104, 0.6476, -0.0459, 0.4087].
    let (ad, dgrid) = four_station_network();

    let solution = solve_kriging_weights_traced(4, &ad, &dgrid, &[500.0, 100.0, 100.0, 100.0])
        .expect("weights");

    assert_eq!(solution.eliminated, vec![0, 2]);
    assert_eq!(solution.active_count(), 2);
    assert_weights_close(
        &solution.weights,
        &[0.0, 0.6369757358544492, 0.0, 0.36302426414555083],
    );
}

#[test]
fn elimination_order_follows_elevation() {
    let (ad, dgrid) = four_station_network();

    let raised = solve_kriging_weights_traced(4, &ad, &dgrid, &[100.0, 100.0, 500.0, 100.0])
        .expect("weights");
    assert_eq!(raised.eliminated, vec![2, 0]);

    let level = solve_kriging_weights_traced(4, &ad, &dgrid, &[100.0; 4]).expect("weights");
    assert_eq!(level.eliminated, vec![0, 2]);

    assert_weights_close(&raised.weights, &level.weights);
}

#[test]
fn stations_below_sea_level_are_still_pruned() {
    let (ad, dgrid) = four_station_network();

    let solution = solve_kriging_weights_traced(4, &ad, &dgrid, &[-50.0, -10.0, -20.0, -30.0])
        .expect("weights");

    assert_eq!(solution.eliminated, vec![2, 0]);
    assert!(solution.weights.iter().all(|weight| *weight >= 0.0));
}

#[test]
fn repeated_solves_are_bit_identical() {
    let (ad, dgrid) = four_station_network();
    let elevations = [500.0, 100.0, 100.0, 100.0];

    let first = solve_kriging_weights(4, &ad, &dgrid, &elevations).expect("first");
    let second = solve_kriging_weights(4, &ad, &dgrid, &elevations).expect("second");

    let first_bits: Vec<u64> = first.iter().map(|weight| weight.to_bits()).collect();
    let second_bits: Vec<u64> = second.iter().map(|weight| weight.to_bits()).collect();
    assert_eq!(first_bits, second_bits);
}

#[test]
fn cell_on_a_station_takes_that_station_value() {
    let stations = [
        Location::new(0.0, 0.0, 1000.0),
        Location::new(2.0, 0.0, 1100.0),
        Location::new(0.0, 3.0, 1200.0),
        Location::new(4.0, 5.0, 1300.0),
    ];
    let ad = station_distance_matrix(&stations);
    let dgrid = grid_station_distances(&[stations[2]], &stations);

    let weights = solve_kriging_weights(4, &ad, &dgrid, &[1000.0, 1100.0, 1200.0, 1300.0])
        .expect("weights");

    assert_weights_close(&weights, &[0.0, 0.0, 1.0, 0.0]);
}

#[test]
fn scattered_grid_weights_are_non_negative_and_unbiased() {
    let mut rng = Lcg::new(0x5eed);
    let stations: Vec<Location> = (0..9)
        .map(|index| {
            let (col, row) = ((index % 3) as f64, (index / 3) as f64);
            Location::new(
                col * 100.0 + rng.next_unit() * 60.0,
                row * 100.0 + rng.next_unit() * 60.0,
                1000.0 + rng.next_unit() * 2000.0,
            )
        })
        .collect();
    let cells: Vec<Location> = (0..64)
        .map(|_| Location::new(rng.next_unit() * 320.0 - 20.0, rng.next_unit() * 320.0 - 20.0, 0.0))
        .collect();
    let elevations: Vec<f64> = stations.iter().map(|station| station.z).collect();
    let ad = station_distance_matrix(&stations);
    let dgrid = grid_station_distances(&cells, &stations);

    for (cell, distances) in dgrid.chunks(9).enumerate() {
        let solution =
            solve_kriging_weights_traced(9, &ad, distances, &elevations).expect("cell weights");

        assert!(solution.iterations() <= 9, "cell {cell} iterated too long");
        assert!(
            solution.weights.iter().all(|weight| *weight >= 0.0),
            "cell {cell} kept a negative weight: {:?}",
            solution.weights
        );
        let total: f64 = solution.weights.iter().sum();
        assert!((total - 1.0).abs() < 1.0e-9, "cell {cell} sums to {total}");
        for &station in &solution.eliminated {
            assert_eq!(solution.weights[station], 0.0);
        }
    }

    let serial = solve_kriging_grid(9, 64, &ad, &dgrid, &elevations, 1).expect("serial");
    let parallel = solve_kriging_grid(9, 64, &ad, &dgrid, &elevations, 3).expect("parallel");
    assert_eq!(serial, parallel);
}

#[test]
fn single_failing_cell_is_identified_or_substituted() {
    let ad = [0.0, 5.0, 5.0, 0.0];
    let dgrid = [1.0, 4.0, 2.0, 3.0, 4.0, 1.0];
    let elevations = [100.0, 200.0];

    let healthy = solve_kriging_grid(2, 3, &ad, &dgrid, &elevations, 2).expect("healthy grid");
    assert_eq!(healthy.len(), 6);

    // Both stations at the same place: every cell is singular.
    let coincident = [0.0; 4];
    let error =
        solve_kriging_grid(2, 3, &coincident, &dgrid, &elevations, 2).expect_err("singular grid");
    assert!(matches!(error, GridSolveError::Cell(ref failure) if failure.cell == 0));

    let substituted = solve_kriging_grid_with_policy(
        2,
        3,
        &coincident,
        &dgrid,
        &elevations,
        2,
        CellFailurePolicy::Substitute {
            sentinel: f64::NAN,
        },
    )
    .expect("substituted grid");
    assert_eq!(substituted.failed_cells.len(), 3);
    assert!(substituted.weights.iter().all(|weight| weight.is_nan()));
}

fn assert_weights_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "weight count mismatch");
    for (index, (&actual_value, &expected_value)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (actual_value - expected_value).abs() <= WEIGHT_TOL,
            "weight {index} expected={expected_value:.15e} actual={actual_value:.15e}"
        );
    }
}

struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_unit(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}
