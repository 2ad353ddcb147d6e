pub mod config;
pub mod domain;
pub mod kriging;
pub mod numerics;
pub mod spatial;

pub use config::{ConfigError, KrigingConfig, load_kriging_config};
pub use domain::{KrigeError, KrigeErrorCategory, KrigeResult};
pub use kriging::{
    CellFailure, CellFailurePolicy, GridSolveError, GridWeights, KrigingError, WeightSolution,
    solve_kriging_grid, solve_kriging_grid_with_policy, solve_kriging_weights,
    solve_kriging_weights_traced,
};
