//! Ordinary kriging weights with negative-weight station elimination.
//!
//! For every grid cell the system
//!
//! ```text
//! [ ad(s1,s1) ... ad(s1,sn) 1 ] [ w1 ]   [ dgrid(s1) ]
//! [    ...    ...    ...    . ] [ .. ] = [    ...    ]
//! [ ad(sn,s1) ... ad(sn,sn) 1 ] [ wn ]   [ dgrid(sn) ]
//! [     1     ...     1     0 ] [ mu ]   [     1     ]
//! ```
//!
//! is solved over the active stations. While any active station carries a
//! negative weight, the highest of those stations is dropped and the system is
//! rebuilt from the remaining ones.

pub mod grid;
pub mod weights;

pub use grid::{
    CellFailure, CellFailurePolicy, GridSolveError, GridWeights, solve_kriging_grid,
    solve_kriging_grid_with_policy,
};
pub use weights::{
    KrigingError, WeightSolution, solve_kriging_weights, solve_kriging_weights_traced,
};
