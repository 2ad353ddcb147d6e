pub mod linalg;

pub use linalg::{LuDecomposition, LuError, lu_factorize, lu_solve, solve_augmented};

use faer::Mat;

pub type DenseMatrix = Mat<f64>;
