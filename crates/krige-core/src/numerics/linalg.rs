use super::DenseMatrix;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LuError {
    #[error("LU decomposition requires a non-empty system")]
    EmptySystem,
    #[error("matrix must be square, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },
    #[error("augmented system with {rows} rows needs at least {required} columns, got {cols}")]
    MissingRightHandSide {
        rows: usize,
        cols: usize,
        required: usize,
    },
    #[error("matrix is singular at pivot index {pivot_index}")]
    SingularMatrix { pivot_index: usize },
    #[error("substitution produced a non-finite value in row {row}")]
    NonFiniteSolution { row: usize },
    #[error("right-hand side length mismatch: expected {expected}, got {actual}")]
    RhsLengthMismatch { expected: usize, actual: usize },
}

impl LuError {
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            Self::SingularMatrix { .. } | Self::NonFiniteSolution { .. }
        )
    }
}

/// Crout LU factors of an augmented system.
///
/// The leading `n x n` block holds the packed factors (unit lower triangle
/// below the diagonal, upper triangle on and above it). Appended columns are
/// left untouched by the decomposition; the row interchanges are replayed on
/// them during substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct LuDecomposition {
    lu: DenseMatrix,
    pivots: Vec<usize>,
    pivot_sign: i32,
}

impl LuDecomposition {
    pub fn dimension(&self) -> usize {
        self.lu.nrows()
    }

    pub fn rhs_count(&self) -> usize {
        self.lu.ncols() - self.dimension()
    }

    pub fn lu_matrix(&self) -> &DenseMatrix {
        &self.lu
    }

    /// Row interchanged with row `j` at step `j`, in elimination order.
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    pub fn pivot_sign(&self) -> i32 {
        self.pivot_sign
    }

    pub fn determinant(&self) -> f64 {
        (0..self.dimension()).fold(f64::from(self.pivot_sign), |product, index| {
            product * self.lu[(index, index)]
        })
    }

    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, LuError> {
        let dimension = self.dimension();
        if rhs.len() != dimension {
            return Err(LuError::RhsLengthMismatch {
                expected: dimension,
                actual: rhs.len(),
            });
        }

        let mut solution = rhs.to_vec();
        self.substitute(&mut solution)?;
        Ok(solution)
    }

    /// Solution for the first appended column.
    pub fn into_solution(self) -> Result<Vec<f64>, LuError> {
        let mut column = self.appended_column(0);
        self.substitute(&mut column)?;
        Ok(column)
    }

    /// Solutions for every appended column, one column per right-hand side.
    pub fn into_solutions(self) -> Result<DenseMatrix, LuError> {
        let dimension = self.dimension();
        let rhs_count = self.rhs_count();
        let mut solutions = DenseMatrix::zeros(dimension, rhs_count);

        for rhs_index in 0..rhs_count {
            let mut column = self.appended_column(rhs_index);
            self.substitute(&mut column)?;
            for (row, value) in column.into_iter().enumerate() {
                solutions[(row, rhs_index)] = value;
            }
        }

        Ok(solutions)
    }

    fn appended_column(&self, rhs_index: usize) -> Vec<f64> {
        let col = self.dimension() + rhs_index;
        (0..self.dimension()).map(|row| self.lu[(row, col)]).collect()
    }

    fn substitute(&self, values: &mut [f64]) -> Result<(), LuError> {
        let dimension = self.dimension();

        for row in 0..dimension {
            let pivot_row = self.pivots[row];
            let mut sum = values[pivot_row];
            values[pivot_row] = values[row];
            for col in 0..row {
                sum -= self.lu[(row, col)] * values[col];
            }
            values[row] = sum;
        }

        for row in (0..dimension).rev() {
            let mut sum = values[row];
            for col in (row + 1)..dimension {
                sum -= self.lu[(row, col)] * values[col];
            }
            let value = sum / self.lu[(row, row)];
            if !value.is_finite() {
                return Err(LuError::NonFiniteSolution { row });
            }
            values[row] = value;
        }

        Ok(())
    }
}

/// Factorizes the leading square block of an `n x (n + k)` augmented system
/// with implicitly scaled partial pivoting.
pub fn lu_factorize(system: DenseMatrix) -> Result<LuDecomposition, LuError> {
    let dimension = validate_augmented_shape(&system)?;
    let mut lu = system;
    let mut scale = implicit_row_scale(&lu, dimension)?;
    let mut pivots = vec![0; dimension];
    let mut pivot_sign = 1;

    for col in 0..dimension {
        for row in 0..col {
            let mut sum = lu[(row, col)];
            for k in 0..row {
                sum -= lu[(row, k)] * lu[(k, col)];
            }
            lu[(row, col)] = sum;
        }

        let mut largest = 0.0;
        let mut pivot_row = col;
        for row in col..dimension {
            let mut sum = lu[(row, col)];
            for k in 0..col {
                sum -= lu[(row, k)] * lu[(k, col)];
            }
            lu[(row, col)] = sum;

            let scaled = scale[row] * sum.abs();
            if scaled >= largest {
                largest = scaled;
                pivot_row = row;
            }
        }

        if pivot_row != col {
            swap_coefficient_rows(&mut lu, dimension, col, pivot_row);
            pivot_sign = -pivot_sign;
            scale[pivot_row] = scale[col];
        }
        pivots[col] = pivot_row;

        let pivot = lu[(col, col)];
        if pivot == 0.0 {
            return Err(LuError::SingularMatrix { pivot_index: col });
        }

        if col + 1 < dimension {
            let inverse = 1.0 / pivot;
            for row in (col + 1)..dimension {
                lu[(row, col)] *= inverse;
            }
        }
    }

    Ok(LuDecomposition {
        lu,
        pivots,
        pivot_sign,
    })
}

/// Solves an `n x (n + 1)` augmented system and returns the `n` unknowns.
pub fn solve_augmented(system: DenseMatrix) -> Result<Vec<f64>, LuError> {
    lu_factorize(system)?.into_solution()
}

pub fn lu_solve(matrix: &DenseMatrix, rhs: &[f64]) -> Result<Vec<f64>, LuError> {
    let rows = matrix.nrows();
    let cols = matrix.ncols();
    if rows == 0 {
        return Err(LuError::EmptySystem);
    }
    if rows != cols {
        return Err(LuError::NonSquareMatrix { rows, cols });
    }
    if rhs.len() != rows {
        return Err(LuError::RhsLengthMismatch {
            expected: rows,
            actual: rhs.len(),
        });
    }

    let mut system = DenseMatrix::zeros(rows, rows + 1);
    for row in 0..rows {
        for col in 0..rows {
            system[(row, col)] = matrix[(row, col)];
        }
        system[(row, rows)] = rhs[row];
    }

    solve_augmented(system)
}

fn validate_augmented_shape(system: &DenseMatrix) -> Result<usize, LuError> {
    let rows = system.nrows();
    let cols = system.ncols();
    if rows == 0 {
        return Err(LuError::EmptySystem);
    }
    if cols <= rows {
        return Err(LuError::MissingRightHandSide {
            rows,
            cols,
            required: rows + 1,
        });
    }

    Ok(rows)
}

fn implicit_row_scale(matrix: &DenseMatrix, dimension: usize) -> Result<Vec<f64>, LuError> {
    let mut scale = Vec::with_capacity(dimension);
    for row in 0..dimension {
        let mut largest: f64 = 0.0;
        for col in 0..dimension {
            largest = largest.max(matrix[(row, col)].abs());
        }
        if largest == 0.0 {
            return Err(LuError::SingularMatrix { pivot_index: row });
        }
        scale.push(1.0 / largest);
    }

    Ok(scale)
}

fn swap_coefficient_rows(matrix: &mut DenseMatrix, dimension: usize, lhs: usize, rhs: usize) {
    for col in 0..dimension {
        let value = matrix[(lhs, col)];
        matrix[(lhs, col)] = matrix[(rhs, col)];
        matrix[(rhs, col)] = value;
    }
}
