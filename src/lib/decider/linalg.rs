use num::{BigRational, One, Zero};

/// A dense matrix over the rationals. All arithmetic is exact; the decision
/// procedure depends on comparing null space bases for equality across
/// rounds, which floating point could not support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalMatrix {
    rows: Vec<Vec<BigRational>>,
    cols: usize,
}

impl RationalMatrix {
    pub fn new(cols: usize) -> Self {
        RationalMatrix { rows: vec![], cols }
    }

    pub fn from_rows(rows: Vec<Vec<BigRational>>, cols: usize) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == cols));
        RationalMatrix { rows, cols }
    }

    pub fn push_row(&mut self, row: Vec<BigRational>) {
        debug_assert_eq!(row.len(), self.cols);
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Brings the matrix into reduced row echelon form in place and returns
    /// the pivot columns in increasing order. The form is unique, so equal
    /// row spaces reduce to equal matrices.
    pub fn reduce(&mut self) -> Vec<usize> {
        let mut pivots = Vec::new();
        let mut pivot_row = 0;

        for col in 0..self.cols {
            let Some(nonzero) = (pivot_row..self.rows.len()).find(|&r| !self.rows[r][col].is_zero())
            else {
                continue;
            };

            self.rows.swap(pivot_row, nonzero);

            let inverse = self.rows[pivot_row][col].recip();
            for entry in &mut self.rows[pivot_row] {
                *entry *= &inverse;
            }

            for r in 0..self.rows.len() {
                if r != pivot_row && !self.rows[r][col].is_zero() {
                    let factor = self.rows[r][col].clone();
                    for c in 0..self.cols {
                        let delta = &factor * &self.rows[pivot_row][c];
                        self.rows[r][c] -= delta;
                    }
                }
            }

            pivots.push(col);
            pivot_row += 1;
            if pivot_row == self.rows.len() {
                break;
            }
        }

        self.rows.truncate(pivot_row);
        pivots
    }

    /// The canonical basis of the right null space, one vector per free
    /// column in increasing column order. A vector for free column `f` has a
    /// one at position `f` and the negated reduced entries at the pivot
    /// positions. Uniqueness of the reduced form makes this basis canonical:
    /// two matrices have the same null space iff these bases are equal.
    pub fn null_space(mut self) -> Vec<Vec<BigRational>> {
        let pivots = self.reduce();

        let mut is_pivot = vec![false; self.cols];
        for &p in &pivots {
            is_pivot[p] = true;
        }

        let mut basis = Vec::with_capacity(self.cols - pivots.len());
        for free in (0..self.cols).filter(|&c| !is_pivot[c]) {
            let mut vector = vec![BigRational::zero(); self.cols];
            vector[free] = BigRational::one();
            for (row, &pivot) in pivots.iter().enumerate() {
                vector[pivot] = -self.rows[row][free].clone();
            }
            basis.push(vector);
        }

        basis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    fn row(entries: &[i64]) -> Vec<BigRational> {
        entries.iter().map(|&n| rat(n)).collect()
    }

    #[test]
    fn reduce_identifies_pivots() {
        let mut m = RationalMatrix::from_rows(vec![row(&[2, 4]), row(&[1, 2])], 2);
        let pivots = m.reduce();
        assert_eq!(pivots, vec![0]);
        assert_eq!(m.rows, vec![row(&[1, 2])]);
    }

    #[test]
    fn full_rank_matrix_has_trivial_null_space() {
        let m = RationalMatrix::from_rows(vec![row(&[1, 0]), row(&[0, 1])], 2);
        assert!(m.null_space().is_empty());
    }

    #[test]
    fn null_space_of_difference_constraint() {
        // x0 - x1 = 0 has the null space spanned by (1, 1)
        let m = RationalMatrix::from_rows(vec![row(&[1, -1])], 1 + 1);
        assert_eq!(m.null_space(), vec![row(&[1, 1])]);
    }

    #[test]
    fn null_space_basis_is_canonical() {
        // two row-equivalent matrices reduce to the same basis
        let a = RationalMatrix::from_rows(vec![row(&[1, 2, 3]), row(&[2, 4, 6])], 3);
        let b = RationalMatrix::from_rows(vec![row(&[3, 6, 9])], 3);
        assert_eq!(a.null_space(), b.null_space());
    }

    #[test]
    fn null_space_with_rational_entries() {
        // x0 + 2 x1 + 3 x2 = 0, x1 - x2 = 0
        let m = RationalMatrix::from_rows(vec![row(&[1, 2, 3]), row(&[0, 1, -1])], 3);
        assert_eq!(m.null_space(), vec![row(&[-5, 1, 1])]);
    }

    #[test]
    fn empty_matrix_has_full_null_space() {
        let m = RationalMatrix::new(2);
        assert_eq!(m.null_space(), vec![row(&[1, 0]), row(&[0, 1])]);
    }
}
