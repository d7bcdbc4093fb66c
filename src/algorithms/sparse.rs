use nalgebra::DMatrix;
use rayon::prelude::*;

/// Compressed sparse row matrix used for the encoder blocks and the
/// combined feature space.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            indptr: vec![0; n_rows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Builds from per-row `(column, value)` entries. Entries are sorted by
    /// column and explicit zeros dropped.
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>, n_cols: usize) -> Self {
        let n_rows = rows.len();
        let mut indptr = Vec::with_capacity(n_rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for mut row in rows {
            row.sort_by_key(|&(col, _)| col);
            for (col, value) in row {
                debug_assert!(col < n_cols);
                if value != 0.0 {
                    indices.push(col);
                    data.push(value);
                }
            }
            indptr.push(indices.len());
        }

        Self {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.indptr[i]..self.indptr[i + 1];
        self.indices[range.clone()]
            .iter()
            .copied()
            .zip(self.data[range].iter().copied())
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.row(i).find(|&(col, _)| col == j).map_or(0.0, |(_, v)| v)
    }

    pub fn row_sum(&self, i: usize) -> f64 {
        self.row(i).map(|(_, v)| v).sum()
    }

    pub fn scale(&mut self, factor: f64) {
        for value in &mut self.data {
            *value *= factor;
        }
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.n_rows, self.n_cols);
        for i in 0..self.n_rows {
            for (j, v) in self.row(i) {
                dense[(i, j)] = v;
            }
        }
        dense
    }

    /// Horizontal concatenation of blocks sharing the same row count.
    pub fn hstack(blocks: &[&CsrMatrix]) -> Self {
        let n_rows = blocks.first().map_or(0, |b| b.n_rows);
        debug_assert!(blocks.iter().all(|b| b.n_rows == n_rows));
        let n_cols = blocks.iter().map(|b| b.n_cols).sum();

        let rows = (0..n_rows)
            .map(|i| {
                let mut offset = 0;
                let mut row = Vec::new();
                for block in blocks {
                    row.extend(block.row(i).map(|(j, v)| (j + offset, v)));
                    offset += block.n_cols;
                }
                row
            })
            .collect();

        Self::from_rows(rows, n_cols)
    }

    /// `self * rhs` for a dense `n_cols x k` right-hand side.
    ///
    /// Each output column is filled from the matching contiguous column of `rhs`.
    pub fn mul_dense(&self, rhs: &DMatrix<f64>) -> DMatrix<f64> {
        assert_eq!(self.n_cols, rhs.nrows(), "dimension mismatch in sparse product");
        let mut out = DMatrix::zeros(self.n_rows, rhs.ncols());
        if self.n_rows == 0 || self.n_cols == 0 {
            return out;
        }

        out.as_mut_slice()
            .par_chunks_mut(self.n_rows)
            .zip(rhs.as_slice().par_chunks(self.n_cols))
            .for_each(|(out_col, rhs_col)| {
                for (i, acc) in out_col.iter_mut().enumerate() {
                    *acc = self.row(i).map(|(j, v)| v * rhs_col[j]).sum();
                }
            });
        out
    }

    /// `self^T * rhs` for a dense `n_rows x k` right-hand side.
    pub fn transpose_mul_dense(&self, rhs: &DMatrix<f64>) -> DMatrix<f64> {
        assert_eq!(self.n_rows, rhs.nrows(), "dimension mismatch in sparse product");
        let mut out = DMatrix::zeros(self.n_cols, rhs.ncols());
        if self.n_rows == 0 || self.n_cols == 0 {
            return out;
        }

        out.as_mut_slice()
            .par_chunks_mut(self.n_cols)
            .zip(rhs.as_slice().par_chunks(self.n_rows))
            .for_each(|(out_col, rhs_col)| {
                for (i, &x) in rhs_col.iter().enumerate() {
                    for (j, v) in self.row(i) {
                        out_col[j] += v * x;
                    }
                }
            });
        out
    }

    /// Population variance of every column, summed.
    pub fn total_variance(&self) -> f64 {
        if self.n_rows == 0 {
            return 0.0;
        }
        let mut sums = vec![0.0; self.n_cols];
        let mut squares = vec![0.0; self.n_cols];
        for (&j, &v) in self.indices.iter().zip(&self.data) {
            sums[j] += v;
            squares[j] += v * v;
        }
        let n = self.n_rows as f64;
        sums.iter()
            .zip(&squares)
            .map(|(s, sq)| (sq / n - (s / n).powi(2)).max(0.0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix {
        CsrMatrix::from_rows(vec![vec![(2, 3.0), (0, 1.0)], vec![], vec![(1, 2.0), (2, 0.0)]], 3)
    }

    #[test]
    fn test_from_rows_sorts_and_drops_zeros() {
        let m = sample();
        assert_eq!(m.shape(), (3, 3));
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(0, 1.0), (2, 3.0)]);
        assert_eq!(m.get(2, 1), 2.0);
        assert_eq!(m.get(1, 1), 0.0);
    }

    #[test]
    fn test_hstack() {
        let a = sample();
        let b = CsrMatrix::from_rows(vec![vec![(0, 5.0)], vec![(1, 6.0)], vec![]], 2);
        let c = CsrMatrix::hstack(&[&a, &b]);
        assert_eq!(c.shape(), (3, 5));
        assert_eq!(c.get(0, 3), 5.0);
        assert_eq!(c.get(1, 4), 6.0);
        assert_eq!(c.row_sum(0), 9.0);
    }

    #[test]
    fn test_products_match_dense() {
        let m = sample();
        let dense = m.to_dense();
        let rhs = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.mul_dense(&rhs), &dense * &rhs);

        let lhs = DMatrix::from_row_slice(3, 2, &[1.0, 0.5, 2.0, 1.0, 0.0, 3.0]);
        assert_eq!(m.transpose_mul_dense(&lhs), dense.transpose() * &lhs);
    }

    #[test]
    fn test_products_match_dense_on_wide_matrix() {
        let rows = (0..7)
            .map(|i| {
                (0..11)
                    .filter(|j| (i * 3 + j) % 4 == 0)
                    .map(|j| (j, (i + 1) as f64 * 0.5 - j as f64 * 0.25))
                    .collect()
            })
            .collect();
        let m = CsrMatrix::from_rows(rows, 11);
        let dense = m.to_dense();

        let rhs = DMatrix::from_fn(11, 5, |r, c| (r * 5 + c) as f64 * 0.1 - 2.0);
        let product = m.mul_dense(&rhs);
        assert_eq!(product.shape(), (7, 5));
        assert!((product - &dense * &rhs).abs().max() < 1e-12);

        let lhs = DMatrix::from_fn(7, 3, |r, c| (r as f64 - c as f64) * 0.3);
        let product = m.transpose_mul_dense(&lhs);
        assert_eq!(product.shape(), (11, 3));
        assert!((product - dense.transpose() * &lhs).abs().max() < 1e-12);
    }

    #[test]
    fn test_products_with_empty_dimensions() {
        let m = CsrMatrix::from_rows(Vec::new(), 4);
        assert_eq!(m.mul_dense(&DMatrix::zeros(4, 2)).shape(), (0, 2));
        assert_eq!(m.transpose_mul_dense(&DMatrix::zeros(0, 2)), DMatrix::<f64>::zeros(4, 2));
    }

    #[test]
    fn test_total_variance() {
        let m = CsrMatrix::from_rows(vec![vec![(0, 1.0)], vec![(0, 3.0)]], 2);
        assert!((m.total_variance() - 1.0).abs() < 1e-12);
    }
}
