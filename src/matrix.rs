//! Matrices over the expression field.
//!
//! Determinants can be computed three ways - fraction-free Gaussian
//! elimination (Bareiss), Laplace cofactor expansion, or the Leibniz
//! permutation sum - selectable through [`DetAlgo`]; `Auto` picks by a
//! sparsity heuristic. All three agree up to `normal`.

use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};

/// Determinant algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetAlgo {
    /// Sparsity heuristic: Laplace for small or mostly-zero matrices,
    /// elimination otherwise.
    #[default]
    Auto,
    /// Fraction-free Gaussian elimination (Bareiss). Requires polynomial
    /// entries; falls back to Laplace when an exact division fails.
    GaussElim,
    /// Recursive cofactor expansion along the first column.
    Laplace,
    /// Leibniz permutation sum.
    PermSum,
}

/// A dense row-major matrix of expressions.
#[derive(Debug, Clone)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    elems: Vec<Ex>,
}

impl Matrix {
    /// A zero matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            elems: vec![Ex::zero(); rows * cols],
        }
    }

    /// The identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::new(n, n);
        for i in 0..n {
            m.elems[i * n + i] = Ex::one();
        }
        m
    }

    /// Build from rows.
    ///
    /// # Errors
    /// `InvalidArgument` on ragged or empty input.
    pub fn from_rows(rows: Vec<Vec<Ex>>) -> Result<Self, KernelError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if nrows == 0 || ncols == 0 {
            return Err(KernelError::invalid_argument("empty matrix"));
        }
        if rows.iter().any(|r| r.len() != ncols) {
            return Err(KernelError::invalid_argument("ragged matrix rows"));
        }
        Ok(Matrix {
            rows: nrows,
            cols: ncols,
            elems: rows.into_iter().flatten().collect(),
        })
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, elems: Vec<Ex>) -> Self {
        debug_assert_eq!(rows * cols, elems.len());
        Matrix { rows, cols, elems }
    }

    /// Row count.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major element slice.
    pub fn elems(&self) -> &[Ex] {
        &self.elems
    }

    /// Element access.
    ///
    /// # Errors
    /// `Range` if the indices are out of bounds.
    pub fn get(&self, r: usize, c: usize) -> Result<&Ex, KernelError> {
        if r >= self.rows || c >= self.cols {
            return Err(KernelError::range(format!(
                "matrix index ({r},{c}) out of bounds for {}x{}",
                self.rows, self.cols
            )));
        }
        Ok(&self.elems[r * self.cols + c])
    }

    /// A copy with one element replaced.
    ///
    /// # Errors
    /// `Range` if the indices are out of bounds.
    pub fn with(&self, r: usize, c: usize, e: Ex) -> Result<Matrix, KernelError> {
        if r >= self.rows || c >= self.cols {
            return Err(KernelError::range(format!(
                "matrix index ({r},{c}) out of bounds for {}x{}",
                self.rows, self.cols
            )));
        }
        let mut m = self.clone();
        m.elems[r * self.cols + c] = e;
        Ok(m)
    }

    /// Transpose.
    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::new(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.elems[c * self.rows + r] = self.elems[r * self.cols + c].clone();
            }
        }
        out
    }

    /// Elementwise sum.
    ///
    /// # Errors
    /// `InvalidArgument` on dimension mismatch.
    pub fn add(&self, other: &Matrix) -> Result<Matrix, KernelError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(KernelError::invalid_argument("matrix dimension mismatch in add"));
        }
        let elems = self
            .elems
            .iter()
            .zip(other.elems.iter())
            .map(|(a, b)| a + b)
            .collect();
        Ok(Matrix::from_parts(self.rows, self.cols, elems))
    }

    /// Matrix product.
    ///
    /// # Errors
    /// `InvalidArgument` on dimension mismatch.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix, KernelError> {
        if self.cols != other.rows {
            return Err(KernelError::invalid_argument("matrix dimension mismatch in mul"));
        }
        let mut out = Matrix::new(self.rows, other.cols);
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut parts = Vec::with_capacity(self.cols);
                for k in 0..self.cols {
                    parts.push(&self.elems[r * self.cols + k] * &other.elems[k * other.cols + c]);
                }
                out.elems[r * other.cols + c] = crate::algebra::add_many(parts);
            }
        }
        Ok(out)
    }

    /// Scalar multiple.
    pub fn scale(&self, s: &Ex) -> Matrix {
        let elems = self.elems.iter().map(|e| e * s).collect();
        Matrix::from_parts(self.rows, self.cols, elems)
    }

    // -------------------------------------------------------------------------
    // Determinant
    // -------------------------------------------------------------------------

    /// Determinant of a square matrix.
    ///
    /// # Errors
    /// `Domain` if the matrix is not square.
    pub fn determinant(&self, algo: DetAlgo) -> Result<Ex, KernelError> {
        if self.rows != self.cols {
            return Err(KernelError::domain("determinant of a non-square matrix"));
        }
        match algo {
            DetAlgo::Laplace => Ok(self.det_laplace()),
            DetAlgo::PermSum => Ok(self.det_perm_sum()),
            DetAlgo::GaussElim => Ok(self
                .det_bareiss()
                .unwrap_or_else(|| self.det_laplace())),
            DetAlgo::Auto => {
                let n = self.rows;
                let zeros = self.elems.iter().filter(|e| e.is_zero()).count();
                if n <= 3 || 2 * zeros >= n * n {
                    Ok(self.det_laplace())
                } else {
                    Ok(self.det_bareiss().unwrap_or_else(|| self.det_laplace()))
                }
            }
        }
    }

    fn minor(&self, skip_row: usize, skip_col: usize) -> Matrix {
        let mut elems = Vec::with_capacity((self.rows - 1) * (self.cols - 1));
        for r in 0..self.rows {
            if r == skip_row {
                continue;
            }
            for c in 0..self.cols {
                if c == skip_col {
                    continue;
                }
                elems.push(self.elems[r * self.cols + c].clone());
            }
        }
        Matrix::from_parts(self.rows - 1, self.cols - 1, elems)
    }

    fn det_laplace(&self) -> Ex {
        let n = self.rows;
        if n == 1 {
            return self.elems[0].clone();
        }
        let mut parts = Vec::with_capacity(n);
        for r in 0..n {
            let a = &self.elems[r * n];
            if a.is_zero() {
                continue;
            }
            let cofactor = self.minor(r, 0).det_laplace();
            let term = a * cofactor;
            parts.push(if r % 2 == 0 { term } else { -term });
        }
        crate::algebra::add_many(parts)
    }

    fn det_perm_sum(&self) -> Ex {
        let n = self.rows;
        let mut cols: Vec<usize> = (0..n).collect();
        let mut parts = Vec::new();
        perm_sum_rec(self, 0, &mut cols, true, &mut parts);
        crate::algebra::add_many(parts)
    }

    // Fraction-free elimination; None when an intermediate exact division
    // fails (non-polynomial entries).
    fn det_bareiss(&self) -> Option<Ex> {
        let n = self.rows;
        let mut m: Vec<Ex> = self.elems.iter().map(Ex::expand).collect();
        let mut sign = false;
        let mut prev = Ex::one();
        for k in 0..n.saturating_sub(1) {
            let Some(pivot_row) = (k..n).find(|&r| !m[r * n + k].is_zero()) else {
                return Some(Ex::zero());
            };
            if pivot_row != k {
                for c in 0..n {
                    m.swap(pivot_row * n + c, k * n + c);
                }
                sign = !sign;
            }
            for i in (k + 1)..n {
                for j in (k + 1)..n {
                    let num = (&m[i * n + j] * &m[k * n + k]
                        - &m[i * n + k] * &m[k * n + j])
                        .expand();
                    m[i * n + j] = crate::poly::divide(&num, &prev).ok()??;
                }
            }
            for i in (k + 1)..n {
                m[i * n + k] = Ex::zero();
            }
            prev = m[k * n + k].clone();
        }
        let det = m[(n - 1) * n + (n - 1)].clone();
        Some(if sign { -det } else { det })
    }

    // -------------------------------------------------------------------------
    // Inverse / solve
    // -------------------------------------------------------------------------

    /// Inverse of a square matrix by Gauss-Jordan elimination over the
    /// expression field, with `normal`-reduced entries.
    ///
    /// # Errors
    /// `Domain` if non-square, `Runtime` if singular.
    pub fn inverse(&self) -> Result<Matrix, KernelError> {
        if self.rows != self.cols {
            return Err(KernelError::domain("inverse of a non-square matrix"));
        }
        self.solve(&Matrix::identity(self.rows))
    }

    /// Solve `self * X = rhs` for `X`.
    ///
    /// # Errors
    /// `Domain` on shape mismatch, `Runtime` if the matrix is singular.
    pub fn solve(&self, rhs: &Matrix) -> Result<Matrix, KernelError> {
        if self.rows != self.cols {
            return Err(KernelError::domain("solve with a non-square matrix"));
        }
        if rhs.rows != self.rows {
            return Err(KernelError::domain("right-hand side row count mismatch"));
        }
        let n = self.rows;
        let w = rhs.cols;
        let mut a: Vec<Ex> = self.elems.clone();
        let mut b: Vec<Ex> = rhs.elems.clone();

        for k in 0..n {
            // Pivot search with a zero test through normal, so symbolic
            // cancellations do not masquerade as usable pivots.
            let mut pivot = None;
            for r in k..n {
                if !a[r * n + k].normal()?.is_zero() {
                    pivot = Some(r);
                    break;
                }
            }
            let Some(p) = pivot else {
                return Err(KernelError::runtime("matrix is singular"));
            };
            if p != k {
                for c in 0..n {
                    a.swap(p * n + c, k * n + c);
                }
                for c in 0..w {
                    b.swap(p * w + c, k * w + c);
                }
            }
            let pivot_val = a[k * n + k].clone();
            for c in 0..n {
                a[k * n + c] = a[k * n + c].try_div(&pivot_val)?.normal()?;
            }
            for c in 0..w {
                b[k * w + c] = b[k * w + c].try_div(&pivot_val)?.normal()?;
            }
            for r in 0..n {
                if r == k {
                    continue;
                }
                let factor = a[r * n + k].clone();
                if factor.is_zero() {
                    continue;
                }
                for c in 0..n {
                    a[r * n + c] =
                        (&a[r * n + c] - &(&factor * &a[k * n + c])).normal()?;
                }
                for c in 0..w {
                    b[r * w + c] =
                        (&b[r * w + c] - &(&factor * &b[k * w + c])).normal()?;
                }
            }
        }
        Ok(Matrix::from_parts(n, w, b))
    }
}

fn perm_sum_rec(m: &Matrix, row: usize, cols: &mut Vec<usize>, even: bool, parts: &mut Vec<Ex>) {
    let n = m.rows;
    if row == n {
        let mut factors = Vec::with_capacity(n);
        for (r, &c) in cols.iter().enumerate() {
            factors.push(m.elems[r * n + c].clone());
        }
        let term = crate::algebra::mul_many(factors);
        parts.push(if even { term } else { -term });
        return;
    }
    for i in row..n {
        cols.swap(row, i);
        let parity = if i == row { even } else { !even };
        perm_sum_rec(m, row + 1, cols, parity, parts);
        cols.swap(row, i);
    }
}

impl Ex {
    /// Build a matrix node from rows.
    ///
    /// # Errors
    /// `InvalidArgument` on ragged or empty input.
    pub fn matrix(rows: Vec<Vec<Ex>>) -> Result<Ex, KernelError> {
        Ok(Ex::new(NodeKind::Matrix(Matrix::from_rows(rows)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym_matrix(n: usize, prefix: &str) -> Matrix {
        let rows = (0..n)
            .map(|r| {
                (0..n)
                    .map(|c| Ex::symbol(format!("{prefix}{r}{c}")))
                    .collect()
            })
            .collect();
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn two_by_two_determinant() {
        let m = sym_matrix(2, "a");
        let det = m.determinant(DetAlgo::Auto).unwrap();
        let expected =
            m.get(0, 0).unwrap() * m.get(1, 1).unwrap() - m.get(0, 1).unwrap() * m.get(1, 0).unwrap();
        assert_eq!(det.expand(), expected.expand());
    }

    #[test]
    fn algorithms_agree_on_numeric_matrix() {
        let m = Matrix::from_rows(vec![
            vec![Ex::from(2i64), Ex::from(0i64), Ex::from(1i64)],
            vec![Ex::from(1i64), Ex::from(3i64), Ex::from(2i64)],
            vec![Ex::from(0i64), Ex::from(1i64), Ex::from(4i64)],
        ])
        .unwrap();
        let a = m.determinant(DetAlgo::Laplace).unwrap();
        let b = m.determinant(DetAlgo::PermSum).unwrap();
        let c = m.determinant(DetAlgo::GaussElim).unwrap();
        assert_eq!(a, Ex::from(21i64));
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn inverse_of_numeric_matrix() {
        let m = Matrix::from_rows(vec![
            vec![Ex::from(2i64), Ex::from(1i64)],
            vec![Ex::from(1i64), Ex::from(1i64)],
        ])
        .unwrap();
        let inv = m.inverse().unwrap();
        let prod = m.mul(&inv).unwrap();
        for r in 0..2 {
            for c in 0..2 {
                let expect = if r == c { Ex::one() } else { Ex::zero() };
                assert_eq!(*prod.get(r, c).unwrap(), expect);
            }
        }
    }

    #[test]
    fn singular_matrix_is_detected() {
        let x = Ex::symbol("x");
        let m = Matrix::from_rows(vec![
            vec![x.clone(), x.clone()],
            vec![x.clone(), x.clone()],
        ])
        .unwrap();
        assert!(matches!(
            m.inverse(),
            Err(KernelError::Runtime { .. })
        ));
    }

    #[test]
    fn out_of_bounds_access() {
        let m = Matrix::identity(2);
        assert!(matches!(m.get(2, 0), Err(KernelError::Range { .. })));
    }
}
