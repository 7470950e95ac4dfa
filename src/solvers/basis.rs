//! Explicit inverse of the simplex basis matrix.
//!
//! The inverse is kept dense, updated with one elementary (eta) transformation per pivot
//! and recomputed from scratch by Gauss-Jordan elimination when the updates pile up.
use std::fmt::{Display, Formatter};

/// A sparse column: `(row, coefficient)` pairs
pub(crate) type SparseColumn = Vec<(usize, f64)>;

/// Below this magnitude, a pivot is considered to be zero during factorisation
const SINGULAR_PIVOT: f64 = 1e-11;

/// The basis matrix could not be inverted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SingularBasis {
    /// The basis position where elimination failed
    pub position: usize,
}

impl Display for SingularBasis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "singular basis at position {}", self.position)
    }
}

impl std::error::Error for SingularBasis {}

/// Row-major dense `m * m` inverse of the basis matrix.
/// Row `p` of the inverse corresponds to the basic variable in position `p`.
#[derive(Debug, Clone)]
pub(crate) struct BasisInverse {
    size: usize,
    data: Vec<f64>,
    updates: usize,
}

impl BasisInverse {
    /// The inverse of a diagonal basis
    pub fn diagonal(diagonal: &[f64]) -> Self {
        let size = diagonal.len();
        let mut data = vec![0.; size * size];
        for (i, &d) in diagonal.iter().enumerate() {
            data[i * size + i] = 1. / d;
        }
        BasisInverse {
            size,
            data,
            updates: 0,
        }
    }

    /// Invert the basis made of the given columns, in basis order
    pub fn factorize(columns: &[SparseColumn]) -> Result<Self, SingularBasis> {
        let size = columns.len();
        let width = 2 * size;
        // [B | I], reduced in place to [I | B^-1]
        let mut work = vec![0.; size * width];
        for (k, column) in columns.iter().enumerate() {
            for &(row, value) in column {
                work[row * width + k] += value;
            }
        }
        for i in 0..size {
            work[i * width + size + i] = 1.;
        }
        for col in 0..size {
            let (pivot_row, pivot_abs) = (col..size)
                .map(|r| (r, work[r * width + col].abs()))
                .fold((col, -1.), |best, cur| if cur.1 > best.1 { cur } else { best });
            if pivot_abs < SINGULAR_PIVOT {
                return Err(SingularBasis { position: col });
            }
            if pivot_row != col {
                for c in 0..width {
                    work.swap(pivot_row * width + c, col * width + c);
                }
            }
            let pivot = work[col * width + col];
            for c in 0..width {
                work[col * width + c] /= pivot;
            }
            for r in 0..size {
                if r == col {
                    continue;
                }
                let factor = work[r * width + col];
                if factor == 0. {
                    continue;
                }
                for c in 0..width {
                    work[r * width + c] -= factor * work[col * width + c];
                }
            }
        }
        let mut data = Vec::with_capacity(size * size);
        for r in 0..size {
            data.extend_from_slice(&work[r * width + size..(r + 1) * width]);
        }
        Ok(BasisInverse {
            size,
            data,
            updates: 0,
        })
    }

    /// Number of eta updates since the last factorisation
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// `B^-1 a` for a sparse column `a`
    pub fn ftran(&self, column: &[(usize, f64)]) -> Vec<f64> {
        let n = self.size;
        let mut result = vec![0.; n];
        for &(k, value) in column {
            for (i, r) in result.iter_mut().enumerate() {
                *r += self.data[i * n + k] * value;
            }
        }
        result
    }

    /// `B^-1 v` for a dense vector `v`
    pub fn ftran_dense(&self, vector: &[f64]) -> Vec<f64> {
        let n = self.size;
        (0..n)
            .map(|i| {
                self.data[i * n..(i + 1) * n]
                    .iter()
                    .zip(vector)
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect()
    }

    /// `c^T B^-1`, the simplex multipliers for the basic costs `c`
    pub fn btran(&self, basic_costs: &[f64]) -> Vec<f64> {
        let n = self.size;
        let mut result = vec![0.; n];
        for (i, &c) in basic_costs.iter().enumerate() {
            if c == 0. {
                continue;
            }
            for (k, r) in result.iter_mut().enumerate() {
                *r += c * self.data[i * n + k];
            }
        }
        result
    }

    /// Replace the basic variable at `position` by the column whose `ftran` is `alpha`
    pub fn pivot(&mut self, position: usize, alpha: &[f64]) {
        let n = self.size;
        let pivot = alpha[position];
        let start = position * n;
        for value in &mut self.data[start..start + n] {
            *value /= pivot;
        }
        let pivot_row: Vec<f64> = self.data[start..start + n].to_vec();
        for (i, &factor) in alpha.iter().enumerate() {
            if i == position || factor == 0. {
                continue;
            }
            for (value, p) in self.data[i * n..(i + 1) * n].iter_mut().zip(&pivot_row) {
                *value -= factor * p;
            }
        }
        self.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::BasisInverse;

    #[test]
    fn factorize_and_solve() {
        // B = [[2, 1], [1, 3]]
        let columns = vec![vec![(0, 2.), (1, 1.)], vec![(0, 1.), (1, 3.)]];
        let inverse = BasisInverse::factorize(&columns).unwrap();
        let x = inverse.ftran_dense(&[3., 5.]);
        assert_float_eq!(x, vec![0.8, 1.4], abs_all <= 1e-12);
        let y = inverse.btran(&[1., 0.]);
        // y B = e1
        assert_float_eq!(y[0] * 2. + y[1], 1., abs <= 1e-12);
        assert_float_eq!(y[0] + y[1] * 3., 0., abs <= 1e-12);
    }

    #[test]
    fn singular() {
        let columns = vec![vec![(0, 1.), (1, 2.)], vec![(0, 2.), (1, 4.)]];
        assert!(BasisInverse::factorize(&columns).is_err());
    }

    #[test]
    fn eta_update_matches_refactorisation() {
        let mut inverse = BasisInverse::diagonal(&[-1., -1.]);
        let entering = vec![(0, 1.), (1, 2.)];
        let alpha = inverse.ftran(&entering);
        inverse.pivot(1, &alpha);
        assert_eq!(inverse.updates(), 1);
        let fresh = BasisInverse::factorize(&[vec![(0, -1.)], entering]).unwrap();
        let probe = [1., 7.];
        assert_float_eq!(
            inverse.ftran_dense(&probe),
            fresh.ftran_dense(&probe),
            abs_all <= 1e-12
        );
    }
}
