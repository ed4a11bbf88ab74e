//! Eigendecomposition of small symmetric matrices
//!
//! Cyclic Jacobi: each sweep zeroes every off-diagonal element in turn with a plane rotation,
//! accumulating the rotations into the eigenvectors. Converges quadratically once the
//! off-diagonal mass is small.

/// Sweeps before giving up on convergence
const MAX_SWEEPS: usize = 64;

/// Eigenvalues and unit eigenvectors of a symmetric matrix
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetricEigen {
    /// In decreasing order
    pub values: Vec<f64>,
    /// `vectors[k]` belongs to `values[k]`, its largest component by magnitude is positive
    pub vectors: Vec<Vec<f64>>,
}

/// Decomposes the symmetric `matrix`, given as rows
///
/// Asymmetric input gives meaningless results.
///
/// # Panics
///
/// Panics if the matrix is not square
pub fn symmetric_eigen(matrix: &[Vec<f64>]) -> SymmetricEigen {
    let n = matrix.len();
    assert!(matrix.iter().all(|row| row.len() == n));

    let mut a = matrix.to_vec();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1. } else { 0. }).collect())
        .collect();

    for sweep in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        let diagonal: f64 = (0..n).map(|i| a[i][i] * a[i][i]).sum();
        if off == 0. || off <= 1e-30 * diagonal {
            info!("Jacobi converged after {} sweeps", sweep);
            break;
        }

        for p in 0..n {
            for q in p + 1..n {
                if a[p][q] == 0. {
                    continue;
                }

                let theta = (a[q][q] - a[p][p]) / (2. * a[p][q]);
                let t = theta.signum() / (theta.abs() + theta.hypot(1.));
                let c = 1. / t.hypot(1.);
                let s = t * c;

                rotate_columns(&mut a, p, q, c, s);
                rotate_rows(&mut a, p, q, c, s);
                rotate_columns(&mut v, p, q, c, s);
            }
        }
    }

    let mut pairs: Vec<(f64, Vec<f64>)> = (0..n)
        .map(|k| (a[k][k], v.iter().map(|row| row[k]).collect()))
        .collect();
    pairs.sort_by(|x, y| y.0.partial_cmp(&x.0).unwrap_or(std::cmp::Ordering::Equal));

    let (values, vectors): (Vec<f64>, Vec<Vec<f64>>) = pairs
        .into_iter()
        .map(|(value, mut vector)| {
            orient(&mut vector);
            (value, vector)
        })
        .unzip();

    SymmetricEigen { values, vectors }
}

fn rotate_columns(m: &mut [Vec<f64>], p: usize, q: usize, c: f64, s: f64) {
    for row in m.iter_mut() {
        let (mp, mq) = (row[p], row[q]);
        row[p] = c * mp - s * mq;
        row[q] = s * mp + c * mq;
    }
}

fn rotate_rows(m: &mut [Vec<f64>], p: usize, q: usize, c: f64, s: f64) {
    for k in 0..m.len() {
        let (mp, mq) = (m[p][k], m[q][k]);
        m[p][k] = c * mp - s * mq;
        m[q][k] = s * mp + c * mq;
    }
}

/// Flips `vector` so that its largest component by magnitude is positive
fn orient(vector: &mut [f64]) {
    let largest = vector
        .iter()
        .cloned()
        .fold(0., |acc: f64, x| if x.abs() > acc.abs() { x } else { acc });

    if largest < 0. {
        for x in vector.iter_mut() {
            *x = -*x;
        }
    }
}

#[cfg(test)]
mod test {
    use super::symmetric_eigen;

    fn determinant_3x3(m: &[Vec<f64>]) -> f64 {
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    #[test]
    fn two_by_two() {
        let eigen = symmetric_eigen(&[vec![2., 1.], vec![1., 2.]]);

        assert_relative_eq!(eigen.values[0], 3., epsilon = 1e-12);
        assert_relative_eq!(eigen.values[1], 1., epsilon = 1e-12);

        let half = 0.5f64.sqrt();
        assert_relative_eq!(eigen.vectors[0][0], half, epsilon = 1e-12);
        assert_relative_eq!(eigen.vectors[0][1], half, epsilon = 1e-12);
        // Tie on magnitude, the first component wins
        assert_relative_eq!(eigen.vectors[1][0].abs(), half, epsilon = 1e-12);
        assert_relative_eq!(eigen.vectors[1][0], -eigen.vectors[1][1], epsilon = 1e-12);
    }

    #[test]
    fn eigenvalues_are_roots_of_the_characteristic_polynomial() {
        let matrix = vec![vec![4., 1., 2.], vec![1., 3., 0.5], vec![2., 0.5, 5.]];
        let eigen = symmetric_eigen(&matrix);

        assert_relative_eq!(eigen.values.iter().sum::<f64>(), 12., epsilon = 1e-12);
        assert!(eigen.values.windows(2).all(|w| w[0] >= w[1]));

        for &lambda in &eigen.values {
            let shifted: Vec<Vec<f64>> = matrix
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    row.iter()
                        .enumerate()
                        .map(|(j, &x)| if i == j { x - lambda } else { x })
                        .collect()
                })
                .collect();

            assert_relative_eq!(determinant_3x3(&shifted), 0., epsilon = 1e-10);
        }
    }

    #[test]
    fn eigenvectors_are_orthonormal() {
        let matrix = vec![vec![4., 1., 2.], vec![1., 3., 0.5], vec![2., 0.5, 5.]];
        let eigen = symmetric_eigen(&matrix);

        for (i, u) in eigen.vectors.iter().enumerate() {
            for (j, w) in eigen.vectors.iter().enumerate() {
                let dot: f64 = u.iter().zip(w).map(|(a, b)| a * b).sum();
                let expected = if i == j { 1. } else { 0. };

                assert_relative_eq!(dot, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn diagonal_matrix_is_its_own_decomposition() {
        let eigen = symmetric_eigen(&[vec![1., 0.], vec![0., 5.]]);

        assert_eq!(eigen.values, vec![5., 1.]);
        assert_eq!(eigen.vectors, vec![vec![0., 1.], vec![1., 0.]]);
    }
}
