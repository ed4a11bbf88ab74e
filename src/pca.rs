//! Principal component analysis
//!
//! The columns are centered, their sample covariance matrix (`n - 1` denominator) is
//! decomposed, and the leading eigenvectors become the components. Each component is reported
//! with the variance it explains and its loading on every feature.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::dataset::Table;
use crate::error::{Error, Result};
use crate::stats::eigen::symmetric_eigen;
use crate::stats::univariate::Sample;

/// Leading principal components of a set of numeric columns
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrincipalComponents {
    /// Feature names, in column order
    pub features: Vec<String>,
    /// Number of observations
    pub n: usize,
    /// Mean of every feature
    pub means: Vec<f64>,
    /// Variance along each component, decreasing
    pub explained_variance: Vec<f64>,
    /// Share of the total variance along each component
    pub explained_variance_ratio: Vec<f64>,
    /// `components[k][j]` is the loading of feature `j` on component `k`, each component has
    /// unit length
    pub components: Vec<Vec<f64>>,
}

impl PrincipalComponents {
    /// `PC-0`, `PC-1`, ...
    pub fn names(&self) -> Vec<String> {
        (0..self.components.len())
            .map(|k| format!("PC-{}", k))
            .collect()
    }

    /// Loadings of the feature at `index` on every component
    pub fn loadings(&self, index: usize) -> Vec<f64> {
        self.components.iter().map(|c| c[index]).collect()
    }

    /// Coordinates of one observation in component space
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when the observation does not have one value per feature
    pub fn transform(&self, observation: &[f64]) -> Result<Vec<f64>> {
        if observation.len() != self.features.len() {
            return Err(Error::InvalidParameter {
                name: "observation",
                value: observation.len() as f64,
            });
        }

        Ok(self
            .components
            .iter()
            .map(|c| {
                c.iter()
                    .zip(observation.iter().zip(&self.means))
                    .map(|(w, (x, mean))| w * (x - mean))
                    .sum()
            })
            .collect())
    }
}

/// Covariance of two centered columns
fn covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len();
    a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>() / (n - 1) as f64
}

/// Extracts the first `n_components` principal components of `columns`
///
/// # Errors
///
/// - `InsufficientSamples` with no columns or fewer than two observations
/// - `InvalidParameter` when the columns differ in length, or when `n_components` is zero or
///   exceeds the number of features or of observations
/// - `NonFinite` for a `NaN` or infinite observation
/// - `DegenerateInput` when every column is constant or the variances overflow
pub fn pca(columns: &[(String, Vec<f64>)], n_components: usize) -> Result<PrincipalComponents> {
    let p = columns.len();
    if p == 0 {
        return Err(Error::InsufficientSamples {
            required: 1,
            actual: 0,
        });
    }

    let n = columns[0].1.len();
    if let Some((_, values)) = columns.iter().find(|(_, values)| values.len() != n) {
        return Err(Error::InvalidParameter {
            name: "columns",
            value: values.len() as f64,
        });
    }
    if n < 2 {
        return Err(Error::InsufficientSamples {
            required: 2,
            actual: n,
        });
    }
    if n_components == 0 || n_components > p.min(n) {
        return Err(Error::InvalidParameter {
            name: "components",
            value: n_components as f64,
        });
    }
    for (_, values) in columns {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFinite { index });
        }
    }

    let means: Vec<f64> = columns
        .iter()
        .map(|(_, values)| Sample::new(values).mean())
        .collect();
    let centered: Vec<Vec<f64>> = columns
        .iter()
        .zip(&means)
        .map(|((_, values), &mean)| values.iter().map(|x| x - mean).collect())
        .collect();

    #[cfg(feature = "rayon")]
    let rows = centered.par_iter();
    #[cfg(not(feature = "rayon"))]
    let rows = centered.iter();

    let matrix: Vec<Vec<f64>> = rows
        .map(|a| centered.iter().map(|b| covariance(a, b)).collect())
        .collect();

    let total: f64 = (0..p).map(|i| matrix[i][i]).sum();
    if !total.is_finite() {
        return Err(Error::DegenerateInput(
            "the variances overflow, rescale the data",
        ));
    }
    if total == 0. {
        return Err(Error::DegenerateInput(
            "every column is constant, there is no variance to decompose",
        ));
    }

    let eigen = symmetric_eigen(&matrix);
    info!("Covariance eigenvalues of {} features: {:?}", p, eigen.values);

    // Rounding can leave the trailing eigenvalues slightly negative
    let explained_variance: Vec<f64> = eigen.values[..n_components]
        .iter()
        .map(|&value| value.max(0.))
        .collect();
    let explained_variance_ratio = explained_variance.iter().map(|v| v / total).collect();

    Ok(PrincipalComponents {
        features: columns.iter().map(|(name, _)| name.clone()).collect(),
        n,
        means,
        explained_variance,
        explained_variance_ratio,
        components: eigen.vectors.into_iter().take(n_components).collect(),
    })
}

/// Principal components of every column of `table` except the ones in `drop`
///
/// # Errors
///
/// `MissingColumn` when a dropped column does not exist, otherwise as `pca`
pub fn pca_table(table: &Table, n_components: usize, drop: &[&str]) -> Result<PrincipalComponents> {
    if let Some(missing) = drop.iter().find(|name| !table.headers().iter().any(|h| h == *name)) {
        return Err(Error::MissingColumn((*missing).to_owned()));
    }

    let columns = table
        .headers()
        .iter()
        .filter(|h| !drop.contains(&h.as_str()))
        .map(|name| Ok((name.clone(), table.column(name)?)))
        .collect::<Result<Vec<_>>>()?;

    pca(&columns, n_components)
}

#[cfg(test)]
mod test {
    use super::{pca, pca_table};
    use crate::dataset::Table;
    use crate::error::Error;

    fn columns() -> Vec<(String, Vec<f64>)> {
        vec![
            (
                "x".to_owned(),
                vec![2.5, 0.5, 2.2, 1.9, 3.1, 2.3, 2.0, 1.0, 1.5, 1.1],
            ),
            (
                "y".to_owned(),
                vec![2.4, 0.7, 2.9, 2.2, 3.0, 2.7, 1.6, 1.1, 1.6, 0.9],
            ),
        ]
    }

    #[test]
    fn correlated_pair() {
        let pcs = pca(&columns(), 2).unwrap();

        assert_eq!(pcs.n, 10);
        assert_relative_eq!(pcs.means[0], 1.81, epsilon = 1e-12);
        assert_relative_eq!(pcs.means[1], 1.91, epsilon = 1e-12);

        assert_relative_eq!(pcs.explained_variance[0], 1.284_027_712, epsilon = 1e-8);
        assert_relative_eq!(pcs.explained_variance[1], 0.049_083_399, epsilon = 1e-8);
        assert_relative_eq!(pcs.explained_variance_ratio[0], 0.963_181_314, epsilon = 1e-8);

        assert_relative_eq!(pcs.components[0][0], 0.677_873_399, epsilon = 1e-8);
        assert_relative_eq!(pcs.components[0][1], 0.735_178_656, epsilon = 1e-8);
        assert_relative_eq!(pcs.components[1][0], 0.735_178_656, epsilon = 1e-8);
        assert_relative_eq!(pcs.components[1][1], -0.677_873_399, epsilon = 1e-8);
    }

    #[test]
    fn explained_variance_ratio_sums_to_one() {
        let all = pca(&columns(), 2).unwrap();
        let first = pca(&columns(), 1).unwrap();

        assert_relative_eq!(all.explained_variance_ratio.iter().sum::<f64>(), 1., epsilon = 1e-12);
        assert_eq!(first.components.len(), 1);
        assert!(first.explained_variance_ratio[0] < 1.);
        assert_eq!(first.names(), vec!["PC-0"]);
    }

    #[test]
    fn loadings_are_per_feature() {
        let pcs = pca(&columns(), 2).unwrap();

        assert_eq!(pcs.loadings(1), vec![pcs.components[0][1], pcs.components[1][1]]);
        assert_eq!(pcs.names(), vec!["PC-0", "PC-1"]);
    }

    #[test]
    fn transform_centers_and_projects() {
        let pcs = pca(&columns(), 2).unwrap();

        let origin = pcs.transform(&[1.81, 1.91]).unwrap();
        assert_relative_eq!(origin[0], 0., epsilon = 1e-12);
        assert_relative_eq!(origin[1], 0., epsilon = 1e-12);

        // The first observation, as in the worked example of the covariance method
        let scores = pcs.transform(&[2.5, 2.4]).unwrap();
        assert_relative_eq!(scores[0], 0.827_970_186, epsilon = 1e-8);

        assert!(matches!(
            pcs.transform(&[1.]),
            Err(Error::InvalidParameter { name: "observation", .. })
        ));
    }

    #[test]
    fn component_count_is_bounded() {
        assert!(matches!(
            pca(&columns(), 3),
            Err(Error::InvalidParameter { name: "components", .. })
        ));
        assert!(matches!(
            pca(&columns(), 0),
            Err(Error::InvalidParameter { name: "components", .. })
        ));
    }

    #[test]
    fn degenerate_inputs() {
        let constant = vec![
            ("a".to_owned(), vec![1., 1., 1.]),
            ("b".to_owned(), vec![2., 2., 2.]),
        ];
        assert!(matches!(pca(&constant, 1), Err(Error::DegenerateInput(_))));

        let single = vec![("a".to_owned(), vec![1.])];
        assert!(matches!(
            pca(&single, 1),
            Err(Error::InsufficientSamples { required: 2, actual: 1 })
        ));

        let ragged = vec![
            ("a".to_owned(), vec![1., 2., 3.]),
            ("b".to_owned(), vec![2., 2.]),
        ];
        assert!(matches!(
            pca(&ragged, 1),
            Err(Error::InvalidParameter { name: "columns", .. })
        ));

        let nan = vec![("a".to_owned(), vec![1., f64::NAN, 3.])];
        assert!(matches!(pca(&nan, 1), Err(Error::NonFinite { index: 1 })));
    }

    #[test]
    fn drops_the_class_column() {
        let table = Table::from_reader(
            "alcohol;acidity;quality\n9.4;0.7;5\n9.8;0.88;5\n10.5;0.76;6\n12.0;0.28;7\n".as_bytes(),
            b';',
        )
        .unwrap();

        let pcs = pca_table(&table, 2, &["quality"]).unwrap();
        assert_eq!(pcs.features, vec!["alcohol", "acidity"]);
        assert_eq!(pcs.components[0].len(), 2);

        assert!(matches!(
            pca_table(&table, 1, &["density"]),
            Err(Error::MissingColumn(ref name)) if name == "density"
        ));
    }
}
