//! Analysis of variance
//!
//! One-way: the observations are split into groups by one factor and the variance between
//! the group means is tested against the variance within the groups.
//!
//! Two-way: two crossed factors, their interaction and the within-cell residual. Every
//! combination of levels must have at least one observation.

use itertools::Itertools;

use crate::dataset::Table;
use crate::error::{Degeneracy, Error, Result};
use crate::stats::distribution::FisherSnedecor;

/// Arithmetic mean of a non-empty slice, cells may hold a single observation
fn mean(values: &[f64]) -> f64 {
    crate::stats::sum(values) / values.len() as f64
}

fn check_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(Error::NonFinite { index }),
        None => Ok(()),
    }
}

/// Splits `values` by the label at the same position, groups in order of first appearance
pub fn group_by(labels: &[String], values: &[f64]) -> Vec<(String, Vec<f64>)> {
    labels
        .iter()
        .unique()
        .map(|level| {
            let group = labels
                .iter()
                .zip(values)
                .filter(|&(label, _)| label == level)
                .map(|(_, &value)| value)
                .collect();

            (level.clone(), group)
        })
        .collect()
}

/// Relative tolerance below which a sum of squares is rounding noise of the total
const SS_TOLERANCE: f64 = 1e-12;

/// `ss` with rounding noise relative to `ss_total` flushed to zero
fn flush(ss: f64, ss_total: f64) -> f64 {
    if ss.abs() <= SS_TOLERANCE * ss_total {
        0.
    } else {
        ss
    }
}

/// `F = ms_effect / ms_error` and its upper tail probability
///
/// Both are `None` when the effect and the error mean squares vanish together. A positive
/// effect over a zero error diverges.
fn f_test(
    ms_effect: f64,
    ms_error: f64,
    df_effect: usize,
    df_error: usize,
) -> Result<(Option<f64>, Option<f64>, Option<Degeneracy>)> {
    if ms_error == 0. {
        if ms_effect == 0. {
            return Ok((None, None, None));
        }

        info!("Error mean square is zero, the F statistic diverges");
        return Ok((Some(f64::INFINITY), Some(0.), Some(Degeneracy::PerfectFit)));
    }

    let f = ms_effect / ms_error;
    let p_value = FisherSnedecor::new(df_effect as f64, df_error as f64)?.sf(f);

    Ok((Some(f), Some(p_value), None))
}

/// One line of an ANOVA table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnovaRow {
    pub source: String,
    /// Sum of squares
    pub ss: f64,
    pub df: usize,
    /// Mean square, `ss / df`
    pub ms: f64,
    /// `None` for the residual row, and for an effect with no variance over a residual with
    /// none either
    pub f: Option<f64>,
    pub p_value: Option<f64>,
}

impl AnovaRow {
    fn effect(
        source: &str,
        ss: f64,
        df: usize,
        ms_error: f64,
        df_error: usize,
    ) -> Result<(AnovaRow, Option<Degeneracy>)> {
        let ms = ss / df as f64;
        let (f, p_value, degeneracy) = f_test(ms, ms_error, df, df_error)?;

        let row = AnovaRow {
            source: source.to_owned(),
            ss,
            df,
            ms,
            f,
            p_value,
        };

        Ok((row, degeneracy))
    }

    fn residual(ss: f64, df: usize) -> AnovaRow {
        AnovaRow {
            source: "Residual".to_owned(),
            ss,
            df,
            ms: ss / df as f64,
            f: None,
            p_value: None,
        }
    }
}

const CONSTANT: &str = "every observation is equal, the F statistic is undefined";

/// Size and mean of one group
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub label: String,
    pub n: usize,
    pub mean: f64,
}

/// One-way ANOVA table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneWayAnova {
    pub groups: Vec<GroupSummary>,
    pub grand_mean: f64,
    /// Between groups
    pub factor: AnovaRow,
    /// Within groups
    pub residual: AnovaRow,
    pub degeneracy: Option<Degeneracy>,
}

impl OneWayAnova {
    /// F statistic of the factor
    pub fn f(&self) -> f64 {
        self.factor.f.unwrap_or(f64::NAN)
    }

    /// p-value of the factor
    pub fn p_value(&self) -> f64 {
        self.factor.p_value.unwrap_or(f64::NAN)
    }

    /// The factor and residual rows
    pub fn rows(&self) -> Vec<&AnovaRow> {
        vec![&self.factor, &self.residual]
    }
}

/// Tests whether the means of the `groups` differ
///
/// # Errors
///
/// - `InsufficientSamples` with less than two groups, an empty group, or no residual degree
///   of freedom (as many observations as groups)
/// - `NonFinite` for a `NaN` or infinite observation
/// - `DegenerateInput` when every observation is equal
pub fn one_way(groups: &[(String, Vec<f64>)]) -> Result<OneWayAnova> {
    let k = groups.len();
    if k < 2 {
        return Err(Error::InsufficientSamples {
            required: 2,
            actual: k,
        });
    }
    for (_, values) in groups {
        if values.is_empty() {
            return Err(Error::InsufficientSamples {
                required: 1,
                actual: 0,
            });
        }
        check_finite(values)?;
    }

    let n: usize = groups.iter().map(|(_, values)| values.len()).sum();
    if n <= k {
        return Err(Error::InsufficientSamples {
            required: k + 1,
            actual: n,
        });
    }

    let grand_mean = groups
        .iter()
        .flat_map(|(_, values)| values.iter())
        .sum::<f64>()
        / n as f64;

    let summaries: Vec<_> = groups
        .iter()
        .map(|(label, values)| GroupSummary {
            label: label.clone(),
            n: values.len(),
            mean: mean(values),
        })
        .collect();

    let ss_factor: f64 = summaries
        .iter()
        .map(|g| g.n as f64 * (g.mean - grand_mean).powi(2))
        .sum();
    let ss_error: f64 = groups
        .iter()
        .zip(&summaries)
        .map(|((_, values), g)| crate::stats::sum_of_squares(values, g.mean))
        .sum();
    if ss_factor + ss_error == 0. {
        return Err(Error::DegenerateInput(CONSTANT));
    }

    let residual = AnovaRow::residual(ss_error, n - k);
    let (factor, degeneracy) = AnovaRow::effect("Factor", ss_factor, k - 1, residual.ms, n - k)?;

    Ok(OneWayAnova {
        groups: summaries,
        grand_mean,
        factor,
        residual,
        degeneracy,
    })
}

/// One-way ANOVA of the column `response` grouped by the labels of the column `factor`
pub fn one_way_by(table: &Table, factor: &str, response: &str) -> Result<OneWayAnova> {
    let labels = table.labels(factor)?;
    let values = table.column(response)?;

    let mut anova = one_way(&group_by(&labels, &values))?;
    anova.factor.source = factor.to_owned();

    Ok(anova)
}

/// Two-way ANOVA table with interaction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TwoWayAnova {
    pub levels_a: Vec<String>,
    pub levels_b: Vec<String>,
    pub factor_a: AnovaRow,
    pub factor_b: AnovaRow,
    pub interaction: AnovaRow,
    /// Within cells
    pub residual: AnovaRow,
    /// Sum of squares of every observation around the grand mean
    pub ss_total: f64,
    pub degeneracy: Option<Degeneracy>,
}

impl TwoWayAnova {
    /// Factor A, factor B, interaction and residual rows
    pub fn rows(&self) -> Vec<&AnovaRow> {
        vec![
            &self.factor_a,
            &self.factor_b,
            &self.interaction,
            &self.residual,
        ]
    }
}

/// Factor sum of squares, `Σ nⱼ (ȳⱼ - ȳ)²` over the groups of one factor
fn ss_between(groups: &[(String, Vec<f64>)], grand_mean: f64) -> f64 {
    groups
        .iter()
        .map(|(_, values)| values.len() as f64 * (mean(values) - grand_mean).powi(2))
        .sum()
}

/// Tests the effects of two crossed factors and of their interaction on `values`
///
/// `labels_a[i]` and `labels_b[i]` are the levels of the observation `values[i]`. The names
/// are used as the sources of the effect rows.
///
/// # Errors
///
/// - `InsufficientSamples` when a factor has a single level, or when no residual degree of
///   freedom is left (one observation per cell)
/// - `EmptyCell` when a combination of levels has no observations
/// - `NonFinite` for a `NaN` or infinite observation
/// - `DegenerateInput` when every observation is equal
/// - `InvalidParameter` when the label and value slices differ in length
///
/// With no variance within the cells, an effect with a positive sum of squares diverges and
/// sets `degeneracy`, while an effect with none has no `f` and `p_value`.
pub fn two_way(
    names: (&str, &str),
    labels_a: &[String],
    labels_b: &[String],
    values: &[f64],
) -> Result<TwoWayAnova> {
    if labels_a.len() != values.len() || labels_b.len() != values.len() {
        return Err(Error::InvalidParameter {
            name: "values",
            value: values.len() as f64,
        });
    }
    check_finite(values)?;

    let groups_a = group_by(labels_a, values);
    let groups_b = group_by(labels_b, values);
    let (a, b) = (groups_a.len(), groups_b.len());
    if a < 2 || b < 2 {
        return Err(Error::InsufficientSamples {
            required: 2,
            actual: a.min(b),
        });
    }

    let n = values.len();
    if n <= a * b {
        return Err(Error::InsufficientSamples {
            required: a * b + 1,
            actual: n,
        });
    }

    let mut ss_error = 0.;
    for (level_a, _) in &groups_a {
        for (level_b, _) in &groups_b {
            let cell: Vec<f64> = labels_a
                .iter()
                .zip(labels_b)
                .zip(values)
                .filter(|&((la, lb), _)| la == level_a && lb == level_b)
                .map(|(_, &value)| value)
                .collect();

            if cell.is_empty() {
                return Err(Error::EmptyCell {
                    a: level_a.clone(),
                    b: level_b.clone(),
                });
            }

            ss_error += crate::stats::sum_of_squares(&cell, mean(&cell));
        }
    }

    let grand_mean = mean(values);
    let ss_total = crate::stats::sum_of_squares(values, grand_mean);
    if ss_total == 0. {
        return Err(Error::DegenerateInput(CONSTANT));
    }

    let ss_error = flush(ss_error, ss_total);
    let ss_a = ss_between(&groups_a, grand_mean);
    let ss_b = ss_between(&groups_b, grand_mean);
    let ss_interaction = flush(ss_total - ss_a - ss_b - ss_error, ss_total);

    let (df_a, df_b) = (a - 1, b - 1);
    let df_error = n - a * b;

    let residual = AnovaRow::residual(ss_error, df_error);
    let ms_error = residual.ms;
    let (factor_a, degeneracy_a) = AnovaRow::effect(names.0, ss_a, df_a, ms_error, df_error)?;
    let (factor_b, degeneracy_b) = AnovaRow::effect(names.1, ss_b, df_b, ms_error, df_error)?;
    let (interaction, degeneracy_ab) = AnovaRow::effect(
        &format!("{}:{}", names.0, names.1),
        ss_interaction,
        df_a * df_b,
        ms_error,
        df_error,
    )?;

    Ok(TwoWayAnova {
        levels_a: groups_a.into_iter().map(|(level, _)| level).collect(),
        levels_b: groups_b.into_iter().map(|(level, _)| level).collect(),
        factor_a,
        factor_b,
        interaction,
        residual,
        ss_total,
        degeneracy: degeneracy_a.or(degeneracy_b).or(degeneracy_ab),
    })
}

/// Two-way ANOVA of the column `response` crossed by the columns `factor_a` and `factor_b`
pub fn two_way_by(
    table: &Table,
    factor_a: &str,
    factor_b: &str,
    response: &str,
) -> Result<TwoWayAnova> {
    let labels_a = table.labels(factor_a)?;
    let labels_b = table.labels(factor_b)?;
    let values = table.column(response)?;

    two_way((factor_a, factor_b), &labels_a, &labels_b, &values)
}
