use chrono::{Datelike, NaiveDate};

use super::noise::NoiseSource;
use crate::models::{Estimate, Reading};

/// Residual spread as a fraction of the series mean (±5% either side)
pub const RESIDUAL_SPREAD: f64 = 0.1;

/// Arithmetic mean of all values, `None` for an empty slice
pub fn mean(series: &[Reading]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let total: f64 = series.iter().map(|r| r.value).sum();
    Some(total / series.len() as f64)
}

/// Mean of the values recorded in `month` (1-12), in any year
pub fn monthly_mean(series: &[Reading], month: u32) -> Option<f64> {
    let (sum, count) = series
        .iter()
        .filter(|r| r.date.month() == month)
        .fold((0.0, 0usize), |(sum, count), r| (sum + r.value, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Decompose `series` for the month of `target`.
///
/// The trend is the flat mean of the series, the seasonal term is how far the
/// target month's mean sits from it, and the residual is a uniform draw in
/// `[-0.05 * mean, +0.05 * mean)`. An empty series gives a zero estimate and
/// consumes no noise.
pub fn estimate<N>(series: &[Reading], target: NaiveDate, noise: &mut N) -> Estimate
where
    N: NoiseSource + ?Sized,
{
    let Some(trend) = mean(series) else {
        return Estimate::default();
    };

    let seasonal = monthly_mean(series, target.month()).unwrap_or(trend) - trend;
    let residual = (noise.unit() - 0.5) * (trend * RESIDUAL_SPREAD);

    Estimate {
        trend,
        seasonal,
        residual,
    }
}
