//! Reshape a station series into display-ready chart data

use chrono::{Months, NaiveDate};
use tracing::warn;

use super::estimator::{estimate, monthly_mean};
use super::noise::NoiseSource;
use crate::models::{ChartPoint, CombinedPoint, Reading};
use crate::utils::{month_abbreviation, month_year_label};

/// The trailing `window` readings, in source order
pub fn historical_tail(series: &[Reading], window: usize) -> &[Reading] {
    &series[series.len().saturating_sub(window)..]
}

pub fn historical_window(series: &[Reading], window: usize) -> Vec<ChartPoint> {
    historical_tail(series, window)
        .iter()
        .map(|r| ChartPoint {
            label: month_year_label(r.date),
            value: r.value,
        })
        .collect()
}

/// Project `months` steps past the last reading (or `today` for an empty
/// series). Each step is estimated on its own with a fresh noise draw.
///
/// Always yields `months` points; an anchor too close to the end of the
/// calendar is pulled back so the last step lands on `NaiveDate::MAX`.
pub fn forward_projection<N>(
    series: &[Reading],
    months: u32,
    today: NaiveDate,
    noise: &mut N,
) -> Vec<ChartPoint>
where
    N: NoiseSource + ?Sized,
{
    let mut anchor = series.last().map(|r| r.date).unwrap_or(today);

    let latest_anchor = NaiveDate::MAX
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);
    if anchor > latest_anchor {
        warn!(
            "Projection anchor {} leaves no room for {} months, using {}",
            anchor, months, latest_anchor
        );
        anchor = latest_anchor;
    }

    (1..=months)
        .map(|step| {
            anchor
                .checked_add_months(Months::new(step))
                .unwrap_or(NaiveDate::MAX)
        })
        .map(|date| ChartPoint {
            label: month_year_label(date),
            value: estimate(series, date, &mut *noise).predicted(),
        })
        .collect()
}

/// Mean value per calendar month, January first. Months with no records are 0.
pub fn seasonality_curve(series: &[Reading]) -> Vec<ChartPoint> {
    (1..=12)
        .map(|month| ChartPoint {
            label: month_abbreviation(month).unwrap_or_default().to_string(),
            value: monthly_mean(series, month).unwrap_or(0.0),
        })
        .collect()
}

/// Historical points followed by projected points. The first projected point
/// also carries the last historical value so both lines meet on the chart.
pub fn combined_series(historical: &[ChartPoint], projection: &[ChartPoint]) -> Vec<CombinedPoint> {
    let mut combined: Vec<CombinedPoint> = historical
        .iter()
        .map(|p| CombinedPoint {
            label: p.label.clone(),
            historical: Some(p.value),
            prediction: None,
        })
        .collect();

    let junction = historical.last().map(|p| p.value);

    combined.extend(projection.iter().enumerate().map(|(i, p)| CombinedPoint {
        label: p.label.clone(),
        historical: if i == 0 { junction } else { None },
        prediction: Some(p.value),
    }));

    combined
}
