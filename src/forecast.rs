//! The "Prophet" predictive model: mean trend, month-of-year seasonality and
//! a bounded random residual, plus the derived hydraulic figures and chart
//! series served alongside a prediction.

pub mod charts;
pub mod estimator;
pub mod hydraulics;
pub mod noise;

use chrono::{NaiveDate, Utc};
use tracing::debug;

pub use estimator::estimate;
pub use noise::{FixedNoise, NoiseSource, RandomNoise};

use crate::models::{PredictionResult, Reading};
use crate::stations::{MeasurementKind, Station};

/// Number of trailing readings shown on the historical chart
pub const HISTORY_WINDOW: usize = 24;
/// Months projected past the last reading
pub const PROJECTION_MONTHS: u32 = 12;

/// Explicit inputs to a prediction besides the series itself
#[derive(Debug, Clone, Copy)]
pub struct ForecastContext {
    /// Projection anchor for a station without readings
    pub today: NaiveDate,
    pub history_window: usize,
    pub projection_months: u32,
}

impl ForecastContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            history_window: HISTORY_WINDOW,
            projection_months: PROJECTION_MONTHS,
        }
    }

    pub fn today_utc() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

/// Run the model for one station and target month.
///
/// The station's own measurement is the estimate; the counterpart figure is
/// fabricated (1-4 m of level for rain gauges, 50-200 mm of rain for level
/// gauges) so both headline numbers are always populated.
pub fn predict<N>(
    station: &Station,
    series: &[Reading],
    target_date: NaiveDate,
    ctx: &ForecastContext,
    noise: &mut N,
) -> PredictionResult
where
    N: NoiseSource + ?Sized,
{
    let estimate = estimator::estimate(series, target_date, &mut *noise);
    let predicted = estimate.predicted();
    debug!(
        station_id = station.id,
        trend = estimate.trend,
        seasonal = estimate.seasonal,
        residual = estimate.residual,
        "Estimated {} for {}",
        predicted,
        target_date
    );

    let (predicted_level, predicted_precipitation) = match station.kind {
        MeasurementKind::WaterLevel => (predicted, noise.unit() * 150.0 + 50.0),
        MeasurementKind::Precipitation => (noise.unit() * 3.0 + 1.0, predicted),
    };

    let discharge = hydraulics::discharge(predicted_level);
    let max_flow = hydraulics::max_flow(discharge);
    let confidence = (85.0 + (noise.unit() - 0.5) * 20.0).clamp(70.0, 95.0);

    let historical = charts::historical_window(series, ctx.history_window);
    let projection = charts::forward_projection(series, ctx.projection_months, ctx.today, noise);
    let seasonality = charts::seasonality_curve(series);
    let combined = charts::combined_series(&historical, &projection);

    PredictionResult {
        station_id: station.id.to_string(),
        station_name: station.name.to_string(),
        kind: station.kind,
        target_date,
        predicted_level,
        predicted_precipitation,
        discharge,
        max_flow,
        confidence,
        record_count: series.len(),
        historical,
        projection,
        seasonality,
        combined,
    }
}
