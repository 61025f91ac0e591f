use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::stations::MeasurementKind;

/// A single (date, value) pair read from a station spreadsheet.
///
/// Values are always finite and non-zero; the reader drops anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reading {
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub date: NaiveDate,
    pub value: f64,
}

impl Reading {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Trend / seasonal / residual decomposition for one target month
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
pub struct Estimate {
    pub trend: f64,
    pub seasonal: f64,
    pub residual: f64,
}

impl Estimate {
    /// Sum of the three components, floored at zero (hydrological quantities
    /// are never negative).
    pub fn predicted(&self) -> f64 {
        (self.trend + self.seasonal + self.residual).max(0.0)
    }
}

// Chart DTOs
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CombinedPoint {
    pub label: String,
    pub historical: Option<f64>,
    pub prediction: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PredictionResult {
    pub station_id: String,
    pub station_name: String,
    pub kind: MeasurementKind,
    #[schema(value_type = String, format = Date, example = "2025-01-01")]
    pub target_date: NaiveDate,
    pub predicted_level: f64,
    pub predicted_precipitation: f64,
    pub discharge: f64,
    pub max_flow: f64,
    pub confidence: f64,
    pub record_count: usize,
    pub historical: Vec<ChartPoint>,
    pub projection: Vec<ChartPoint>,
    pub seasonality: Vec<ChartPoint>,
    pub combined: Vec<CombinedPoint>,
}

impl PredictionResult {
    /// The headline figure for the station's own measurement kind
    pub fn predicted_value(&self) -> f64 {
        match self.kind {
            MeasurementKind::WaterLevel => self.predicted_level,
            MeasurementKind::Precipitation => self.predicted_precipitation,
        }
    }
}
