use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::dataset::{DataStatus, DatasetStore};
use crate::forecast::{self, ForecastContext, NoiseSource};
use crate::models::PredictionResult;
use crate::stations::{find_station, DEFAULT_STATION_ID};

/// Artificial processing latency before a prediction is computed
pub const DEFAULT_PREDICTION_DELAY: Duration = Duration::from_millis(1500);

#[derive(Error, Debug, PartialEq)]
pub enum PredictionError {
    #[error("Station data is still loading, please wait")]
    DataNotLoaded,

    #[error("Another prediction is already running")]
    PredictionInFlight,

    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Invalid target date: year {year}, month {month}")]
    InvalidTargetDate { year: i32, month: u32 },

    #[error("No data available for station {0}")]
    NoData(String),
}

fn default_station_id() -> String {
    DEFAULT_STATION_ID.to_string()
}

fn default_year() -> i32 {
    2025
}

fn default_month() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionRequest {
    #[serde(default = "default_station_id")]
    pub station_id: String,
    #[serde(default = "default_year")]
    pub year: i32,
    /// 1 = January ... 12 = December
    #[serde(default = "default_month")]
    pub month: u32,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            station_id: default_station_id(),
            year: default_year(),
            month: default_month(),
        }
    }
}

impl PredictionRequest {
    pub fn new(station_id: impl Into<String>, year: i32, month: u32) -> Self {
        Self {
            station_id: station_id.into(),
            year,
            month,
        }
    }

    /// First day of the requested month
    pub fn target_date(&self) -> Result<NaiveDate, PredictionError> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(PredictionError::InvalidTargetDate {
            year: self.year,
            month: self.month,
        })
    }
}

type SharedNoise = Arc<Mutex<Box<dyn NoiseSource + Send>>>;

#[derive(Clone)]
pub struct PredictionService {
    store: DatasetStore,
    noise: SharedNoise,
    /// One permit; held for the whole of a running prediction
    in_flight: Arc<Semaphore>,
    delay: Duration,
    today: Option<NaiveDate>,
}

impl PredictionService {
    pub fn new(store: DatasetStore, noise: impl NoiseSource + Send + 'static, delay: Duration) -> Self {
        Self {
            store,
            noise: Arc::new(Mutex::new(Box::new(noise))),
            in_flight: Arc::new(Semaphore::new(1)),
            delay,
            today: None,
        }
    }

    /// Pin the projection anchor used for stations without readings
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub async fn status(&self) -> DataStatus {
        if !self.store.is_loaded().await {
            DataStatus::Loading
        } else if self.in_flight.available_permits() == 0 {
            DataStatus::Predicting
        } else {
            DataStatus::Ready
        }
    }

    fn context(&self) -> ForecastContext {
        match self.today {
            Some(today) => ForecastContext::new(today),
            None => ForecastContext::today_utc(),
        }
    }

    /// Run one prediction.
    ///
    /// Rejected while data is loading or while another prediction runs; once
    /// started it runs to completion, including the artificial delay.
    #[instrument(skip(self, request), fields(station_id = %request.station_id, year = request.year, month = request.month))]
    pub async fn generate(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        let Some(data) = self.store.snapshot().await else {
            warn!("Prediction requested before station data finished loading");
            return Err(PredictionError::DataNotLoaded);
        };

        let _permit = self.in_flight.try_acquire().map_err(|_| {
            warn!("Prediction rejected, another one is in flight");
            PredictionError::PredictionInFlight
        })?;

        let station = find_station(&request.station_id)
            .ok_or_else(|| PredictionError::UnknownStation(request.station_id.clone()))?;
        let target_date = request.target_date()?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let series = data.get(station.id).map(Vec::as_slice).unwrap_or_default();
        if series.is_empty() {
            warn!("No data available for station {}", station.id);
            return Err(PredictionError::NoData(station.id.to_string()));
        }

        let ctx = self.context();
        let result = {
            let mut noise = self.noise.lock().unwrap_or_else(PoisonError::into_inner);
            forecast::predict(station, series, target_date, &ctx, noise.as_mut())
        };

        info!(
            "Predicted {:.2} {} for {} on {} ({} records, confidence {:.1}%)",
            result.predicted_value(),
            station.kind.unit(),
            station.id,
            target_date,
            result.record_count,
            result.confidence
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = PredictionRequest::default();
        assert_eq!(request.station_id, "P42");
        assert_eq!(request.year, 2025);
        assert_eq!(request.month, 1);
    }

    #[test]
    fn test_request_deserialize_with_defaults() {
        let request: PredictionRequest = serde_json::from_str(r#"{"station_id":"H44"}"#).unwrap();
        assert_eq!(request.station_id, "H44");
        assert_eq!(request.year, 2025);
        assert_eq!(request.month, 1);
    }

    #[test]
    fn test_target_date() {
        let request = PredictionRequest::new("P42", 2025, 3);
        assert_eq!(request.target_date().unwrap(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_invalid_target_month() {
        for month in [0, 13] {
            let request = PredictionRequest::new("P42", 2025, month);
            assert_eq!(
                request.target_date().unwrap_err(),
                PredictionError::InvalidTargetDate { year: 2025, month }
            );
        }
    }
}
