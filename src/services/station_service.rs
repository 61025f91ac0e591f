use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::dataset::DatasetStore;
use crate::forecast::charts;
use crate::models::{ChartPoint, Reading};
use crate::stations::{find_station, MeasurementKind, Station, STATIONS};

#[derive(Error, Debug, PartialEq)]
pub enum StationError {
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Station data is still loading, please wait")]
    DataNotLoaded,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationSummary {
    pub id: String,
    pub name: String,
    pub kind: MeasurementKind,
    pub unit: String,
    pub resource: String,
    /// `None` while the data is still loading
    pub record_count: Option<usize>,
    #[schema(value_type = Option<String>, format = Date)]
    pub first_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub last_date: Option<NaiveDate>,
}

impl StationSummary {
    fn new(station: &Station, readings: Option<&[Reading]>) -> Self {
        Self {
            id: station.id.to_string(),
            name: station.name.to_string(),
            kind: station.kind,
            unit: station.kind.unit().to_string(),
            resource: station.resource.to_string(),
            record_count: readings.map(|r| r.len()),
            first_date: readings.and_then(|r| r.first()).map(|r| r.date),
            last_date: readings.and_then(|r| r.last()).map(|r| r.date),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationReadings {
    pub station: StationSummary,
    pub readings: Vec<Reading>,
}

#[derive(Clone)]
pub struct StationService {
    store: DatasetStore,
}

impl StationService {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }

    /// Every catalog station with its record count, in catalog order
    pub async fn list_stations(&self) -> Vec<StationSummary> {
        let data = self.store.snapshot().await;
        STATIONS
            .iter()
            .map(|station| {
                let readings = data.as_ref().map(|d| {
                    d.get(station.id).map(Vec::as_slice).unwrap_or_default()
                });
                StationSummary::new(station, readings)
            })
            .collect()
    }

    pub async fn get_station(&self, station_id: &str) -> Option<StationSummary> {
        let station = find_station(station_id)?;
        let data = self.store.snapshot().await;
        let readings = data
            .as_ref()
            .map(|d| d.get(station.id).map(Vec::as_slice).unwrap_or_default());
        Some(StationSummary::new(station, readings))
    }

    pub async fn get_readings(&self, station_id: &str) -> Result<StationReadings, StationError> {
        let station = find_station(station_id)
            .ok_or_else(|| StationError::UnknownStation(station_id.to_string()))?;
        let data = self.store.snapshot().await.ok_or(StationError::DataNotLoaded)?;
        let readings = data.get(station.id).cloned().unwrap_or_default();

        Ok(StationReadings {
            station: StationSummary::new(station, Some(&readings)),
            readings,
        })
    }

    /// Month-of-year means for the station, January first
    pub async fn get_seasonality(&self, station_id: &str) -> Result<Vec<ChartPoint>, StationError> {
        let station = find_station(station_id)
            .ok_or_else(|| StationError::UnknownStation(station_id.to_string()))?;
        let data = self.store.snapshot().await.ok_or(StationError::DataNotLoaded)?;
        let readings = data.get(station.id).map(Vec::as_slice).unwrap_or_default();

        Ok(charts::seasonality_curve(readings))
    }
}
