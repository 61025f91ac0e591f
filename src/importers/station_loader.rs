use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::spreadsheet_reader::{ReadError, SpreadsheetReader};
use crate::fetch_error::FetchError;
use crate::fetcher::ResourceFetcher;
use crate::models::Reading;
use crate::stations::Station;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse failed: {0}")]
    Read(#[from] ReadError),
}

/// Fetches a station's spreadsheet and turns it into a series
#[derive(Clone, Debug)]
pub struct StationLoader {
    fetcher: ResourceFetcher,
    reader: SpreadsheetReader,
}

impl StationLoader {
    pub fn new(fetcher: ResourceFetcher, reader: SpreadsheetReader) -> Self {
        Self { fetcher, reader }
    }

    pub fn fetcher(&self) -> &ResourceFetcher {
        &self.fetcher
    }

    /// Fetch and parse one station, surfacing the failure
    pub async fn try_load(&self, station: &Station) -> Result<Vec<Reading>, LoadError> {
        let bytes = self.fetcher.fetch(station.resource).await?;
        let reader = self.reader.clone();

        // calamine is synchronous and unzips the whole workbook
        let readings = tokio::task::spawn_blocking(move || reader.read_bytes(bytes))
            .await
            .map_err(|e| ReadError::WorkbookOpen(format!("reader task failed: {e}")))??;

        Ok(readings)
    }

    /// Fetch and parse one station. Any failure is logged and yields an empty
    /// series, which callers treat as "no data available".
    #[instrument(skip(self, station), fields(station_id = station.id))]
    pub async fn load(&self, station: &Station) -> Vec<Reading> {
        match self.try_load(station).await {
            Ok(readings) => {
                info!("Loaded {} readings from {}", readings.len(), station.resource);
                readings
            }
            Err(e) => {
                warn!("Error loading {}: {}", station.resource, e);
                Vec::new()
            }
        }
    }

    /// Load stations one after another. A failing station gets an empty
    /// series and does not stop the others.
    pub async fn load_all(&self, stations: &[Station]) -> HashMap<String, Vec<Reading>> {
        let mut data = HashMap::with_capacity(stations.len());

        for station in stations {
            let readings = self.load(station).await;
            data.insert(station.id.to_string(), readings);
        }

        let empty = data.values().filter(|r| r.is_empty()).count();
        if empty > 0 {
            warn!(
                "{} of {} stations have no data available",
                empty,
                stations.len()
            );
        }
        info!("Finished loading {} stations from {}", stations.len(), self.fetcher.describe());
        data
    }
}
