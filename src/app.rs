use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::dataset::DatasetStore;
use crate::forecast::RandomNoise;
use crate::importers::{SpreadsheetReader, StationLoader};
use crate::services::{PredictionService, StationService};
use crate::stations::STATIONS;

/// Application with its spawned background tasks and server
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub loader_handle: JoinHandle<()>,
    pub store: DatasetStore,
}

impl Application {
    /// Build and initialize the application
    ///
    /// The HTTP server starts immediately; station spreadsheets are loaded by
    /// a background task and predictions are refused until it finishes.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let store = DatasetStore::new();
        let fetcher = config.resource_fetcher()?;
        let loader = StationLoader::new(fetcher, SpreadsheetReader::new(config.header_rows));

        let prediction_service = PredictionService::new(
            store.clone(),
            RandomNoise::from_seed_option(config.noise_seed),
            config.prediction_delay(),
        );
        let station_service = StationService::new(store.clone());

        info!("Spawning station data loader ({})", loader.fetcher().describe());
        let loader_handle = {
            let store = store.clone();
            tokio::spawn(async move {
                load_station_data(loader, store).await;
            })
        };

        let app_state = AppState {
            prediction_service,
            station_service,
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Server listening on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

        Ok(Application {
            server_handle,
            loader_handle,
            store,
        })
    }

    /// Wait for the server to exit
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}

#[instrument(skip(loader, store))]
async fn load_station_data(loader: StationLoader, store: DatasetStore) {
    let data = loader.load_all(&STATIONS).await;
    let total: usize = data.values().map(Vec::len).sum();
    store.set_loaded(data).await;
    info!("Station data ready: {} readings across {} stations", total, STATIONS.len());
}
