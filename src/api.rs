use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

use crate::dataset::DataStatus;
use crate::map::{self, MapMarker, MapStation, MapView, StationStatus, TileLayer};
use crate::models::{ChartPoint, CombinedPoint, PredictionResult, Reading};
use crate::services::station_service::StationReadings;
use crate::services::{
    PredictionError, PredictionRequest, PredictionService, StationError, StationService,
    StationSummary,
};
use crate::stations::MeasurementKind;

#[derive(Clone)]
pub struct AppState {
    pub prediction_service: PredictionService,
    pub station_service: StationService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: DataStatus,
    pub stations: Vec<StationSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error reply with a JSON body the client can show as a notification
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

impl From<PredictionError> for ApiError {
    fn from(e: PredictionError) -> Self {
        let status = match e {
            PredictionError::DataNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            PredictionError::PredictionInFlight => StatusCode::CONFLICT,
            PredictionError::UnknownStation(_) => StatusCode::NOT_FOUND,
            PredictionError::InvalidTargetDate { .. } => StatusCode::BAD_REQUEST,
            PredictionError::NoData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        ApiError::new(status, e.to_string())
    }
}

impl From<StationError> for ApiError {
    fn from(e: StationError) -> Self {
        let status = match e {
            StationError::UnknownStation(_) => StatusCode::NOT_FOUND,
            StationError::DataNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError::new(status, e.to_string())
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_status,
        get_stations,
        get_station,
        get_station_readings,
        get_station_seasonality,
        create_prediction,
        get_map
    ),
    components(schemas(
        HealthResponse,
        StatusResponse,
        ErrorResponse,
        DataStatus,
        MeasurementKind,
        StationSummary,
        StationReadings,
        Reading,
        ChartPoint,
        CombinedPoint,
        PredictionRequest,
        PredictionResult,
        MapView,
        MapMarker,
        MapStation,
        StationStatus,
        TileLayer
    )),
    tags((name = "antisana-forecast", description = "Antisana station data and predictive model"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/status", get(get_status))
        .route("/stations", get(get_stations))
        .route("/stations/{station_id}", get(get_station))
        .route("/stations/{station_id}/readings", get(get_station_readings))
        .route("/stations/{station_id}/seasonality", get(get_station_seasonality))
        .route("/predictions", post(create_prediction))
        .route("/map", get(get_map))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "antisana-forecast",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "antisana-forecast",
    responses((status = 200, description = "Data status and per-station record counts", body = StatusResponse))
)]
#[instrument(skip(state))]
async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.prediction_service.status().await;
    let stations = state.station_service.list_stations().await;
    debug!("Data status: {:?}", status);
    Json(StatusResponse { status, stations })
}

#[utoipa::path(
    get,
    path = "/api/v1/stations",
    tag = "antisana-forecast",
    responses((status = 200, description = "Station catalog", body = [StationSummary]))
)]
#[instrument(skip(state))]
async fn get_stations(State(state): State<AppState>) -> Json<Vec<StationSummary>> {
    let stations = state.station_service.list_stations().await;
    info!("Retrieved {} stations", stations.len());
    Json(stations)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}",
    tag = "antisana-forecast",
    params(("station_id" = String, Path, description = "Station code, e.g. P42")),
    responses(
        (status = 200, description = "Station found", body = StationSummary),
        (status = 404, description = "Unknown station", body = ErrorResponse)
    )
)]
#[instrument(skip(state), fields(station_id = %station_id))]
async fn get_station(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Json<StationSummary>, ApiError> {
    let station = state
        .station_service
        .get_station(&station_id)
        .await
        .ok_or_else(|| {
            warn!("Station {} not found", station_id);
            ApiError::from(StationError::UnknownStation(station_id.clone()))
        })?;

    Ok(Json(station))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}/readings",
    tag = "antisana-forecast",
    params(("station_id" = String, Path, description = "Station code, e.g. P42")),
    responses(
        (status = 200, description = "Loaded readings", body = StationReadings),
        (status = 404, description = "Unknown station", body = ErrorResponse),
        (status = 503, description = "Data still loading", body = ErrorResponse)
    )
)]
#[instrument(skip(state), fields(station_id = %station_id))]
async fn get_station_readings(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Json<StationReadings>, ApiError> {
    debug!("Fetching readings for station {}", station_id);
    let readings = state
        .station_service
        .get_readings(&station_id)
        .await
        .map_err(|e| {
            warn!("Failed to fetch readings for station {}: {}", station_id, e);
            ApiError::from(e)
        })?;

    info!(
        "Retrieved {} readings for station {}",
        readings.readings.len(),
        readings.station.id
    );
    Ok(Json(readings))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{station_id}/seasonality",
    tag = "antisana-forecast",
    params(("station_id" = String, Path, description = "Station code, e.g. P42")),
    responses(
        (status = 200, description = "Mean value per calendar month", body = [ChartPoint]),
        (status = 404, description = "Unknown station", body = ErrorResponse),
        (status = 503, description = "Data still loading", body = ErrorResponse)
    )
)]
#[instrument(skip(state), fields(station_id = %station_id))]
async fn get_station_seasonality(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Json<Vec<ChartPoint>>, ApiError> {
    let curve = state
        .station_service
        .get_seasonality(&station_id)
        .await
        .map_err(|e| {
            warn!("Failed to compute seasonality for station {}: {}", station_id, e);
            ApiError::from(e)
        })?;

    Ok(Json(curve))
}

#[utoipa::path(
    post,
    path = "/api/v1/predictions",
    tag = "antisana-forecast",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Prediction generated", body = PredictionResult),
        (status = 400, description = "Invalid target month or year", body = ErrorResponse),
        (status = 404, description = "Unknown station", body = ErrorResponse),
        (status = 409, description = "Another prediction is running", body = ErrorResponse),
        (status = 422, description = "No data for the station", body = ErrorResponse),
        (status = 503, description = "Data still loading", body = ErrorResponse),
        (status = 500, description = "Prediction failed", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(station_id = %request.station_id, year = request.year, month = request.month))]
async fn create_prediction(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResult>, ApiError> {
    debug!("Prediction requested");
    let service = state.prediction_service.clone();

    // A panic inside the model must not take the connection down with it
    let outcome = tokio::spawn(async move { service.generate(&request).await })
        .await
        .map_err(|e| {
            error!("Prediction task failed: {}", e);
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate the prediction, please try again",
            )
        })?;

    let result = outcome.map_err(|e| {
        warn!("Prediction rejected: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/map",
    tag = "antisana-forecast",
    responses(
        (status = 200, description = "Map markers and tile layers", body = MapView),
        (status = 500, description = "Map description could not be built", body = ErrorResponse)
    )
)]
#[instrument]
async fn get_map() -> Result<Json<MapView>, ApiError> {
    let view = map::map_view().map_err(|e| {
        error!("Failed to build map view: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Map is unavailable")
    })?;
    Ok(Json(view))
}
