pub mod prediction_service;
pub mod station_service;

pub use prediction_service::{PredictionError, PredictionRequest, PredictionService};
pub use station_service::{StationError, StationService, StationSummary};
