// Tests for PredictionService gating, validation and results
// Noise is pinned to the midpoint so the residual is zero

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use antisana_forecast_service::dataset::{DataStatus, DatasetStore, StationData};
use antisana_forecast_service::forecast::hydraulics;
use antisana_forecast_service::forecast::FixedNoise;
use antisana_forecast_service::models::Reading;
use antisana_forecast_service::services::{PredictionError, PredictionRequest, PredictionService};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// H44 mean is 13, its January mean is 11; P42 loaded but empty
fn station_data() -> StationData {
    let mut data = StationData::new();
    data.insert(
        "H44".to_string(),
        vec![
            Reading::new(date(2023, 1, 1), 10.0),
            Reading::new(date(2023, 2, 1), 14.0),
            Reading::new(date(2024, 1, 1), 12.0),
            Reading::new(date(2024, 3, 1), 16.0),
        ],
    );
    data.insert(
        "P43".to_string(),
        vec![
            Reading::new(date(2024, 6, 1), 80.0),
            Reading::new(date(2024, 7, 1), 120.0),
        ],
    );
    data.insert("P42".to_string(), Vec::new());
    data
}

fn service(store: DatasetStore, delay: Duration) -> PredictionService {
    PredictionService::new(store, FixedNoise::centered(), delay).with_today(date(2025, 6, 1))
}

fn loaded_service() -> PredictionService {
    service(DatasetStore::with_data(station_data()), Duration::ZERO)
}

#[tokio::test]
async fn test_rejected_while_loading() {
    let service = service(DatasetStore::new(), Duration::ZERO);

    let err = service
        .generate(&PredictionRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err, PredictionError::DataNotLoaded);
    assert_eq!(service.status().await, DataStatus::Loading);
}

#[tokio::test]
async fn test_accepted_once_loaded() {
    let store = DatasetStore::new();
    let service = service(store.clone(), Duration::ZERO);

    store.set_loaded(station_data()).await;

    assert_eq!(service.status().await, DataStatus::Ready);
    let result = service
        .generate(&PredictionRequest::new("H44", 2025, 1))
        .await
        .unwrap();
    assert_eq!(result.station_id, "H44");
}

#[tokio::test]
async fn test_water_level_prediction() {
    let result = loaded_service()
        .generate(&PredictionRequest::new("H44", 2025, 1))
        .await
        .unwrap();

    assert_eq!(result.target_date, date(2025, 1, 1));
    assert_eq!(result.record_count, 4);
    // trend 13 + seasonal (11 - 13) + residual 0
    assert!((result.predicted_level - 11.0).abs() < 1e-9);
    assert_eq!(result.predicted_value(), result.predicted_level);
    // midpoint noise fabricates 125 mm for a level gauge
    assert!((result.predicted_precipitation - 125.0).abs() < 1e-9);
    assert!((result.discharge - hydraulics::discharge(11.0)).abs() < 1e-9);
    assert!(result.max_flow <= hydraulics::SINK_CAPACITY);
    assert!((result.confidence - 85.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_precipitation_prediction_charts() {
    let result = loaded_service()
        .generate(&PredictionRequest::new("p43", 2025, 7))
        .await
        .unwrap();

    assert_eq!(result.station_id, "P43");
    // trend 100 + seasonal (120 - 100)
    assert!((result.predicted_precipitation - 120.0).abs() < 1e-9);
    assert!((result.predicted_level - 2.5).abs() < 1e-9);

    assert_eq!(result.historical.len(), 2);
    assert_eq!(result.historical[0].label, "Jun 2024");
    assert_eq!(result.projection.len(), 12);
    assert_eq!(result.projection[0].label, "Aug 2024");
    assert_eq!(result.projection[11].label, "Jul 2025");
    assert_eq!(result.seasonality.len(), 12);
    assert_eq!(result.seasonality[6].value, 120.0);
    assert_eq!(result.combined.len(), 14);
    assert_eq!(result.combined[2].historical, Some(120.0));
}

#[tokio::test]
async fn test_unknown_station() {
    let err = loaded_service()
        .generate(&PredictionRequest::new("X99", 2025, 1))
        .await
        .unwrap_err();
    assert_eq!(err, PredictionError::UnknownStation("X99".to_string()));
}

#[tokio::test]
async fn test_invalid_month() {
    let err = loaded_service()
        .generate(&PredictionRequest::new("H44", 2025, 13))
        .await
        .unwrap_err();
    assert_eq!(err, PredictionError::InvalidTargetDate { year: 2025, month: 13 });
}

#[tokio::test]
async fn test_station_without_data() {
    let service = loaded_service();

    let err = service
        .generate(&PredictionRequest::new("P42", 2025, 1))
        .await
        .unwrap_err();
    assert_eq!(err, PredictionError::NoData("P42".to_string()));

    // Not in the loaded map at all
    let err = service
        .generate(&PredictionRequest::new("H55", 2025, 1))
        .await
        .unwrap_err();
    assert_eq!(err, PredictionError::NoData("H55".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_second_request_rejected_while_in_flight() {
    let service = service(
        DatasetStore::with_data(station_data()),
        Duration::from_millis(1500),
    );

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.generate(&PredictionRequest::new("H44", 2025, 1)).await })
    };

    // Let the first request take the slot and start its delay
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(service.status().await, DataStatus::Predicting);

    let err = service
        .generate(&PredictionRequest::new("P43", 2025, 1))
        .await
        .unwrap_err();
    assert_eq!(err, PredictionError::PredictionInFlight);

    // The running prediction still completes
    let result = first.await.unwrap().unwrap();
    assert_eq!(result.station_id, "H44");
    assert_eq!(service.status().await, DataStatus::Ready);

    // And the slot is free again
    assert!(service
        .generate(&PredictionRequest::new("P43", 2025, 1))
        .await
        .is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_failed_request_releases_slot() {
    let service = service(
        DatasetStore::with_data(station_data()),
        Duration::from_millis(1500),
    );

    let err = service
        .generate(&PredictionRequest::new("P42", 2025, 1))
        .await
        .unwrap_err();
    assert_eq!(err, PredictionError::NoData("P42".to_string()));
    assert_eq!(service.status().await, DataStatus::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_status_polling_never_blocks_predictions() {
    let service = loaded_service();
    let stop = Arc::new(AtomicBool::new(false));

    let pollers: Vec<_> = (0..3)
        .map(|_| {
            let service = service.clone();
            let stop = stop.clone();
            tokio::spawn(async move {
                while !stop.load(Ordering::Relaxed) {
                    let _ = service.status().await;
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    let request = PredictionRequest::new("H44", 2025, 1);
    let mut rejected = 0;
    for _ in 0..2000 {
        if let Err(PredictionError::PredictionInFlight) = service.generate(&request).await {
            rejected += 1;
        }
    }

    stop.store(true, Ordering::Relaxed);
    for poller in pollers {
        poller.await.unwrap();
    }

    assert_eq!(rejected, 0, "status polling turned predictions away");
    assert_eq!(service.status().await, DataStatus::Ready);
}
