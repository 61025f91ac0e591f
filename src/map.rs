//! Static description of the monitoring map: the volcano, the field stations
//! and the selectable base tile layers.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug, PartialEq)]
pub enum MapError {
    #[error("Expected \"lat, lon\" pair, got: {0}")]
    NotAPair(String),

    #[error("Invalid DMS coordinate: {0}")]
    InvalidDms(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Parse one degrees-minutes-seconds coordinate such as `0°32'12"S` into
/// signed decimal degrees (south and west are negative).
pub fn parse_dms(value: &str) -> Result<f64, MapError> {
    let invalid = || MapError::InvalidDms(value.to_string());
    let trimmed = value.trim();

    let hemisphere = trimmed.chars().last().ok_or_else(invalid)?;
    let sign = match hemisphere.to_ascii_uppercase() {
        'N' | 'E' => 1.0,
        'S' | 'W' => -1.0,
        _ => return Err(invalid()),
    };

    let body = &trimmed[..trimmed.len() - hemisphere.len_utf8()];
    let (degrees, rest) = body.split_once('°').ok_or_else(invalid)?;
    let (minutes, rest) = rest.split_once('\'').unwrap_or((rest, ""));
    let seconds = rest.trim_end_matches('"');

    let parse = |part: &str| -> Result<f64, MapError> {
        let part = part.trim();
        if part.is_empty() {
            Ok(0.0)
        } else {
            part.parse::<f64>().map_err(|_| invalid())
        }
    };

    let degrees = parse(degrees)?;
    let minutes = parse(minutes)?;
    let seconds = parse(seconds)?;
    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }

    Ok(sign * (degrees + minutes / 60.0 + seconds / 3600.0))
}

/// Parse `"0°32'12\"S, 78°9'36\"W"` into (latitude, longitude)
pub fn parse_dms_pair(value: &str) -> Result<(f64, f64), MapError> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| MapError::NotAPair(value.to_string()))?;
    Ok((parse_dms(lat)?, parse_dms(lon)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StationStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapMarker {
    pub name: String,
    pub coordinates: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapStation {
    pub id: String,
    pub marker: MapMarker,
    pub status: StationStatus,
    pub elevation_m: u32,
    #[schema(value_type = String, example = "2024-01-15T14:30:00")]
    pub last_reading_at: NaiveDateTime,
    pub water_level_m: f64,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TileLayer {
    pub id: String,
    pub name: String,
    pub url_template: String,
    pub attribution: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapView {
    pub volcano: MapMarker,
    pub stations: Vec<MapStation>,
    pub tile_layers: Vec<TileLayer>,
    pub default_layer: String,
    pub zoom: u8,
}

const VOLCANO_NAME: &str = "Volcán Antisana";
const VOLCANO_COORDINATES: &str = "0°28'53\"S, 78°08'29\"W";
const DEFAULT_ZOOM: u8 = 12;

struct StationSite {
    id: &'static str,
    name: &'static str,
    coordinates: &'static str,
    elevation_m: u32,
    last_reading_at: &'static str,
    water_level_m: f64,
    temperature_c: f64,
}

// Display-only field sites; the readings here are illustrative
const STATION_SITES: [StationSite; 3] = [
    StationSite {
        id: "P42",
        name: "P42-Antisana Ramón Huañuna",
        coordinates: "0°32'12\"S, 78°9'36\"W",
        elevation_m: 4250,
        last_reading_at: "2024-01-15 14:30",
        water_level_m: 2.35,
        temperature_c: 8.5,
    },
    StationSite {
        id: "P43",
        name: "P43-Antisana Limboasi",
        coordinates: "0°28'45\"S, 78°11'22\"W",
        elevation_m: 3980,
        last_reading_at: "2024-01-15 14:32",
        water_level_m: 1.87,
        temperature_c: 9.2,
    },
    StationSite {
        id: "P55",
        name: "P55-Antisana Diguchi",
        coordinates: "0°35'18\"S, 78°7'54\"W",
        elevation_m: 4100,
        last_reading_at: "2024-01-15 14:28",
        water_level_m: 3.12,
        temperature_c: 7.8,
    },
];

fn marker(name: &str, coordinates: &str) -> Result<MapMarker, MapError> {
    let (latitude, longitude) = parse_dms_pair(coordinates)?;
    Ok(MapMarker {
        name: name.to_string(),
        coordinates: coordinates.to_string(),
        latitude,
        longitude,
    })
}

pub fn tile_layers() -> Vec<TileLayer> {
    vec![
        TileLayer {
            id: "satellite".to_string(),
            name: "Satellite".to_string(),
            url_template:
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
                    .to_string(),
            attribution: "Tiles &copy; Esri".to_string(),
        },
        TileLayer {
            id: "terrain".to_string(),
            name: "Terrain".to_string(),
            url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "Map data: &copy; OpenStreetMap contributors, SRTM | Map style: &copy; OpenTopoMap (CC-BY-SA)"
                .to_string(),
        },
        TileLayer {
            id: "street".to_string(),
            name: "Street".to_string(),
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
        },
    ]
}

/// Assemble the full map description
pub fn map_view() -> Result<MapView, MapError> {
    let stations = STATION_SITES
        .iter()
        .map(|site| -> Result<MapStation, MapError> {
            let last_reading_at = NaiveDateTime::parse_from_str(site.last_reading_at, "%Y-%m-%d %H:%M")
                .map_err(|_| MapError::InvalidTimestamp(site.last_reading_at.to_string()))?;
            Ok(MapStation {
                id: site.id.to_string(),
                marker: marker(site.name, site.coordinates)?,
                status: StationStatus::Active,
                elevation_m: site.elevation_m,
                last_reading_at,
                water_level_m: site.water_level_m,
                temperature_c: site.temperature_c,
            })
        })
        .collect::<Result<Vec<_>, MapError>>()?;

    Ok(MapView {
        volcano: marker(VOLCANO_NAME, VOLCANO_COORDINATES)?,
        stations,
        tile_layers: tile_layers(),
        default_layer: "satellite".to_string(),
        zoom: DEFAULT_ZOOM,
    })
}
