//! Static catalog of the Antisana monitoring stations

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    WaterLevel,
    Precipitation,
}

impl MeasurementKind {
    pub fn unit(&self) -> &'static str {
        match self {
            MeasurementKind::WaterLevel => "m",
            MeasurementKind::Precipitation => "mm",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MeasurementKind::WaterLevel => "Water level",
            MeasurementKind::Precipitation => "Precipitation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Station {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: MeasurementKind,
    /// Spreadsheet file name, relative to the data directory or base URL
    pub resource: &'static str,
}

pub const DEFAULT_STATION_ID: &str = "P42";

pub const STATIONS: [Station; 5] = [
    Station {
        id: "H44",
        name: "H44-Antisana DJ Diguchi",
        kind: MeasurementKind::WaterLevel,
        resource: "H44-Antisana_DJ_Diguchi_Nivel_de_agua-Mensual.xlsx",
    },
    Station {
        id: "H55",
        name: "H55-Río Antisana AC",
        kind: MeasurementKind::WaterLevel,
        resource: "H55-Río_Antisana_AC_Nivel_de_agua-Mensual.xlsx",
    },
    Station {
        id: "P42",
        name: "P42-Antisana Ramón Huañuna",
        kind: MeasurementKind::Precipitation,
        resource: "P42-Antisana_Ramón_Huañuna_Precipitación-Mensual.xlsx",
    },
    Station {
        id: "P43",
        name: "P43-Antisana Limboasi",
        kind: MeasurementKind::Precipitation,
        resource: "P43-Antisana_Limboasi_Precipitación-Mensual.xlsx",
    },
    Station {
        id: "P55",
        name: "P55-Antisana Diguchi",
        kind: MeasurementKind::Precipitation,
        resource: "P55-Antisana_Diguchi_Precipitación-Mensual.xlsx",
    },
];

/// Look up a station by code, case-insensitively ("p42" finds P42)
pub fn find_station(station_id: &str) -> Option<&'static Station> {
    let wanted = station_id.trim();
    STATIONS.iter().find(|s| s.id.eq_ignore_ascii_case(wanted))
}
