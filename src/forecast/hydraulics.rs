/// Rating curve coefficient (m³/s per m^b)
pub const RATING_COEFFICIENT: f64 = 0.05;
/// Rating curve exponent
pub const RATING_EXPONENT: f64 = 1.8;
/// Outlet capacity ceiling in m³/s
pub const SINK_CAPACITY: f64 = 20.0;

/// Discharge for a water level via the power-law rating curve `a * level^b`.
/// Defined for non-negative levels.
pub fn discharge(level: f64) -> f64 {
    RATING_COEFFICIENT * level.powf(RATING_EXPONENT)
}

/// Discharge limited by the outlet capacity
pub fn max_flow(discharge: f64) -> f64 {
    discharge.min(SINK_CAPACITY)
}
