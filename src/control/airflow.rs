//! Thermal-anemometer airflow estimate.
//!
//! A heated thermocouple junction sits in the duct next to an ambient
//! reference. The flow carries heat away, so the temperature rise above
//! ambient maps to a speed: zero at or below the offset, then a
//! square-root law with the bench calibration factor.
//!
//! Pure function — no state, no I/O, fully replayable from two floats.
//! Computed in `f64` so the offset boundary lands where the decimal says
//! it does (in `f32`, `20.2 - 20.0` already exceeds `0.2`); callers with
//! single-precision readings convert at the edge.

/// Bench calibration factor (m/s per sqrt(degC)).
pub const CALIBRATION_C: f64 = 2.5;
/// Delta-T below which the flow estimate is pinned to zero (degC).
pub const TEMP_OFFSET_C: f64 = 0.2;

/// Estimated flow speed (m/s) from the ambient/thermocouple pair.
pub fn estimate_airflow(ambient_c: f64, thermocouple_c: f64) -> f64 {
    let delta = thermocouple_c - ambient_c;
    if delta <= TEMP_OFFSET_C {
        0.0
    } else {
        CALIBRATION_C * (delta - TEMP_OFFSET_C).sqrt()
    }
}
