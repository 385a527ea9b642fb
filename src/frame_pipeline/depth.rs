//! Raw depth code to metric distance conversion
//!
//! The sensor reports an 11-bit disparity-like code per pixel. Codes below
//! [`NO_RETURN_CODE`] map to meters through an empirically fitted
//! inverse-disparity curve; anything at or above it means the sensor got no
//! return and maps to `0.0`.

/// First raw code that carries no valid measurement
pub const NO_RETURN_CODE: u16 = 2047;

/// Disparity-to-depth coefficient A
/// Used in formula: meters = 1.0 / (raw * DEPTH_COEFF_A + DEPTH_COEFF_B)
pub const DEPTH_COEFF_A: f32 = -0.0030711016;
/// Disparity-to-depth coefficient B
pub const DEPTH_COEFF_B: f32 = 3.3309495161;

/// Converts one raw depth code to meters. Total over `u16`.
#[inline]
pub fn meters_from_raw(raw_code: u16) -> f32 {
    if raw_code < NO_RETURN_CODE {
        1.0 / (raw_code as f32 * DEPTH_COEFF_A + DEPTH_COEFF_B)
    } else {
        0.0
    }
}
