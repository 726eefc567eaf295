//! Vapour pressure and vapour pressure deficit.
//!
//! # References
//!
//! - Tetens, O. (1930). Saturation vapour pressure over water.
//! - Lowe, P.R. (1977). Sixth-order polynomial fit, extended here to eight.

use crate::core_types::constants::WATER_TO_AIR_MOLAR_MASS_RATIO;
use crate::core_types::conversions::{magnitude_conversion, SiPrefix};
use crate::core_types::units::Kelvin;
use serde::{Deserialize, Serialize};

/// Floor applied to the vapour pressure deficit (kPa).
pub const MINIMUM_VAPOUR_PRESSURE_DEFICIT: f64 = 0.05;

/// Saturation vapour pressure of air (kPa), Tetens formula.
///
/// ```text
/// e_sat = 0.61078 × exp(17.27 T / (237.3 + T)),  T in °C
/// ```
pub fn saturation_vapour_pressure(air_temperature: Kelvin) -> f64 {
    let t = *air_temperature.to_celsius();
    0.61078 * ((17.27 * t) / (237.3 + t)).exp()
}

/// Actual vapour pressure (Pa) from specific humidity (kg kg⁻¹) and air
/// pressure (Pa).
pub fn vapour_pressure(specific_humidity: f64, air_pressure: f64) -> f64 {
    (specific_humidity * air_pressure)
        / (WATER_TO_AIR_MOLAR_MASS_RATIO
            + (1.0 - WATER_TO_AIR_MOLAR_MASS_RATIO) * specific_humidity)
}

/// Vapour pressure deficit (kPa), never below `minimum`.
///
/// # Arguments
/// * `air_temperature` - Air temperature
/// * `specific_humidity` - Specific humidity (kg kg⁻¹)
/// * `air_pressure` - Air pressure (Pa)
/// * `minimum` - Floor on the deficit (kPa), usually [`MINIMUM_VAPOUR_PRESSURE_DEFICIT`]
pub fn vapour_pressure_deficit(
    air_temperature: Kelvin,
    specific_humidity: f64,
    air_pressure: f64,
    minimum: f64,
) -> f64 {
    let saturated = saturation_vapour_pressure(air_temperature);
    let actual = magnitude_conversion(
        vapour_pressure(specific_humidity, air_pressure),
        SiPrefix::Unit,
        SiPrefix::Kilo,
    );
    (saturated - actual).max(minimum)
}

/// Polynomial fit of saturated vapour pressure.
///
/// ```text
/// e_sat(T) = 100 [a0 + T(a1 + T(... (a7 + T a8)...))]
/// ```
/// With the default coefficients `T` is in °C and the result in Pa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaturatedVapourPressurePolynomial {
    pub coefficients: Vec<f64>,
}

impl Default for SaturatedVapourPressurePolynomial {
    fn default() -> Self {
        Self {
            coefficients: vec![
                6.11213476,
                4.44007856e-1,
                1.43064234e-2,
                2.64461437e-4,
                3.05903558e-6,
                1.96237241e-8,
                8.92344772e-11,
                -3.73208410e-13,
                2.09339997e-16,
            ],
        }
    }
}

impl SaturatedVapourPressurePolynomial {
    /// Evaluate by Horner's scheme
    pub fn vapour_pressure(&self, temperature: f64) -> f64 {
        let sum = self
            .coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, a| acc * temperature + a);
        100.0 * sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::Celsius;

    #[test]
    fn test_tetens_at_twenty_degrees() {
        let es = saturation_vapour_pressure(Celsius::new(20.0).to_kelvin());
        // Standard tables give 2.34 kPa at 20°C
        assert!((es - 2.338).abs() < 0.01, "e_sat was {}", es);
    }

    #[test]
    fn test_vapour_pressure_deficit_is_floored() {
        // Saturated air: deficit collapses to the floor
        let t = Celsius::new(15.0).to_kelvin();
        let vpd = vapour_pressure_deficit(t, 0.05, 101_325.0, MINIMUM_VAPOUR_PRESSURE_DEFICIT);
        assert_eq!(vpd, MINIMUM_VAPOUR_PRESSURE_DEFICIT);

        // Dry air: deficit close to saturation pressure
        let t = Celsius::new(30.0).to_kelvin();
        let vpd = vapour_pressure_deficit(t, 0.002, 101_325.0, MINIMUM_VAPOUR_PRESSURE_DEFICIT);
        assert!(vpd > 3.5 && vpd < saturation_vapour_pressure(t), "VPD was {}", vpd);
    }

    #[test]
    fn test_polynomial_matches_tetens() {
        let polynomial = SaturatedVapourPressurePolynomial::default();
        let pa = polynomial.vapour_pressure(20.0);
        let tetens = saturation_vapour_pressure(Celsius::new(20.0).to_kelvin()) * 1000.0;
        assert!((pa - tetens).abs() / tetens < 0.01, "polynomial {} vs Tetens {}", pa, tetens);
        assert!((polynomial.vapour_pressure(0.0) - 611.213476).abs() < 1e-9);
    }
}
