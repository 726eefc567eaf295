//! Temperature dependence of biochemical rates
//!
//! Every rate is parameterised by its value at 25°C and scaled to leaf
//! temperature by one of the responses below.
//!
//! ```text
//! Arrhenius:        r(T) = r25 × exp((1 - T25/T) × Ea / (T25 R))
//! Thermal breakdown: f(T) = (1 + exp((S T25 - Hd)/(R T25))) / (1 + exp((S T - Hd)/(R T)))
//! Peaked Arrhenius: r(T) = Arrhenius(T) × f(T)
//! Q10:              r(T) = r25 × Q10^((T - T25)/10)
//! ```
//!
//! # Scientific References
//! - Medlyn, B.E. et al. (2002). "Temperature response of parameters of a
//!   biochemically based model of photosynthesis. II. A review of
//!   experimental data." Plant, Cell and Environment, 25, 1167-1179
//! - Leuning, R. (1990). Aust. J. Plant Physiol., 17, 159-175

use crate::core_types::constants::MOLAR_GAS_CONSTANT;
use crate::core_types::units::{Celsius, Kelvin};
use serde::{Deserialize, Serialize};

/// Arrhenius response (same units as `rate_at_25c`)
#[inline]
pub fn arrhenius(temperature: Kelvin, rate_at_25c: f64, activation_energy: f64) -> f64 {
    let t25 = *Kelvin::REFERENCE;
    let exponent = (1.0 - t25 / *temperature) * activation_energy / (t25 * MOLAR_GAS_CONSTANT);
    rate_at_25c * exponent.exp()
}

/// High-temperature deactivation factor, 1 at 25°C (unitless)
#[inline]
pub fn thermal_breakdown_factor(
    temperature: Kelvin,
    deactivation_energy: f64,
    entropy_term: f64,
) -> f64 {
    let t25 = *Kelvin::REFERENCE;
    let t = *temperature;
    let numerator =
        1.0 + ((entropy_term * t25 - deactivation_energy) / (MOLAR_GAS_CONSTANT * t25)).exp();
    let denominator =
        1.0 + ((entropy_term * t - deactivation_energy) / (MOLAR_GAS_CONSTANT * t)).exp();
    numerator / denominator
}

/// Arrhenius response with high-temperature deactivation
#[inline]
pub fn peaked_arrhenius(
    temperature: Kelvin,
    rate_at_25c: f64,
    activation_energy: f64,
    deactivation_energy: f64,
    entropy_term: f64,
) -> f64 {
    arrhenius(temperature, rate_at_25c, activation_energy)
        * thermal_breakdown_factor(temperature, deactivation_energy, entropy_term)
}

/// Q10 response
#[inline]
pub fn q10(temperature: Kelvin, value_at_25c: f64, q10: f64) -> f64 {
    value_at_25c * q10.powf((*temperature - *Kelvin::REFERENCE) / 10.0)
}

/// Temperature response of a single rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemperatureResponse {
    /// Temperature independent
    Constant { value: f64 },
    Arrhenius {
        rate_at_25c: f64,
        /// J mol⁻¹
        activation_energy: f64,
    },
    PeakedArrhenius {
        rate_at_25c: f64,
        /// J mol⁻¹
        activation_energy: f64,
        /// J mol⁻¹
        deactivation_energy: f64,
        /// J K⁻¹ mol⁻¹
        entropy_term: f64,
    },
    Q10 { value_at_25c: f64, q10: f64 },
    /// Forces a base response to zero in the cold: zero at or below
    /// `lower_bound`, a linear ramp up to `upper_bound`, the base response above.
    LowTemperatureAdjusted {
        base: Box<TemperatureResponse>,
        lower_bound: Kelvin,
        upper_bound: Kelvin,
    },
}

impl TemperatureResponse {
    pub fn arrhenius(rate_at_25c: f64, activation_energy: f64) -> Self {
        TemperatureResponse::Arrhenius {
            rate_at_25c,
            activation_energy,
        }
    }

    pub fn peaked_arrhenius(
        rate_at_25c: f64,
        activation_energy: f64,
        deactivation_energy: f64,
        entropy_term: f64,
    ) -> Self {
        TemperatureResponse::PeakedArrhenius {
            rate_at_25c,
            activation_energy,
            deactivation_energy,
            entropy_term,
        }
    }

    pub fn q10(value_at_25c: f64, q10: f64) -> Self {
        TemperatureResponse::Q10 { value_at_25c, q10 }
    }

    /// Ramp `base` down to zero between `upper_bound` and `lower_bound`
    pub fn low_temperature_adjusted(
        base: TemperatureResponse,
        lower_bound: Celsius,
        upper_bound: Celsius,
    ) -> Self {
        TemperatureResponse::LowTemperatureAdjusted {
            base: Box::new(base),
            lower_bound: lower_bound.to_kelvin(),
            upper_bound: upper_bound.to_kelvin(),
        }
    }

    /// Rate at the given temperature
    pub fn value_at(&self, temperature: Kelvin) -> f64 {
        match self {
            TemperatureResponse::Constant { value } => *value,
            TemperatureResponse::Arrhenius {
                rate_at_25c,
                activation_energy,
            } => arrhenius(temperature, *rate_at_25c, *activation_energy),
            TemperatureResponse::PeakedArrhenius {
                rate_at_25c,
                activation_energy,
                deactivation_energy,
                entropy_term,
            } => peaked_arrhenius(
                temperature,
                *rate_at_25c,
                *activation_energy,
                *deactivation_energy,
                *entropy_term,
            ),
            TemperatureResponse::Q10 {
                value_at_25c,
                q10: ratio,
            } => q10(temperature, *value_at_25c, *ratio),
            TemperatureResponse::LowTemperatureAdjusted {
                base,
                lower_bound,
                upper_bound,
            } => {
                if temperature <= *lower_bound {
                    return 0.0;
                }
                let value = base.value_at(temperature);
                if temperature >= *upper_bound {
                    value
                } else {
                    value * (*temperature - **lower_bound) / (**upper_bound - **lower_bound)
                }
            }
        }
    }

    /// Parameterised value at 25°C
    pub fn value_at_25c(&self) -> f64 {
        match self {
            TemperatureResponse::Constant { value } => *value,
            TemperatureResponse::Arrhenius { rate_at_25c, .. }
            | TemperatureResponse::PeakedArrhenius { rate_at_25c, .. } => *rate_at_25c,
            TemperatureResponse::Q10 { value_at_25c, .. } => *value_at_25c,
            TemperatureResponse::LowTemperatureAdjusted { base, .. } => base.value_at_25c(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn responses() -> Vec<TemperatureResponse> {
        vec![
            TemperatureResponse::Constant { value: 3.0 },
            TemperatureResponse::arrhenius(404.9, 79430.0),
            TemperatureResponse::peaked_arrhenius(30.0, 60000.0, 200000.0, 650.0),
            TemperatureResponse::q10(0.2, 2.0),
            TemperatureResponse::low_temperature_adjusted(
                TemperatureResponse::peaked_arrhenius(60.0, 30000.0, 200000.0, 650.0),
                Celsius::new(0.0),
                Celsius::new(10.0),
            ),
        ]
    }

    #[test]
    fn test_every_response_equals_its_25c_value_at_25c() {
        for response in responses() {
            assert_relative_eq!(
                response.value_at(Kelvin::REFERENCE),
                response.value_at_25c(),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_arrhenius_increases_with_temperature() {
        let response = TemperatureResponse::arrhenius(42.75, 37830.0);
        let cool = response.value_at(Celsius::new(15.0).to_kelvin());
        let warm = response.value_at(Celsius::new(35.0).to_kelvin());
        assert!(cool < 42.75 && warm > 42.75, "cool {} warm {}", cool, warm);
    }

    #[test]
    fn test_peaked_arrhenius_declines_when_hot() {
        let response = TemperatureResponse::peaked_arrhenius(30.0, 60000.0, 200000.0, 650.0);
        let optimum = response.value_at(Celsius::new(35.0).to_kelvin());
        let hot = response.value_at(Celsius::new(50.0).to_kelvin());
        assert!(hot < optimum, "hot {} optimum {}", hot, optimum);
        assert!(hot > 0.0);
    }

    #[test]
    fn test_q10_doubles_every_ten_degrees() {
        let response = TemperatureResponse::q10(0.2, 2.0);
        assert_relative_eq!(
            response.value_at(Celsius::new(35.0).to_kelvin()),
            0.4,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            response.value_at(Celsius::new(15.0).to_kelvin()),
            0.1,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_low_temperature_ramp() {
        let base = TemperatureResponse::Constant { value: 10.0 };
        let response = TemperatureResponse::low_temperature_adjusted(
            base,
            Celsius::new(0.0),
            Celsius::new(10.0),
        );
        assert_eq!(response.value_at(Celsius::new(-5.0).to_kelvin()), 0.0);
        assert_eq!(response.value_at(Kelvin::FREEZING), 0.0);
        assert_relative_eq!(
            response.value_at(Celsius::new(5.0).to_kelvin()),
            5.0,
            max_relative = 1e-9
        );
        assert_eq!(response.value_at(Celsius::new(20.0).to_kelvin()), 10.0);
    }

    #[test]
    fn test_serde_round_trip_keeps_nested_response() {
        let response = responses().pop().unwrap();
        let json = serde_json::to_string(&response).unwrap();
        let back: TemperatureResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
    }
}
