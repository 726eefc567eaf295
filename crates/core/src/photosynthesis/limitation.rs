//! Biochemical limits on carbon assimilation
//!
//! Combining the diffusion supply `A = g (Ca - Ci)` with the Rubisco-limited
//! or the electron-transport-limited demand gives a quadratic in `Ci` for
//! each regime:
//!
//! ```text
//! Rubisco:            A = -g
//!                     B = (Ca - Kc') g - Vcmax + Rd
//!                     C = Kc' Ca g + Vcmax Γ* + Rd Kc'
//!
//! Electron transport: A = -g
//!                     B = (Ca - 2Γ*) g - J' + Rd
//!                     C = 2Γ* Ca g + J' Γ* + 2 Rd Γ*
//! ```
//!
//! with `Kc' = Kc (1 + Oi/Ko)` and `J' = J / n_e`.
//!
//! # Scientific References
//! - Leuning, R. (1990). Aust. J. Plant Physiol., 17, 159-175
//! - Bonan, G. (2019). "Climate Change and Terrestrial Ecosystem Modeling."
//!   Cambridge University Press, Chapter 11

use super::electron_transport::ElectronTransportModel;
use super::rubisco::RubiscoRates;
use super::temperature::TemperatureResponse;
use crate::core_types::units::Kelvin;
use serde::{Deserialize, Serialize};

/// Coefficients `(a, b, c)` of `a Ci² + b Ci + c = 0`
pub type QuadraticCoefficients = (f64, f64, f64);

/// Rubisco-limited coefficients.
///
/// # Arguments
/// * `stomatal_conductance` - Stomatal conductance to CO₂ (mol m⁻² s⁻¹)
/// * `atmospheric_co2` - Ambient CO₂ `Ca` (µmol mol⁻¹)
/// * `effective_carboxylation_constant` - `Kc'` (µmol mol⁻¹)
/// * `maximum_carboxylation_rate` - `Vcmax` (µmol m⁻² s⁻¹)
/// * `co2_compensation_point` - `Γ*` (µmol mol⁻¹)
/// * `respiration_rate` - `Rd` (µmol m⁻² s⁻¹)
pub fn rubisco_limited_coefficients(
    stomatal_conductance: f64,
    atmospheric_co2: f64,
    effective_carboxylation_constant: f64,
    maximum_carboxylation_rate: f64,
    co2_compensation_point: f64,
    respiration_rate: f64,
) -> QuadraticCoefficients {
    let g = stomatal_conductance;
    let kc = effective_carboxylation_constant;
    (
        -g,
        (atmospheric_co2 - kc) * g - maximum_carboxylation_rate + respiration_rate,
        kc * atmospheric_co2 * g
            + maximum_carboxylation_rate * co2_compensation_point
            + respiration_rate * kc,
    )
}

/// Electron-transport-limited coefficients, with
/// `electron_transport_per_carboxylation` the rate `J'`.
pub fn electron_transport_limited_coefficients(
    stomatal_conductance: f64,
    atmospheric_co2: f64,
    electron_transport_per_carboxylation: f64,
    co2_compensation_point: f64,
    respiration_rate: f64,
) -> QuadraticCoefficients {
    let g = stomatal_conductance;
    let j = electron_transport_per_carboxylation;
    let gamma = co2_compensation_point;
    (
        -g,
        (atmospheric_co2 - 2.0 * gamma) * g - j + respiration_rate,
        2.0 * gamma * atmospheric_co2 * g + j * gamma + 2.0 * respiration_rate * gamma,
    )
}

/// Day respiration rate `Rd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RespirationModel {
    /// A fixed fraction of `Vcmax`
    FractionOfCarboxylation { fraction: f64 },
    /// An independent temperature response
    TemperatureDependent { response: TemperatureResponse },
}

impl Default for RespirationModel {
    fn default() -> Self {
        RespirationModel::FractionOfCarboxylation { fraction: 0.015 }
    }
}

impl RespirationModel {
    /// Q10 response with 0.2 µmol m⁻² s⁻¹ at 25°C
    pub fn q10() -> Self {
        RespirationModel::TemperatureDependent {
            response: TemperatureResponse::q10(0.2, 2.0),
        }
    }

    pub fn respiration_rate(&self, temperature: Kelvin, maximum_carboxylation_rate: f64) -> f64 {
        match self {
            RespirationModel::FractionOfCarboxylation { fraction } => {
                fraction * maximum_carboxylation_rate
            }
            RespirationModel::TemperatureDependent { response } => response.value_at(temperature),
        }
    }
}

/// Every temperature-dependent parameter of the leaf biochemistry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiochemicalParameters {
    pub rubisco: RubiscoRates,
    pub electron_transport: ElectronTransportModel,
    /// CO₂ compensation point `Γ*` (µmol mol⁻¹)
    pub co2_compensation_point: TemperatureResponse,
    pub respiration: RespirationModel,
}

impl Default for BiochemicalParameters {
    fn default() -> Self {
        Self {
            rubisco: RubiscoRates::default(),
            electron_transport: ElectronTransportModel::default(),
            co2_compensation_point: TemperatureResponse::arrhenius(42.75, 37830.0),
            respiration: RespirationModel::default(),
        }
    }
}

impl BiochemicalParameters {
    pub fn co2_compensation_point(&self, temperature: Kelvin) -> f64 {
        self.co2_compensation_point.value_at(temperature)
    }

    pub fn respiration_rate(&self, temperature: Kelvin) -> f64 {
        self.respiration
            .respiration_rate(temperature, self.rubisco.maximum_carboxylation_rate(temperature))
    }
}
