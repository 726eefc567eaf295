//! Carboxylation and oxygenation by Rubisco
//!
//! Rubisco binds either CO₂ or O₂, so each gas competitively inhibits the
//! other's reaction. The kinetic constants follow Arrhenius responses and the
//! maximum carboxylation rate a peaked Arrhenius response.
//!
//! # Scientific References
//! - Farquhar, G.D., von Caemmerer, S. & Berry, J.A. (1980). Planta, 149, 78-90
//! - Leuning, R. (1990). "Modelling stomatal behaviour and photosynthesis of
//!   Eucalyptus grandis." Aust. J. Plant Physiol., 17, 159-175

use super::michaelis_menten::{competitive_michaelis_menten_constant, michaelis_menten_response};
use super::temperature::TemperatureResponse;
use crate::core_types::units::Kelvin;
use serde::{Deserialize, Serialize};

/// Temperature responses of the Rubisco kinetic parameters.
///
/// CO₂ quantities are in µmol mol⁻¹, O₂ quantities in mmol mol⁻¹.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubiscoRates {
    /// Maximum carboxylation rate `Vcmax` (µmol m⁻² s⁻¹)
    pub maximum_carboxylation_rate: TemperatureResponse,
    /// Michaelis constant for CO₂ `Kc`
    pub michaelis_menten_constant_co2: TemperatureResponse,
    /// Michaelis constant for O₂ `Ko`
    pub michaelis_menten_constant_o2: TemperatureResponse,
}

impl Default for RubiscoRates {
    fn default() -> Self {
        Self {
            maximum_carboxylation_rate: TemperatureResponse::peaked_arrhenius(
                30.0, 60000.0, 200000.0, 650.0,
            ),
            michaelis_menten_constant_co2: TemperatureResponse::arrhenius(404.9, 79430.0),
            michaelis_menten_constant_o2: TemperatureResponse::arrhenius(278.4, 36380.0),
        }
    }
}

impl RubiscoRates {
    pub fn maximum_carboxylation_rate(&self, temperature: Kelvin) -> f64 {
        self.maximum_carboxylation_rate.value_at(temperature)
    }

    pub fn michaelis_menten_constant_co2(&self, temperature: Kelvin) -> f64 {
        self.michaelis_menten_constant_co2.value_at(temperature)
    }

    pub fn michaelis_menten_constant_o2(&self, temperature: Kelvin) -> f64 {
        self.michaelis_menten_constant_o2.value_at(temperature)
    }

    /// Effective carboxylation constant `Kc (1 + Oi/Ko)` (µmol mol⁻¹)
    pub fn effective_carboxylation_constant(
        &self,
        temperature: Kelvin,
        intercellular_o2: f64,
    ) -> f64 {
        competitive_michaelis_menten_constant(
            intercellular_o2,
            self.michaelis_menten_constant_o2(temperature),
            self.michaelis_menten_constant_co2(temperature),
        )
    }

    /// Effective oxygenation constant `Ko (1 + Ci/Kc)` (mmol mol⁻¹)
    pub fn effective_oxygenation_constant(
        &self,
        temperature: Kelvin,
        intercellular_co2: f64,
    ) -> f64 {
        competitive_michaelis_menten_constant(
            intercellular_co2,
            self.michaelis_menten_constant_co2(temperature),
            self.michaelis_menten_constant_o2(temperature),
        )
    }

    /// CO₂ uptake by carboxylation (µmol m⁻² s⁻¹)
    pub fn carboxylation_rate(
        &self,
        intercellular_co2: f64,
        intercellular_o2: f64,
        temperature: Kelvin,
    ) -> f64 {
        michaelis_menten_response(
            intercellular_co2,
            self.maximum_carboxylation_rate(temperature),
            self.effective_carboxylation_constant(temperature, intercellular_o2),
        )
    }

    /// O₂ uptake by oxygenation, scaled by the maximum carboxylation rate
    pub fn oxygenation_rate(
        &self,
        intercellular_o2: f64,
        intercellular_co2: f64,
        temperature: Kelvin,
    ) -> f64 {
        michaelis_menten_response(
            intercellular_o2,
            self.maximum_carboxylation_rate(temperature),
            self.effective_oxygenation_constant(temperature, intercellular_co2),
        )
    }
}
