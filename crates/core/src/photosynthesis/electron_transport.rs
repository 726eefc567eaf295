//! Light response of electron transport
//!
//! The electron transport rate `J` is the smaller root of the non-rectangular
//! hyperbola
//!
//! ```text
//! θ J² - (I + Jmax) J + I Jmax = 0
//! ```
//!
//! with `I` the utilised PAR and `θ` the curvature parameter.

use super::quadratic::smallest_non_negative_root;
use super::temperature::TemperatureResponse;
use crate::core_types::units::{Celsius, Kelvin};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectronTransportModel {
    /// Curvature of the light response `θ` (unitless)
    pub curvature_parameter: f64,
    /// Maximum electron transport rate `Jmax` (µmol m⁻² s⁻¹)
    pub maximum_electron_transport_rate: TemperatureResponse,
}

impl Default for ElectronTransportModel {
    fn default() -> Self {
        Self {
            curvature_parameter: 0.85,
            maximum_electron_transport_rate: TemperatureResponse::low_temperature_adjusted(
                TemperatureResponse::peaked_arrhenius(60.0, 30000.0, 200000.0, 650.0),
                Celsius::new(0.0),
                Celsius::new(10.0),
            ),
        }
    }
}

impl ElectronTransportModel {
    pub fn maximum_electron_transport_rate(&self, temperature: Kelvin) -> f64 {
        self.maximum_electron_transport_rate.value_at(temperature)
    }

    /// Electron transport rate (µmol m⁻² s⁻¹).
    ///
    /// Without light information returns `Jmax`; returns 0 when the
    /// hyperbola has no non-negative root.
    pub fn electron_transport_rate(&self, temperature: Kelvin, utilised_par: Option<f64>) -> f64 {
        let j_max = self.maximum_electron_transport_rate(temperature);
        let Some(par) = utilised_par else {
            return j_max;
        };
        smallest_non_negative_root(self.curvature_parameter, -(par + j_max), par * j_max)
            .unwrap_or(0.0)
    }
}
