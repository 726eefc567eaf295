//! CO₂ gain of a transpiration rate
//!
//! Transpiration is turned into a stomatal conductance to CO₂ by the leaf-air
//! coupling, then into net assimilation by the photosynthesis model. The
//! gain of a whole curve is assimilation normalised by its largest value.

use super::drivers::Drivers;
use crate::atmosphere::LeafAirCoupling;
use crate::core_types::conversions::{magnitude_conversion, SiPrefix};
use crate::core_types::numerics::nan_max;
use crate::photosynthesis::PhotosynthesisModel;
use serde::{Deserialize, Serialize};

/// Assimilation at one transpiration rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarbonUptake {
    /// Net assimilation (µmol m⁻² s⁻¹)
    pub net_assimilation: f64,
    /// Intercellular CO₂ (µmol mol⁻¹)
    pub intercellular_co2: f64,
    /// Stomatal conductance to CO₂ (mol m⁻² s⁻¹)
    pub stomatal_conductance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CO2GainModel {
    pub coupling: LeafAirCoupling,
    pub photosynthesis: PhotosynthesisModel,
}

impl CO2GainModel {
    pub fn new(photosynthesis: PhotosynthesisModel) -> Self {
        Self {
            coupling: LeafAirCoupling,
            photosynthesis,
        }
    }

    /// Stomatal conductance to CO₂ (mol m⁻² s⁻¹) sustaining `transpiration`
    /// (mmol m⁻² s⁻¹)
    pub fn stomatal_conductance(&self, transpiration: f64, drivers: &Drivers) -> f64 {
        let millimoles = self.coupling.stomatal_conductance_to_carbon(
            transpiration,
            drivers.vapour_pressure_deficit,
            drivers.air_pressure,
        );
        magnitude_conversion(millimoles, SiPrefix::Milli, SiPrefix::Unit)
    }

    pub fn carbon_uptake(&self, transpiration: f64, drivers: &Drivers) -> CarbonUptake {
        let stomatal_conductance = self.stomatal_conductance(transpiration, drivers);
        let (net_assimilation, intercellular_co2) = self
            .photosynthesis
            .net_assimilation(&drivers.leaf_conditions(stomatal_conductance));
        CarbonUptake {
            net_assimilation,
            intercellular_co2,
            stomatal_conductance,
        }
    }
}

/// Normalised gain of each assimilation value and the normaliser.
///
/// The gain is zero everywhere when no value is positive. NaN values stay
/// NaN so the profit search can skip them.
pub fn normalised_gain(net_assimilation: &[f64]) -> (Vec<f64>, f64) {
    let maximum = nan_max(net_assimilation).unwrap_or(0.0);
    if maximum <= 0.0 {
        let zeros = net_assimilation
            .iter()
            .map(|a| if a.is_nan() { f64::NAN } else { 0.0 })
            .collect();
        return (zeros, maximum);
    }
    (net_assimilation.iter().map(|a| a / maximum).collect(), maximum)
}
