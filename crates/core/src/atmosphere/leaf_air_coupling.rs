//! Leaf-air coupling: stomatal conductance implied by a transpiration rate.
//!
//! Assumes perfect coupling between leaf and atmosphere and a leaf at air
//! temperature, so the leaf-to-air vapour gradient is the air's vapour
//! pressure deficit.

use crate::core_types::conversions::stomatal_conductance_water_to_carbon;
use serde::{Deserialize, Serialize};

/// Perfectly coupled leaf-air exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeafAirCoupling;

// Perfect coupling carries no state of its own
#[allow(clippy::unused_self)]
impl LeafAirCoupling {
    /// Stomatal conductance to water (mmol m⁻² s⁻¹).
    ///
    /// ```text
    /// g_w = E × P / D
    /// ```
    ///
    /// # Arguments
    /// * `transpiration` - Transpiration rate E (mmol m⁻² s⁻¹)
    /// * `vapour_pressure_deficit` - D (kPa)
    /// * `air_pressure` - P (kPa)
    #[inline]
    pub fn stomatal_conductance_to_water(
        &self,
        transpiration: f64,
        vapour_pressure_deficit: f64,
        air_pressure: f64,
    ) -> f64 {
        transpiration * air_pressure / vapour_pressure_deficit
    }

    /// Stomatal conductance to CO2 (mmol m⁻² s⁻¹), water conductance divided
    /// by the 1.57 diffusivity ratio.
    #[inline]
    pub fn stomatal_conductance_to_carbon(
        &self,
        transpiration: f64,
        vapour_pressure_deficit: f64,
        air_pressure: f64,
    ) -> f64 {
        stomatal_conductance_water_to_carbon(self.stomatal_conductance_to_water(
            transpiration,
            vapour_pressure_deficit,
            air_pressure,
        ))
    }
}
