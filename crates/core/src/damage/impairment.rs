//! Rate-based impairment, recovery, growth and death of conducting xylem
//!
//! The maximum conductance relaxes continuously instead of jumping at a
//! threshold. With `k` the current and `k0` the undamaged maximum, `k_leaf`
//! the conductance at the leaf potential and `h = k/k0`:
//!
//! ```text
//! recovery   = (k0 - k) × r_r (k_leaf/k)^s_r × dt
//! impairment = k × r_i (1 - k_leaf/k)^s_i × dt
//! growth     = (k0 - k) × g × dt
//! death      = (k0 h^s_d - k) × d × dt
//! k'         = k + recovery - impairment + growth - death
//! ```
//!
//! Sapwood area changes by `(g - d) × dt` each step.

use crate::core_types::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Rate constants (s⁻¹) and shape exponents of the impairment model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpairmentRates {
    pub recovery_rate: f64,
    pub impairment_rate: f64,
    pub growth_rate: f64,
    pub death_rate: f64,
    pub recovery_shape: f64,
    pub impairment_shape: f64,
    pub death_shape: f64,
}

impl Default for ImpairmentRates {
    fn default() -> Self {
        Self {
            recovery_rate: 0.01,
            impairment_rate: 0.01,
            growth_rate: 0.01,
            death_rate: 0.01,
            recovery_shape: 1.0,
            impairment_shape: 1.0,
            death_shape: 1.0,
        }
    }
}

impl ImpairmentRates {
    /// # Errors
    /// [`ModelError::InvalidInput`] for negative or non-finite values.
    pub fn validate(&self) -> ModelResult<()> {
        let named = [
            ("recovery rate", self.recovery_rate),
            ("impairment rate", self.impairment_rate),
            ("growth rate", self.growth_rate),
            ("death rate", self.death_rate),
            ("recovery shape", self.recovery_shape),
            ("impairment shape", self.impairment_shape),
            ("death shape", self.death_shape),
        ];
        for (name, value) in named {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ModelError::InvalidInput(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Change in sapwood area over one timestep
    #[inline]
    pub fn sapwood_area_change(&self, timestep: f64) -> f64 {
        (self.growth_rate - self.death_rate) * timestep
    }

    /// Maximum conductance after one timestep, before clamping and refitting.
    ///
    /// # Arguments
    /// * `maximum_conductance` - Current maximum conductance `k`
    /// * `base_maximum_conductance` - Undamaged maximum conductance `k0`
    /// * `leaf_conductance` - Conductance at the leaf water potential
    /// * `timestep` - Timestep length (s)
    pub fn next_maximum_conductance(
        &self,
        maximum_conductance: f64,
        base_maximum_conductance: f64,
        leaf_conductance: f64,
        timestep: f64,
    ) -> f64 {
        let k = maximum_conductance;
        let k0 = base_maximum_conductance;
        let leaf_fraction = if k > 0.0 {
            (leaf_conductance / k).max(0.0).min(1.0)
        } else {
            0.0
        };
        let healthy_fraction = k / k0;

        let recovery =
            (k0 - k) * self.recovery_rate * leaf_fraction.powf(self.recovery_shape) * timestep;
        let impairment =
            k * self.impairment_rate * (1.0 - leaf_fraction).powf(self.impairment_shape) * timestep;
        let growth = (k0 - k) * self.growth_rate * timestep;
        let death = (k0 * healthy_fraction.powf(self.death_shape) - k) * self.death_rate * timestep;

        k + recovery - impairment + growth - death
    }
}
