//! Xylem hydraulic conductance models
//!
//! A vulnerability curve maps xylem water potential (`MPa`, ≤ 0 under tension)
//! to hydraulic conductance (mmol m⁻² s⁻¹ `MPa`⁻¹). All models implement the
//! [`ConductanceModel`] trait so the hydraulic cost model and the optimiser
//! can hold any of them behind a `Box<dyn ConductanceModel>`:
//! - [`WeibullCurve`]: static cumulative Weibull curve
//! - [`SoxCurve`]: static sigmoidal curve
//! - [`CappedConductanceModel`]: conductance capped at a remembered minimum
//! - [`AgeStructuredConductanceModel`]: cohorts of xylem that age and turn over
//! - [`WholeTrunkConductanceModel`]: remembers the most extreme potentials
//!
//! Dynamic Weibull curves whose parameters are refitted by embolism damage
//! live in [`crate::damage`].
//!
//! # Scientific References
//! - Sperry, J.S. et al. (2016). "Pragmatic hydraulic theory predicts stomatal
//!   responses to climatic water deficits." New Phytologist, 212, 577-589
//! - Eller, C.B. et al. (2018). "Modelling tropical forest responses to drought
//!   and El Niño with a stomatal optimization model based on xylem hydraulics."
//!   Phil. Trans. R. Soc. B, 373
//! - Mackay, D.S. et al. (2015). "Interdependence of chronic hydraulic
//!   dysfunction and canopy processes can improve integrated models of tree
//!   response to drought." Water Resources Research, 51

mod age_structured;
mod capped;
mod sox;
mod weibull;
mod whole_trunk;

pub use age_structured::AgeStructuredConductanceModel;
pub use capped::CappedConductanceModel;
pub use sox::{sox_conductance, SoxCurve, SoxParameters};
pub use weibull::{weibull_conductance, WeibullCurve, WeibullParameters};
pub use whole_trunk::WholeTrunkConductanceModel;

use crate::core_types::error::{ModelError, ModelResult};
use crate::core_types::numerics::trapezium_integral;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of trapezium samples for transpiration integrals
pub const DEFAULT_TRANSPIRATION_STEPS: usize = 100;

/// Thresholds steering the damage/recovery state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageThresholds {
    /// Loss fraction at which the xylem is considered to have failed (unitless)
    pub critical_conductance_loss_fraction: f64,
    /// Water potential at or above which the xylem recovers (`MPa`)
    pub xylem_recovery_water_potential: f64,
    /// Loss of conductance below the current maximum needed to trigger damage (unitless)
    pub plc_damage_threshold: f64,
}

impl Default for DamageThresholds {
    fn default() -> Self {
        Self {
            critical_conductance_loss_fraction: 0.9,
            xylem_recovery_water_potential: 0.0,
            plc_damage_threshold: 0.1,
        }
    }
}

impl DamageThresholds {
    /// Thresholds used by the embolism refit models (5% damage trigger)
    pub fn mackay() -> Self {
        Self {
            plc_damage_threshold: 0.05,
            ..Self::default()
        }
    }

    /// Check that the fractions are proper fractions.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] when a fraction lies outside its range.
    pub fn validate(&self) -> ModelResult<()> {
        let critical = self.critical_conductance_loss_fraction;
        if !(critical > 0.0 && critical < 1.0) {
            return Err(ModelError::InvalidInput(format!(
                "critical conductance loss fraction must lie in (0, 1), got {critical}"
            )));
        }
        let plc = self.plc_damage_threshold;
        if !(0.0..1.0).contains(&plc) {
            return Err(ModelError::InvalidInput(format!(
                "PLC damage threshold must lie in [0, 1), got {plc}"
            )));
        }
        if !self.xylem_recovery_water_potential.is_finite() {
            return Err(ModelError::InvalidInput(
                "xylem recovery water potential must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check that a loss fraction lies in `[0, 1)`.
pub(crate) fn check_loss_fraction(loss_fraction: f64) -> ModelResult<()> {
    if (0.0..1.0).contains(&loss_fraction) {
        Ok(())
    } else {
        Err(ModelError::domain(
            "conductance loss fraction",
            loss_fraction,
            "[0, 1)",
        ))
    }
}

/// Interface shared by every hydraulic conductance model.
///
/// Conductance is non-increasing as water potential becomes more negative
/// and saturates at [`maximum_conductance`](Self::maximum_conductance) for
/// non-negative potentials. Damage updates mutate the model in place once
/// per simulated timestep.
pub trait ConductanceModel: Send + Sync + fmt::Debug {
    /// Conductance at a water potential (mmol m⁻² s⁻¹ `MPa`⁻¹)
    fn conductance(&self, water_potential: f64) -> f64;

    /// Conductance at a point along the soil-to-leaf path.
    ///
    /// Only path-aware models use the leaf and soil potentials; the rest
    /// evaluate [`conductance`](Self::conductance).
    fn conductance_along_path(
        &self,
        water_potential: f64,
        _leaf_water_potential: f64,
        _soil_water_potential: f64,
    ) -> f64 {
        self.conductance(water_potential)
    }

    /// Current maximum conductance (mmol m⁻² s⁻¹ `MPa`⁻¹)
    fn maximum_conductance(&self) -> f64;

    /// Maximum conductance of the undamaged xylem (mmol m⁻² s⁻¹ `MPa`⁻¹)
    fn healthy_maximum_conductance(&self) -> f64;

    /// Damage and recovery thresholds
    fn thresholds(&self) -> &DamageThresholds;

    /// Water potential at which the given fraction of the current maximum
    /// conductance is lost.
    ///
    /// # Errors
    /// [`ModelError::Domain`] unless `0 ≤ loss_fraction < 1`.
    fn water_potential_from_loss_fraction(&self, loss_fraction: f64) -> ModelResult<f64>;

    /// Water potential at which the curve reaches `conductance`.
    ///
    /// # Errors
    /// [`ModelError::Domain`] unless `0 < conductance ≤ maximum_conductance`.
    fn water_potential_from_conductance(&self, conductance: f64) -> ModelResult<f64> {
        let k_max = self.maximum_conductance();
        if conductance.is_nan() || conductance <= 0.0 || conductance > k_max {
            return Err(ModelError::domain(
                "conductance",
                conductance,
                "(0, maximum conductance]",
            ));
        }
        self.water_potential_from_loss_fraction(1.0 - conductance / k_max)
    }

    /// Transpiration between two water potentials (mmol m⁻² s⁻¹).
    ///
    /// Trapezium integral of conductance from `min_water_potential` to
    /// `max_water_potential` over `steps` samples.
    fn transpiration(
        &self,
        min_water_potential: f64,
        max_water_potential: f64,
        steps: usize,
    ) -> f64 {
        trapezium_integral(
            |psi| self.conductance(psi),
            min_water_potential,
            max_water_potential,
            steps,
        )
    }

    /// Critical conductance loss fraction (unitless)
    fn critical_conductance_loss_fraction(&self) -> f64 {
        self.thresholds().critical_conductance_loss_fraction
    }

    /// Water potential at the critical conductance loss (`MPa`).
    ///
    /// # Errors
    /// Propagates [`ModelError::Domain`] from the inverse mapping.
    fn critical_water_potential(&self) -> ModelResult<f64> {
        self.water_potential_from_loss_fraction(self.critical_conductance_loss_fraction())
    }

    /// Maximum conductance scaled by the critical loss fraction
    fn critical_conductance(&self) -> f64 {
        self.maximum_conductance() * self.critical_conductance_loss_fraction()
    }

    /// Percentage loss of conductance relative to the healthy xylem (%)
    fn plc(&self, water_potential: f64) -> f64 {
        100.0 * (1.0 - self.conductance(water_potential) / self.healthy_maximum_conductance())
    }

    /// Check that damage updates accept `timestep` (s).
    ///
    /// # Errors
    /// [`ModelError::TimestepMismatch`] for models bound to a fixed step.
    fn check_timestep(&self, _timestep: f64) -> ModelResult<()> {
        Ok(())
    }

    /// Advance the damage state by one timestep.
    ///
    /// Recovers when `water_potential` is at or above the recovery potential,
    /// damages when conductance has fallen by the PLC threshold below the
    /// current maximum, and does nothing otherwise.
    ///
    /// # Arguments
    /// * `water_potential` - Leaf water potential this timestep (`MPa`)
    /// * `timestep` - Timestep length (s)
    /// * `transpiration_rate` - Transpiration this timestep (mmol m⁻² s⁻¹)
    /// * `root_water_potential` - Root (soil) water potential (`MPa`)
    ///
    /// # Returns
    /// Whether a damage or recovery event changed the curve. Continuous
    /// sapwood impairment reports `false` even though it moves the curve.
    ///
    /// # Errors
    /// Model specific, e.g. [`ModelError::TimestepMismatch`].
    fn update_xylem_damage(
        &mut self,
        water_potential: f64,
        timestep: f64,
        transpiration_rate: f64,
        root_water_potential: f64,
    ) -> ModelResult<bool> {
        threshold_update(
            self,
            water_potential,
            timestep,
            transpiration_rate,
            root_water_potential,
        )
    }

    /// Damage branch of the state machine. Static curves never change.
    ///
    /// # Errors
    /// Model specific.
    fn damage_xylem(
        &mut self,
        _water_potential: f64,
        _timestep: f64,
        _transpiration_rate: f64,
        _root_water_potential: f64,
    ) -> ModelResult<bool> {
        Ok(false)
    }

    /// Recovery branch of the state machine. Static curves never change.
    ///
    /// # Errors
    /// Model specific.
    fn recover_xylem(
        &mut self,
        _water_potential: f64,
        _timestep: f64,
        _root_water_potential: f64,
    ) -> ModelResult<bool> {
        Ok(false)
    }

    /// Restore the undamaged state
    fn reset_xylem_damage(&mut self) {}
}

/// Threshold-driven recover/damage/no-op state machine.
///
/// Shared by the trait default and by models that override
/// [`ConductanceModel::update_xylem_damage`] for only some configurations.
pub(crate) fn threshold_update<M>(
    model: &mut M,
    water_potential: f64,
    timestep: f64,
    transpiration_rate: f64,
    root_water_potential: f64,
) -> ModelResult<bool>
where
    M: ConductanceModel + ?Sized,
{
    let thresholds = *model.thresholds();
    if water_potential >= thresholds.xylem_recovery_water_potential {
        return model.recover_xylem(water_potential, timestep, root_water_potential);
    }

    let conductance = model.conductance(water_potential);
    if conductance <= model.maximum_conductance() * (1.0 - thresholds.plc_damage_threshold) {
        return model.damage_xylem(
            water_potential,
            timestep,
            transpiration_rate,
            root_water_potential,
        );
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_valid() {
        assert!(DamageThresholds::default().validate().is_ok());
        assert!(DamageThresholds::mackay().validate().is_ok());
        assert_eq!(DamageThresholds::mackay().plc_damage_threshold, 0.05);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let thresholds = DamageThresholds {
            critical_conductance_loss_fraction: 1.0,
            ..DamageThresholds::default()
        };
        assert!(thresholds.validate().is_err());

        let thresholds = DamageThresholds {
            plc_damage_threshold: -0.1,
            ..DamageThresholds::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_loss_fraction_domain() {
        assert!(check_loss_fraction(0.0).is_ok());
        assert!(check_loss_fraction(0.999).is_ok());
        assert!(check_loss_fraction(1.0).is_err());
        assert!(check_loss_fraction(-0.1).is_err());
        assert!(check_loss_fraction(f64::NAN).is_err());
    }
}
