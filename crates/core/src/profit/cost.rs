//! Hydraulic cost of opening the stomata
//!
//! The cost is a unitless measure of how much conductance the xylem gives
//! up when the leaf is drawn down to a water potential, normalised so that
//! reaching the critical potential costs 1.
//!
//! ```text
//! ProfitMax: C(ψ) = (k(ψs) - k(ψ)) / (k(ψs) - k_crit)
//! SOX:       C(ψ) = 1 - (k((ψ + ψs)/2) - k_crit) / (k_max - k_crit)
//! ```
//!
//! # Scientific References
//! - Sperry, J.S. et al. (2017). "Predicting stomatal responses to the
//!   environment from the optimization of photosynthetic gain and hydraulic
//!   cost." Plant, Cell & Environment, 40, 816-830
//! - Eller, C.B. et al. (2018). Phil. Trans. R. Soc. B, 373

use crate::conductance::{check_loss_fraction, ConductanceModel};
use crate::core_types::error::ModelResult;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Form of the cost curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HydraulicCostKind {
    /// Conductance lost between the soil and the leaf
    #[default]
    ProfitMax,
    /// Conductance lost at the mid-point of the soil-to-leaf path
    Sox,
}

/// Cost model bound to the critical point of one conductance curve.
///
/// The critical water potential and its conductance are evaluated once at
/// construction and stay fixed while the curve is later damaged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydraulicCost {
    kind: HydraulicCostKind,
    critical_conductance_loss_fraction: f64,
    critical_water_potential: f64,
    critical_conductance: f64,
}

impl HydraulicCost {
    /// Bind a cost model to `model` at the given critical loss fraction.
    ///
    /// # Errors
    /// [`ModelError::Domain`](crate::ModelError::Domain) unless
    /// `0 ≤ critical_conductance_loss_fraction < 1`, or when the curve cannot
    /// be inverted there.
    pub fn new(
        kind: HydraulicCostKind,
        model: &dyn ConductanceModel,
        critical_conductance_loss_fraction: f64,
    ) -> ModelResult<Self> {
        check_loss_fraction(critical_conductance_loss_fraction)?;
        let critical_water_potential =
            model.water_potential_from_loss_fraction(critical_conductance_loss_fraction)?;
        let critical_conductance = model.conductance(critical_water_potential);
        info!(
            "{:?} hydraulic cost: critical ψ = {:.4} MPa, k_crit = {:.6}",
            kind, critical_water_potential, critical_conductance
        );
        Ok(Self {
            kind,
            critical_conductance_loss_fraction,
            critical_water_potential,
            critical_conductance,
        })
    }

    pub fn kind(&self) -> HydraulicCostKind {
        self.kind
    }

    pub fn critical_conductance_loss_fraction(&self) -> f64 {
        self.critical_conductance_loss_fraction
    }

    /// Leaf water potential at which the cost reaches 1 (`MPa`)
    pub fn critical_water_potential(&self) -> f64 {
        self.critical_water_potential
    }

    /// Conductance at the critical water potential
    pub fn critical_conductance(&self) -> f64 {
        self.critical_conductance
    }

    /// Unitless cost of drawing the leaf down to `leaf_water_potential`.
    ///
    /// Conductances are read along the soil-to-leaf path, so path-aware
    /// models see the current leaf and soil potentials. A soil already at or
    /// beyond the critical conductance has nothing left to lose and costs 1.
    pub fn cost(
        &self,
        model: &dyn ConductanceModel,
        leaf_water_potential: f64,
        soil_water_potential: f64,
    ) -> f64 {
        let k_crit = self.critical_conductance;
        match self.kind {
            HydraulicCostKind::ProfitMax => {
                let k_soil = model.conductance_along_path(
                    soil_water_potential,
                    leaf_water_potential,
                    soil_water_potential,
                );
                let available = k_soil - k_crit;
                if available <= 0.0 {
                    return 1.0;
                }
                let k_leaf = model.conductance_along_path(
                    leaf_water_potential,
                    leaf_water_potential,
                    soil_water_potential,
                );
                (k_soil - k_leaf) / available
            }
            HydraulicCostKind::Sox => {
                let available = model.maximum_conductance() - k_crit;
                if available <= 0.0 {
                    return 1.0;
                }
                let mid_path = 0.5 * (leaf_water_potential + soil_water_potential);
                let k_mid = model.conductance_along_path(
                    mid_path,
                    leaf_water_potential,
                    soil_water_potential,
                );
                1.0 - (k_mid - k_crit) / available
            }
        }
    }
}
