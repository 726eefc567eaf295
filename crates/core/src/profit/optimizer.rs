//! Profit optimisation over leaf water potential
//!
//! The optimiser samples leaf water potentials from the soil potential down
//! to the critical potential of the cost model, evaluates hydraulic cost and
//! carbon gain at every sample, and selects the potential with the largest
//! profit among samples that keep `Ci` below a fraction of `Ca`.
//!
//! # Algorithm
//! 1. Grid of N potentials from `ψs` to `ψ_crit` (collapsed to `ψs` when the
//!    soil is already at or beyond critical)
//! 2. Per sample: cost, transpiration `E = ∫ k dψ` from `ψ` to `ψs`,
//!    stomatal conductance, net assimilation and `Ci`
//! 3. Gain = assimilation / max assimilation
//! 4. Profit per [`ProfitForm`]
//! 5. NaN-safe argmax over feasible samples, falling back to the first
//!
//! Step 2 is independent per sample and runs on the rayon pool when
//! [`OptimizerSettings::parallel`] is set.

use super::cost::{HydraulicCost, HydraulicCostKind};
use super::drivers::Drivers;
use super::gain::{normalised_gain, CO2GainModel};
use crate::conductance::ConductanceModel;
use crate::core_types::error::{ModelError, ModelResult};
use crate::core_types::numerics::{linspace, nan_argmax_over};
use crate::photosynthesis::PhotosynthesisModel;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default number of leaf water potential samples
pub const DEFAULT_SAMPLE_POINTS: usize = 1000;

/// How gain and cost combine into profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitForm {
    /// `gain - cost`
    Additive,
    /// `gain × (1 - cost)`
    RetainedConductance,
    /// `gain × cost`
    Product,
}

impl ProfitForm {
    #[inline]
    pub fn profit(self, gain: f64, cost: f64) -> f64 {
        match self {
            ProfitForm::Additive => gain - cost,
            ProfitForm::RetainedConductance => gain * (1.0 - cost),
            ProfitForm::Product => gain * cost,
        }
    }
}

impl HydraulicCostKind {
    /// Profit form each cost model is published with
    pub fn natural_profit_form(self) -> ProfitForm {
        match self {
            HydraulicCostKind::ProfitMax => ProfitForm::Additive,
            HydraulicCostKind::Sox => ProfitForm::RetainedConductance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Leaf water potential samples per optimisation
    pub sample_points: usize,
    /// Trapezium samples per transpiration integral
    pub transpiration_steps: usize,
    /// Feasible samples satisfy `Ci < ci_ratio_limit × Ca`
    pub ci_ratio_limit: f64,
    /// Evaluate the grid on the rayon pool
    pub parallel: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            sample_points: DEFAULT_SAMPLE_POINTS,
            transpiration_steps: 100,
            ci_ratio_limit: 0.95,
            parallel: true,
        }
    }
}

impl OptimizerSettings {
    /// # Errors
    /// [`ModelError::InvalidInput`] for an empty grid, fewer than two
    /// transpiration samples or a non-positive `Ci` ratio.
    pub fn validate(&self) -> ModelResult<()> {
        if self.sample_points == 0 {
            return Err(ModelError::InvalidInput(
                "sample grid must contain at least one point".to_string(),
            ));
        }
        if self.transpiration_steps < 2 {
            return Err(ModelError::InvalidInput(format!(
                "transpiration integral needs at least 2 steps, got {}",
                self.transpiration_steps
            )));
        }
        if !(self.ci_ratio_limit > 0.0 && self.ci_ratio_limit.is_finite()) {
            return Err(ModelError::InvalidInput(format!(
                "Ci ratio limit must be positive, got {}",
                self.ci_ratio_limit
            )));
        }
        Ok(())
    }
}

/// Every sampled quantity of one optimisation, index-aligned.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProfitCurve {
    /// Leaf water potentials (`MPa`)
    pub leaf_water_potential: Vec<f64>,
    /// Hydraulic cost (unitless)
    pub hydraulic_cost: Vec<f64>,
    /// Normalised CO₂ gain (unitless)
    pub gain: Vec<f64>,
    pub profit: Vec<f64>,
    /// Net assimilation (µmol m⁻² s⁻¹)
    pub net_assimilation: Vec<f64>,
    /// Transpiration (mmol m⁻² s⁻¹)
    pub transpiration: Vec<f64>,
    /// Intercellular CO₂ (µmol mol⁻¹)
    pub intercellular_co2: Vec<f64>,
    /// Stomatal conductance to CO₂ (mol m⁻² s⁻¹)
    pub stomatal_conductance: Vec<f64>,
    /// Largest net assimilation on the curve, 0 when none is positive
    pub maximum_assimilation: f64,
}

impl ProfitCurve {
    pub fn len(&self) -> usize {
        self.leaf_water_potential.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_water_potential.is_empty()
    }

    /// Samples with `Ci < ci_ratio_limit × Ca`
    pub fn feasible_indices(&self, ci_ratio_limit: f64, atmospheric_co2: f64) -> Vec<usize> {
        let limit = ci_ratio_limit * atmospheric_co2;
        (0..self.len())
            .filter(|&i| self.intercellular_co2[i] < limit)
            .collect()
    }

    /// Index of the best feasible sample, 0 when nothing feasible is finite
    pub fn optimal_index(&self, ci_ratio_limit: f64, atmospheric_co2: f64) -> usize {
        let feasible = self.feasible_indices(ci_ratio_limit, atmospheric_co2);
        match nan_argmax_over(&self.profit, feasible) {
            Some(index) => index,
            None => {
                debug!(
                    "No feasible finite profit on {} samples, falling back to the soil potential",
                    self.len()
                );
                0
            }
        }
    }

    pub fn state_at(&self, index: usize) -> OptimalState {
        OptimalState {
            leaf_water_potential: self.leaf_water_potential[index],
            net_assimilation: self.gain[index] * self.maximum_assimilation,
            transpiration: self.transpiration[index],
            intercellular_co2: self.intercellular_co2[index],
            stomatal_conductance: self.stomatal_conductance[index],
        }
    }
}

/// Optimal leaf state of one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalState {
    /// `MPa`
    pub leaf_water_potential: f64,
    /// µmol m⁻² s⁻¹
    pub net_assimilation: f64,
    /// mmol m⁻² s⁻¹
    pub transpiration: f64,
    /// µmol mol⁻¹
    pub intercellular_co2: f64,
    /// mol m⁻² s⁻¹
    pub stomatal_conductance: f64,
}

impl OptimalState {
    /// Marker row for a failed timestep
    pub fn nan() -> Self {
        Self {
            leaf_water_potential: f64::NAN,
            net_assimilation: f64::NAN,
            transpiration: f64::NAN,
            intercellular_co2: f64::NAN,
            stomatal_conductance: f64::NAN,
        }
    }

    pub fn is_nan(&self) -> bool {
        self.leaf_water_potential.is_nan()
    }
}

/// Per-sample quantities before normalisation
#[derive(Debug, Clone, Copy)]
struct GridSample {
    cost: f64,
    transpiration: f64,
    net_assimilation: f64,
    intercellular_co2: f64,
    stomatal_conductance: f64,
}

/// Stomatal profit optimisation around one conductance curve.
///
/// The model owns the curve so damage feedback between timesteps mutates
/// the same state the next optimisation reads.
#[derive(Debug)]
pub struct ProfitOptimisationModel {
    conductance: Box<dyn ConductanceModel>,
    cost: HydraulicCost,
    gain: CO2GainModel,
    profit_form: ProfitForm,
    settings: OptimizerSettings,
}

impl ProfitOptimisationModel {
    /// Build a model with the cost kind's natural profit form and default
    /// settings.
    ///
    /// # Errors
    /// Propagates [`HydraulicCost::new`] failures.
    pub fn new(
        conductance: Box<dyn ConductanceModel>,
        cost_kind: HydraulicCostKind,
        critical_conductance_loss_fraction: f64,
        photosynthesis: PhotosynthesisModel,
    ) -> ModelResult<Self> {
        let cost = HydraulicCost::new(
            cost_kind,
            conductance.as_ref(),
            critical_conductance_loss_fraction,
        )?;
        Ok(Self {
            conductance,
            cost,
            gain: CO2GainModel::new(photosynthesis),
            profit_form: cost_kind.natural_profit_form(),
            settings: OptimizerSettings::default(),
        })
    }

    pub fn with_profit_form(mut self, profit_form: ProfitForm) -> Self {
        self.profit_form = profit_form;
        self
    }

    /// # Errors
    /// See [`OptimizerSettings::validate`].
    pub fn with_settings(mut self, settings: OptimizerSettings) -> ModelResult<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    pub fn conductance_model(&self) -> &dyn ConductanceModel {
        self.conductance.as_ref()
    }

    pub fn conductance_model_mut(&mut self) -> &mut dyn ConductanceModel {
        self.conductance.as_mut()
    }

    pub fn hydraulic_cost(&self) -> &HydraulicCost {
        &self.cost
    }

    pub fn gain_model(&self) -> &CO2GainModel {
        &self.gain
    }

    pub fn profit_form(&self) -> ProfitForm {
        self.profit_form
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Leaf water potentials sampled for a soil potential
    pub fn water_potential_grid(
        &self,
        soil_water_potential: f64,
        sample_points: usize,
    ) -> Vec<f64> {
        let critical = self.cost.critical_water_potential();
        if soil_water_potential <= critical {
            return vec![soil_water_potential; sample_points.min(1)];
        }
        linspace(soil_water_potential, critical, sample_points)
    }

    fn evaluate(&self, leaf_water_potential: f64, drivers: &Drivers) -> GridSample {
        let model = self.conductance.as_ref();
        let soil = drivers.soil_water_potential;
        let transpiration =
            model.transpiration(leaf_water_potential, soil, self.settings.transpiration_steps);
        let uptake = self.gain.carbon_uptake(transpiration, drivers);
        GridSample {
            cost: self.cost.cost(model, leaf_water_potential, soil),
            transpiration,
            net_assimilation: uptake.net_assimilation,
            intercellular_co2: uptake.intercellular_co2,
            stomatal_conductance: uptake.stomatal_conductance,
        }
    }

    fn evaluate_grid(&self, grid: &[f64], drivers: &Drivers) -> Vec<GridSample> {
        #[cfg(feature = "parallel")]
        if self.settings.parallel {
            return grid.par_iter().map(|&psi| self.evaluate(psi, drivers)).collect();
        }
        grid.iter().map(|&psi| self.evaluate(psi, drivers)).collect()
    }

    /// Profit curve with the configured number of samples.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] for invalid drivers.
    pub fn profit_curve(&self, drivers: &Drivers) -> ModelResult<ProfitCurve> {
        self.profit_curve_with_samples(drivers, self.settings.sample_points)
    }

    /// Profit curve over `sample_points` leaf water potentials.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] for invalid drivers or an empty grid.
    pub fn profit_curve_with_samples(
        &self,
        drivers: &Drivers,
        sample_points: usize,
    ) -> ModelResult<ProfitCurve> {
        if sample_points == 0 {
            return Err(ModelError::InvalidInput(
                "sample grid must contain at least one point".to_string(),
            ));
        }
        drivers.validate()?;

        let grid = self.water_potential_grid(drivers.soil_water_potential, sample_points);
        let samples = self.evaluate_grid(&grid, drivers);

        let net_assimilation: Vec<f64> = samples.iter().map(|s| s.net_assimilation).collect();
        let (gain, maximum_assimilation) = normalised_gain(&net_assimilation);
        let profit = samples
            .iter()
            .zip(&gain)
            .map(|(s, &g)| self.profit_form.profit(g, s.cost))
            .collect();

        Ok(ProfitCurve {
            leaf_water_potential: grid,
            hydraulic_cost: samples.iter().map(|s| s.cost).collect(),
            gain,
            profit,
            net_assimilation,
            transpiration: samples.iter().map(|s| s.transpiration).collect(),
            intercellular_co2: samples.iter().map(|s| s.intercellular_co2).collect(),
            stomatal_conductance: samples.iter().map(|s| s.stomatal_conductance).collect(),
            maximum_assimilation,
        })
    }

    /// Optimal leaf state with the configured number of samples.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] for invalid drivers.
    pub fn optimal_state(&self, drivers: &Drivers) -> ModelResult<OptimalState> {
        self.optimal_state_with_samples(drivers, self.settings.sample_points)
    }

    /// Optimal leaf state over `sample_points` leaf water potentials.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] for invalid drivers or an empty grid.
    pub fn optimal_state_with_samples(
        &self,
        drivers: &Drivers,
        sample_points: usize,
    ) -> ModelResult<OptimalState> {
        let curve = self.profit_curve_with_samples(drivers, sample_points)?;
        let index = curve.optimal_index(self.settings.ci_ratio_limit, drivers.atmospheric_co2);
        let state = curve.state_at(index);
        debug!(
            "Optimum at sample {}/{}: ψ = {:.4} MPa, A = {:.4}, E = {:.4}",
            index,
            curve.len(),
            state.leaf_water_potential,
            state.net_assimilation,
            state.transpiration
        );
        Ok(state)
    }

    /// Feed an optimal state back into the conductance curve.
    ///
    /// # Errors
    /// Propagates the curve's damage update errors.
    pub fn update_xylem_damage(
        &mut self,
        state: &OptimalState,
        timestep: f64,
        soil_water_potential: f64,
    ) -> ModelResult<bool> {
        self.conductance.update_xylem_damage(
            state.leaf_water_potential,
            timestep,
            state.transpiration,
            soil_water_potential,
        )
    }

    /// Heal the conductance curve
    pub fn reset_xylem_damage(&mut self) {
        info!("Resetting xylem damage");
        self.conductance.reset_xylem_damage();
    }
}
