//! Time-series driver
//!
//! Runs the optimiser over a sequence of drivers, optionally feeding each
//! optimum back into the xylem damage state before the next step.

use super::drivers::Drivers;
use super::optimizer::{OptimalState, ProfitOptimisationModel};
use crate::core_types::error::{ModelError, ModelResult};
use serde::Serialize;
use tracing::{info, warn};

/// Parallel output arrays, one entry per timestep.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TimeSeriesOutput {
    pub leaf_water_potential: Vec<f64>,
    pub net_assimilation: Vec<f64>,
    pub transpiration: Vec<f64>,
    pub intercellular_co2: Vec<f64>,
    pub stomatal_conductance: Vec<f64>,
    /// Maximum conductance of the curve after each step
    pub maximum_conductance: Vec<f64>,
    /// Steps that produced a NaN row
    pub failed_steps: usize,
    /// Steps whose optimum was kept but whose damage update failed
    pub failed_damage_updates: usize,
}

impl TimeSeriesOutput {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            leaf_water_potential: Vec::with_capacity(capacity),
            net_assimilation: Vec::with_capacity(capacity),
            transpiration: Vec::with_capacity(capacity),
            intercellular_co2: Vec::with_capacity(capacity),
            stomatal_conductance: Vec::with_capacity(capacity),
            maximum_conductance: Vec::with_capacity(capacity),
            failed_steps: 0,
            failed_damage_updates: 0,
        }
    }

    fn push(&mut self, state: &OptimalState, maximum_conductance: f64) {
        self.leaf_water_potential.push(state.leaf_water_potential);
        self.net_assimilation.push(state.net_assimilation);
        self.transpiration.push(state.transpiration);
        self.intercellular_co2.push(state.intercellular_co2);
        self.stomatal_conductance.push(state.stomatal_conductance);
        self.maximum_conductance.push(maximum_conductance);
    }

    pub fn len(&self) -> usize {
        self.leaf_water_potential.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_water_potential.is_empty()
    }

    pub fn state(&self, step: usize) -> OptimalState {
        OptimalState {
            leaf_water_potential: self.leaf_water_potential[step],
            net_assimilation: self.net_assimilation[step],
            transpiration: self.transpiration[step],
            intercellular_co2: self.intercellular_co2[step],
            stomatal_conductance: self.stomatal_conductance[step],
        }
    }
}

/// Optimise every timestep in order.
///
/// A timestep whose optimisation fails yields a NaN row and skips the damage
/// update. A failed damage update keeps the optimum. Either way the run
/// continues.
///
/// # Errors
/// [`ModelError::InvalidInput`] for a non-positive or non-finite timestep,
/// and [`ModelError::TimestepMismatch`] when damage feedback is on and the
/// curve is bound to a different timestep.
pub fn run_time_series(
    model: &mut ProfitOptimisationModel,
    drivers: &[Drivers],
    timestep: f64,
    apply_damage: bool,
) -> ModelResult<TimeSeriesOutput> {
    if !(timestep > 0.0 && timestep.is_finite()) {
        return Err(ModelError::InvalidInput(format!(
            "timestep must be positive, got {timestep}"
        )));
    }
    if apply_damage {
        model.conductance_model().check_timestep(timestep)?;
    }
    info!(
        "Running {} timesteps of {} s (damage feedback {})",
        drivers.len(),
        timestep,
        if apply_damage { "on" } else { "off" }
    );

    let mut output = TimeSeriesOutput::with_capacity(drivers.len());
    for (step, forcing) in drivers.iter().enumerate() {
        let state = match model.optimal_state(forcing) {
            Ok(state) => state,
            Err(e) => {
                warn!("Timestep {} failed: {}", step, e);
                output.failed_steps += 1;
                output.push(&OptimalState::nan(), model.conductance_model().maximum_conductance());
                continue;
            }
        };
        if apply_damage {
            let soil = forcing.soil_water_potential;
            if let Err(e) = model.update_xylem_damage(&state, timestep, soil) {
                warn!("Timestep {} damage update failed: {}", step, e);
                output.failed_damage_updates += 1;
            }
        }
        output.push(&state, model.conductance_model().maximum_conductance());
    }

    info!(
        "Time series complete: {} steps, {} failed, {} damage updates failed",
        output.len(),
        output.failed_steps,
        output.failed_damage_updates
    );
    Ok(output)
}
