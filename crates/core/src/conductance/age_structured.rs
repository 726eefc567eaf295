//! Age-structured xylem population
//!
//! Xylem is split into `N` age cohorts. Each cohort remembers the lowest
//! conductance it has been pushed to and carries a population weight. Every
//! timestep the cohorts age by one slot, the youngest cohort is grown with
//! full conductance and the population turns over.
//!
//! ```text
//! k(ψ) = Σ_i min(k_i, k_base(ψ)) × n_i
//! ```
//!
//! # Scientific References
//! - Pachalis, A. et al. (2023). "Xylem impairment and recovery in an
//!   age-structured model of sapwood." Section 2.6

use super::{check_loss_fraction, ConductanceModel, DamageThresholds};
use crate::core_types::error::{ModelError, ModelResult};
use crate::core_types::numerics::{bisect_increasing, linspace};
use tracing::{debug, info};

/// Bisection steps for the inverse mapping
const INVERSE_ITERATIONS: usize = 64;

#[derive(Debug)]
pub struct AgeStructuredConductanceModel {
    base: Box<dyn ConductanceModel>,
    timestep: f64,
    growth_rate: f64,
    turnover_rate: f64,
    xylem_age: Vec<f64>,
    xylem_conductance: Vec<f64>,
    xylem_population: Vec<f64>,
    steady_state_population: f64,
    thresholds: DamageThresholds,
}

impl AgeStructuredConductanceModel {
    /// Build the cohort model around a base vulnerability curve.
    ///
    /// The population starts at the steady state reached after `num_ages`
    /// growth/turnover steps from zero.
    ///
    /// # Arguments
    /// * `base` - Vulnerability curve of healthy xylem
    /// * `num_ages` - Number of age cohorts
    /// * `timestep` - Model timestep (s); updates must use the same step
    /// * `growth_rate` - Growth of new xylem (s⁻¹)
    /// * `turnover_rate` - Fraction of each cohort lost per timestep
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] for zero cohorts, a non-positive
    /// timestep, a negative growth rate or a turnover outside `[0, 1]`.
    pub fn new(
        base: Box<dyn ConductanceModel>,
        num_ages: usize,
        timestep: f64,
        growth_rate: f64,
        turnover_rate: f64,
    ) -> ModelResult<Self> {
        if num_ages == 0 {
            return Err(ModelError::InvalidInput(
                "age-structured model needs at least one age cohort".to_string(),
            ));
        }
        if !(timestep.is_finite() && timestep > 0.0) {
            return Err(ModelError::InvalidInput(format!(
                "timestep must be positive, got {timestep}"
            )));
        }
        check_population_rates(growth_rate, turnover_rate)?;

        let thresholds = *base.thresholds();
        let mut model = Self {
            xylem_age: linspace(0.0, timestep * num_ages as f64, num_ages),
            xylem_conductance: vec![base.maximum_conductance(); num_ages],
            xylem_population: vec![0.0; num_ages],
            base,
            timestep,
            growth_rate,
            turnover_rate,
            steady_state_population: 0.0,
            thresholds,
        };
        model.initialise_xylem_population(growth_rate, turnover_rate)?;

        info!(
            "Age-structured conductance model: {} cohorts, dt = {} s, population {:.4}",
            num_ages, timestep, model.steady_state_population
        );
        Ok(model)
    }

    /// Rebuild the population from zero by `N` growth/turnover steps at the
    /// given initial rates.
    ///
    /// The initial rates may differ from the rates applied during updates,
    /// so a stand can start from an established population and then stop
    /// growing. The rebuilt population becomes the healthy reference.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] for a negative growth rate or a turnover
    /// outside `[0, 1]`.
    pub fn initialise_xylem_population(
        &mut self,
        initial_growth_rate: f64,
        initial_turnover_rate: f64,
    ) -> ModelResult<&[f64]> {
        check_population_rates(initial_growth_rate, initial_turnover_rate)?;
        self.xylem_population.iter_mut().for_each(|n| *n = 0.0);
        for _ in 0..self.xylem_population.len() {
            age_population(
                &mut self.xylem_population,
                initial_growth_rate,
                initial_turnover_rate,
                self.timestep,
            );
        }
        self.steady_state_population = self.total_xylem_population();
        Ok(&self.xylem_population)
    }

    pub fn xylem_conductance(&self) -> &[f64] {
        &self.xylem_conductance
    }

    pub fn xylem_population(&self) -> &[f64] {
        &self.xylem_population
    }

    /// Age of each cohort (s)
    pub fn xylem_age(&self) -> &[f64] {
        &self.xylem_age
    }

    pub fn total_xylem_population(&self) -> f64 {
        self.xylem_population.iter().sum()
    }

    /// Conductance at zero potential as a fraction of the current maximum
    pub fn conductance_fraction(&self) -> f64 {
        let maximum = self.maximum_conductance();
        if maximum > 0.0 {
            self.conductance(0.0) / maximum
        } else {
            0.0
        }
    }
}

fn check_population_rates(growth_rate: f64, turnover_rate: f64) -> ModelResult<()> {
    if !(growth_rate.is_finite() && growth_rate >= 0.0) {
        return Err(ModelError::InvalidInput(format!(
            "growth rate must be non-negative, got {growth_rate}"
        )));
    }
    if !(0.0..=1.0).contains(&turnover_rate) {
        return Err(ModelError::InvalidInput(format!(
            "turnover rate must lie in [0, 1], got {turnover_rate}"
        )));
    }
    Ok(())
}

/// Shift cohorts one age older, apply turnover and inject new growth
fn age_population(population: &mut [f64], growth_rate: f64, turnover_rate: f64, timestep: f64) {
    population.rotate_right(1);
    for n in population.iter_mut() {
        *n -= *n * turnover_rate;
    }
    population[0] = growth_rate * timestep;
}

impl ConductanceModel for AgeStructuredConductanceModel {
    fn conductance(&self, water_potential: f64) -> f64 {
        let ceiling = self.base.conductance(water_potential);
        self.xylem_conductance
            .iter()
            .zip(&self.xylem_population)
            .map(|(k, n)| k.min(ceiling).max(0.0) * n)
            .sum()
    }

    fn maximum_conductance(&self) -> f64 {
        self.base.maximum_conductance() * self.total_xylem_population()
    }

    fn healthy_maximum_conductance(&self) -> f64 {
        self.base.healthy_maximum_conductance() * self.steady_state_population
    }

    fn thresholds(&self) -> &DamageThresholds {
        &self.thresholds
    }

    /// Solved by bisection between the base curve's potential for the same
    /// loss and zero; returns 0 when even saturated xylem cannot reach the
    /// target conductance.
    fn water_potential_from_loss_fraction(&self, loss_fraction: f64) -> ModelResult<f64> {
        check_loss_fraction(loss_fraction)?;
        let target = (1.0 - loss_fraction) * self.maximum_conductance();
        if self.conductance(0.0) < target {
            return Ok(0.0);
        }
        let lower = self.base.water_potential_from_loss_fraction(loss_fraction)?;
        Ok(bisect_increasing(
            |psi| self.conductance(psi),
            target,
            lower,
            0.0,
            INVERSE_ITERATIONS,
        ))
    }

    fn check_timestep(&self, timestep: f64) -> ModelResult<()> {
        if (timestep - self.timestep).abs() > f64::EPSILON * self.timestep.max(1.0) {
            return Err(ModelError::TimestepMismatch {
                expected: self.timestep,
                got: timestep,
            });
        }
        Ok(())
    }

    /// Ages every cohort unconditionally: clip to the current ceiling,
    /// shift, grow a new cohort with full conductance and turn the population
    /// over.
    fn update_xylem_damage(
        &mut self,
        water_potential: f64,
        timestep: f64,
        _transpiration_rate: f64,
        _root_water_potential: f64,
    ) -> ModelResult<bool> {
        self.check_timestep(timestep)?;

        let ceiling = self.base.conductance(water_potential);
        for k in &mut self.xylem_conductance {
            *k = k.min(ceiling).max(0.0);
        }
        self.xylem_conductance.rotate_right(1);
        self.xylem_conductance[0] = self.base.maximum_conductance();

        age_population(
            &mut self.xylem_population,
            self.growth_rate,
            self.turnover_rate,
            self.timestep,
        );

        debug!(
            "Aged xylem cohorts at {:.3} MPa: ceiling {:.4}, population {:.4}",
            water_potential,
            ceiling,
            self.total_xylem_population()
        );
        Ok(true)
    }

    fn reset_xylem_damage(&mut self) {
        // Rates were validated at construction
        let _ = self.initialise_xylem_population(self.growth_rate, self.turnover_rate);
        let k_max = self.base.maximum_conductance();
        self.xylem_conductance.iter_mut().for_each(|k| *k = k_max);
    }
}
