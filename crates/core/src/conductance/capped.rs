//! Conductance capped at a remembered value
//!
//! The base curve is clipped to `[0, cap]`. Damage lowers the cap to the
//! conductance reached under tension, recovery raises it back to the base
//! curve. This gives the xylem a memory of past drought without refitting
//! the curve shape.

use super::{check_loss_fraction, ConductanceModel, DamageThresholds};
use crate::core_types::error::ModelResult;
use tracing::debug;

#[derive(Debug)]
pub struct CappedConductanceModel {
    base: Box<dyn ConductanceModel>,
    conductance_cap: f64,
    thresholds: DamageThresholds,
}

impl CappedConductanceModel {
    /// Wrap a base curve with the cap at its maximum conductance
    pub fn new(base: Box<dyn ConductanceModel>) -> Self {
        let conductance_cap = base.maximum_conductance();
        let thresholds = *base.thresholds();
        Self {
            base,
            conductance_cap,
            thresholds,
        }
    }

    /// Wrap a base curve with an initial cap (clamped to the admissible range)
    pub fn with_cap(base: Box<dyn ConductanceModel>, conductance_cap: f64) -> Self {
        let mut model = Self::new(base);
        model.update_cap_conductance(conductance_cap);
        model
    }

    pub fn conductance_cap(&self) -> f64 {
        self.conductance_cap
    }

    pub fn base_model(&self) -> &dyn ConductanceModel {
        self.base.as_ref()
    }

    /// Water potential where the base curve meets the cap (`MPa`).
    ///
    /// # Errors
    /// Propagates the base curve's inverse-mapping error.
    pub fn water_potential_at_cap_switch(&self) -> ModelResult<f64> {
        self.base.water_potential_from_conductance(self.conductance_cap)
    }

    /// Move the cap, keeping it within
    /// `[(1 - critical loss) × healthy maximum, healthy maximum]`.
    pub fn update_cap_conductance(&mut self, conductance_cap: f64) {
        let healthy = self.base.healthy_maximum_conductance();
        let floor = (1.0 - self.thresholds.critical_conductance_loss_fraction) * healthy;
        self.conductance_cap = conductance_cap.max(floor).min(healthy);
    }
}

impl ConductanceModel for CappedConductanceModel {
    fn conductance(&self, water_potential: f64) -> f64 {
        self.base
            .conductance(water_potential)
            .min(self.conductance_cap)
            .max(0.0)
    }

    fn maximum_conductance(&self) -> f64 {
        self.conductance_cap
    }

    fn healthy_maximum_conductance(&self) -> f64 {
        self.base.healthy_maximum_conductance()
    }

    fn thresholds(&self) -> &DamageThresholds {
        &self.thresholds
    }

    fn water_potential_from_loss_fraction(&self, loss_fraction: f64) -> ModelResult<f64> {
        check_loss_fraction(loss_fraction)?;
        self.base
            .water_potential_from_conductance(self.conductance_cap * (1.0 - loss_fraction))
    }

    fn water_potential_from_conductance(&self, conductance: f64) -> ModelResult<f64> {
        self.base.water_potential_from_conductance(conductance)
    }

    fn damage_xylem(
        &mut self,
        water_potential: f64,
        _timestep: f64,
        _transpiration_rate: f64,
        _root_water_potential: f64,
    ) -> ModelResult<bool> {
        let previous = self.conductance_cap;
        self.update_cap_conductance(self.conductance(water_potential));
        debug!(
            "Capped conductance damaged at {:.3} MPa: cap {:.4} -> {:.4}",
            water_potential, previous, self.conductance_cap
        );
        Ok(true)
    }

    fn recover_xylem(
        &mut self,
        water_potential: f64,
        _timestep: f64,
        _root_water_potential: f64,
    ) -> ModelResult<bool> {
        self.update_cap_conductance(self.base.conductance(water_potential));
        Ok(true)
    }

    fn reset_xylem_damage(&mut self) {
        self.update_cap_conductance(self.base.maximum_conductance());
    }
}
