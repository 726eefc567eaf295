//! Whole-trunk impairment
//!
//! Treats the stem as a single path from root to leaf that remembers the most
//! negative potentials it has experienced at either end. Conductance at a
//! point on the path is read off the base curve after mapping the point onto
//! the remembered extremes:
//!
//! ```text
//! ψ' = (ψ - ψ_soil) / (ψ_leaf - ψ_soil) × (ψ_leaf_ext - ψ_root_ext) + ψ_root_ext
//! ```

use super::{ConductanceModel, DamageThresholds};
use crate::core_types::error::ModelResult;
use tracing::debug;

/// Path widths below this are treated as a single point (`MPa`)
const DEGENERATE_PATH_WIDTH: f64 = 1e-12;

#[derive(Debug)]
pub struct WholeTrunkConductanceModel {
    base: Box<dyn ConductanceModel>,
    leaf_extreme_water_potential: f64,
    root_extreme_water_potential: f64,
    thresholds: DamageThresholds,
}

impl WholeTrunkConductanceModel {
    pub fn new(base: Box<dyn ConductanceModel>) -> Self {
        let thresholds = *base.thresholds();
        Self {
            base,
            leaf_extreme_water_potential: 0.0,
            root_extreme_water_potential: 0.0,
            thresholds,
        }
    }

    /// Most negative leaf potential seen so far (`MPa`)
    pub fn leaf_extreme_water_potential(&self) -> f64 {
        self.leaf_extreme_water_potential
    }

    /// Most negative root potential seen so far (`MPa`)
    pub fn root_extreme_water_potential(&self) -> f64 {
        self.root_extreme_water_potential
    }

    /// Extremes including a candidate leaf/root pair, `(leaf, root)`
    fn extremes_with(&self, leaf_water_potential: f64, root_water_potential: f64) -> (f64, f64) {
        (
            self.leaf_extreme_water_potential.min(leaf_water_potential),
            self.root_extreme_water_potential.min(root_water_potential),
        )
    }
}

impl ConductanceModel for WholeTrunkConductanceModel {
    fn conductance(&self, water_potential: f64) -> f64 {
        self.base
            .conductance(water_potential.min(self.leaf_extreme_water_potential))
    }

    fn conductance_along_path(
        &self,
        water_potential: f64,
        leaf_water_potential: f64,
        soil_water_potential: f64,
    ) -> f64 {
        let (leaf_extreme, root_extreme) =
            self.extremes_with(leaf_water_potential, soil_water_potential);

        if (leaf_water_potential - soil_water_potential).abs() < DEGENERATE_PATH_WIDTH {
            return self.base.conductance(root_extreme);
        }

        let mapped = (water_potential - soil_water_potential)
            / (leaf_water_potential - soil_water_potential)
            * (leaf_extreme - root_extreme)
            + root_extreme;
        self.base.conductance(mapped)
    }

    fn maximum_conductance(&self) -> f64 {
        self.base
            .conductance(self.leaf_extreme_water_potential.min(0.0))
    }

    fn healthy_maximum_conductance(&self) -> f64 {
        self.base.healthy_maximum_conductance()
    }

    fn thresholds(&self) -> &DamageThresholds {
        &self.thresholds
    }

    fn water_potential_from_loss_fraction(&self, loss_fraction: f64) -> ModelResult<f64> {
        self.base.water_potential_from_loss_fraction(loss_fraction)
    }

    /// Integral of the base curve over the remembered extremes, rescaled to
    /// the width of the requested interval.
    fn transpiration(
        &self,
        min_water_potential: f64,
        max_water_potential: f64,
        steps: usize,
    ) -> f64 {
        let (leaf_extreme, root_extreme) =
            self.extremes_with(min_water_potential, max_water_potential);
        let requested_width = max_water_potential - min_water_potential;
        let extreme_width = root_extreme - leaf_extreme;

        if extreme_width.abs() < DEGENERATE_PATH_WIDTH {
            return self.base.conductance(leaf_extreme) * requested_width;
        }

        self.base.transpiration(leaf_extreme, root_extreme, steps) * requested_width / extreme_width
    }

    /// Loss of path-integrated conductance between the remembered extremes
    /// relative to healthy xylem over the same span.
    fn plc(&self, _water_potential: f64) -> f64 {
        let healthy = self.base.healthy_maximum_conductance();
        let width = self.root_extreme_water_potential - self.leaf_extreme_water_potential;

        if width.abs() < DEGENERATE_PATH_WIDTH {
            let extreme = self.base.conductance(self.leaf_extreme_water_potential);
            return 100.0 * (1.0 - extreme / healthy);
        }

        let transpiration = self.base.transpiration(
            self.leaf_extreme_water_potential,
            self.root_extreme_water_potential,
            super::DEFAULT_TRANSPIRATION_STEPS,
        );
        100.0 * (1.0 - transpiration / (healthy * width))
    }

    fn damage_xylem(
        &mut self,
        water_potential: f64,
        _timestep: f64,
        _transpiration_rate: f64,
        root_water_potential: f64,
    ) -> ModelResult<bool> {
        let (leaf_extreme, root_extreme) =
            self.extremes_with(water_potential, root_water_potential);
        self.leaf_extreme_water_potential = leaf_extreme;
        self.root_extreme_water_potential = root_extreme;
        debug!(
            "Whole-trunk extremes: leaf {:.3} MPa, root {:.3} MPa",
            leaf_extreme, root_extreme
        );
        Ok(false)
    }

    fn reset_xylem_damage(&mut self) {
        self.leaf_extreme_water_potential = 0.0;
        self.root_extreme_water_potential = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conductance::WeibullCurve;
    use approx::assert_relative_eq;

    fn trunk() -> WholeTrunkConductanceModel {
        let base = WeibullCurve::from_loss_observations(0.2, -3.0, -4.0, 0.5, 0.88).unwrap();
        WholeTrunkConductanceModel::new(Box::new(base))
    }

    #[test]
    fn test_fresh_trunk_follows_base_curve() {
        let model = trunk();
        assert_eq!(model.conductance(0.0), 0.2);
        assert_relative_eq!(model.conductance(-3.0), 0.1, epsilon = 1e-12);
        assert_eq!(model.maximum_conductance(), 0.2);
        assert_relative_eq!(model.plc(-2.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_damage_records_extremes_without_reporting_change() {
        let mut model = trunk();
        let changed = model.damage_xylem(-3.0, 1800.0, 0.1, -0.5).unwrap();
        assert!(!changed);
        assert_eq!(model.leaf_extreme_water_potential(), -3.0);
        assert_eq!(model.root_extreme_water_potential(), -0.5);

        // Less extreme values do not overwrite the memory
        model.damage_xylem(-1.0, 1800.0, 0.1, -0.2).unwrap();
        assert_eq!(model.leaf_extreme_water_potential(), -3.0);
        assert_eq!(model.root_extreme_water_potential(), -0.5);

        assert_relative_eq!(model.conductance(0.0), 0.1, epsilon = 1e-12);
        assert_relative_eq!(model.maximum_conductance(), 0.1, epsilon = 1e-12);
        assert!(model.plc(0.0) > 0.0);

        model.reset_xylem_damage();
        assert_eq!(model.leaf_extreme_water_potential(), 0.0);
    }

    #[test]
    fn test_path_conductance_maps_onto_extremes() {
        let mut model = trunk();
        model.damage_xylem(-3.0, 1800.0, 0.0, -1.0).unwrap();

        // Leaf end of a milder path maps to the leaf extreme
        let k_leaf = model.conductance_along_path(-2.0, -2.0, -0.5);
        assert_relative_eq!(k_leaf, model.base.conductance(-3.0), epsilon = 1e-12);

        // Soil end maps to the root extreme
        let k_soil = model.conductance_along_path(-0.5, -2.0, -0.5);
        assert_relative_eq!(k_soil, model.base.conductance(-1.0), epsilon = 1e-12);

        // Degenerate path
        let k_point = model.conductance_along_path(-0.5, -0.5, -0.5);
        assert_relative_eq!(k_point, model.base.conductance(-1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_transpiration_rescaled_to_requested_width() {
        let mut model = trunk();
        let fresh = model.transpiration(-2.0, -0.5, 100);
        assert_relative_eq!(fresh, model.base.transpiration(-2.0, -0.5, 100), max_relative = 1e-12);

        model.damage_xylem(-3.0, 1800.0, 0.0, -1.0).unwrap();
        let e = model.transpiration(-2.0, -0.5, 100);
        let base = model.base.transpiration(-3.0, -1.0, 100);
        assert_relative_eq!(e, base * 1.5 / 2.0, max_relative = 1e-12);
        assert!(e > 0.0 && e < fresh);

        assert_eq!(model.transpiration(0.0, 0.0, 100), 0.0);
    }

    #[test]
    fn test_update_passes_root_potential() {
        let mut model = trunk();
        model.update_xylem_damage(-3.5, 1800.0, 0.1, -0.8).unwrap();
        assert_eq!(model.root_extreme_water_potential(), -0.8);
        assert_eq!(model.leaf_extreme_water_potential(), -3.5);
    }
}
