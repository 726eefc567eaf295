//! Xylem damage engine
//!
//! [`XylemDamageModel`] is a Weibull vulnerability curve whose parameters are
//! rewritten as the xylem embolises and recovers. The update rule is chosen
//! with a [`DamageStrategy`]:
//! - `Analytic`: threshold-driven damage with the closed-form refit, full
//!   reset on recovery
//! - `IterativeRefit`: threshold-driven damage with the numerically fitted
//!   shape, full reset on recovery
//! - `RateRecovery`: maximum conductance relaxes toward the damaged and the
//!   healthy states at fixed rates every step
//! - `Impairment`: recovery, impairment, growth and death of sapwood

mod impairment;
mod mackay;

pub use impairment::ImpairmentRates;
pub use mackay::{analytic_refit, clamp_maximum_conductance, iterative_refit};

use crate::conductance::{threshold_update, ConductanceModel, DamageThresholds, WeibullParameters};
use crate::core_types::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default sample count of the iterative refit
pub const DEFAULT_REFIT_SAMPLE_POINTS: usize = 1000;

/// How a [`XylemDamageModel`] updates its curve each timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DamageStrategy {
    /// Closed-form refit referenced to the undamaged curve
    #[default]
    Analytic,
    /// Numerical shape refit against the current curve
    IterativeRefit { sample_points: usize },
    /// Continuous damage and recovery at fixed fractional rates per step
    RateRecovery { damage_rate: f64, recovery_rate: f64 },
    /// Sapwood impairment, recovery, growth and death
    Impairment(ImpairmentRates),
}

impl DamageStrategy {
    pub fn iterative() -> Self {
        DamageStrategy::IterativeRefit {
            sample_points: DEFAULT_REFIT_SAMPLE_POINTS,
        }
    }

    pub fn rate_recovery() -> Self {
        DamageStrategy::RateRecovery {
            damage_rate: 0.01,
            recovery_rate: 0.01,
        }
    }

    /// # Errors
    /// [`ModelError::InvalidInput`] for unusable sample counts or rates.
    pub fn validate(&self) -> ModelResult<()> {
        match *self {
            DamageStrategy::Analytic => Ok(()),
            DamageStrategy::IterativeRefit { sample_points } => {
                if sample_points < 2 {
                    return Err(ModelError::InvalidInput(format!(
                        "iterative refit needs at least 2 sample points, got {sample_points}"
                    )));
                }
                Ok(())
            }
            DamageStrategy::RateRecovery {
                damage_rate,
                recovery_rate,
            } => {
                let rates = [("damage rate", damage_rate), ("recovery rate", recovery_rate)];
                for (name, rate) in rates {
                    if !(0.0..=1.0).contains(&rate) {
                        return Err(ModelError::InvalidInput(format!(
                            "{name} must lie in [0, 1], got {rate}"
                        )));
                    }
                }
                Ok(())
            }
            DamageStrategy::Impairment(rates) => rates.validate(),
        }
    }
}

/// Weibull curve with embolism damage and recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XylemDamageModel {
    base: WeibullParameters,
    current: WeibullParameters,
    thresholds: DamageThresholds,
    strategy: DamageStrategy,
    sapwood_area: f64,
    base_sapwood_area: f64,
}

impl XylemDamageModel {
    /// # Errors
    /// [`ModelError::InvalidInput`] for invalid thresholds or strategy
    /// settings.
    pub fn new(
        parameters: WeibullParameters,
        strategy: DamageStrategy,
        thresholds: DamageThresholds,
    ) -> ModelResult<Self> {
        thresholds.validate()?;
        strategy.validate()?;
        info!(
            "Xylem damage model: k_max = {}, b = {:.4}, c = {:.4}, strategy {:?}",
            parameters.maximum_conductance,
            parameters.sensitivity_parameter,
            parameters.shape_parameter,
            strategy
        );
        Ok(Self {
            base: parameters,
            current: parameters,
            thresholds,
            strategy,
            sapwood_area: 1.0,
            base_sapwood_area: 1.0,
        })
    }

    /// Fit the undamaged curve through two observed conductance losses.
    ///
    /// Uses the refit thresholds of [`DamageThresholds::mackay`].
    ///
    /// # Errors
    /// [`ModelError::Fit`] for degenerate observations, see
    /// [`WeibullParameters::from_loss_observations`].
    pub fn from_loss_observations(
        maximum_conductance: f64,
        water_potential_1: f64,
        water_potential_2: f64,
        loss_fraction_1: f64,
        loss_fraction_2: f64,
        strategy: DamageStrategy,
    ) -> ModelResult<Self> {
        let parameters = WeibullParameters::from_loss_observations(
            maximum_conductance,
            water_potential_1,
            water_potential_2,
            loss_fraction_1,
            loss_fraction_2,
        )?;
        Self::new(parameters, strategy, DamageThresholds::mackay())
    }

    /// Set the initial (and reset) sapwood area.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] unless the area is positive.
    pub fn with_sapwood_area(mut self, sapwood_area: f64) -> ModelResult<Self> {
        if !(sapwood_area.is_finite() && sapwood_area > 0.0) {
            return Err(ModelError::InvalidInput(format!(
                "sapwood area must be positive, got {sapwood_area}"
            )));
        }
        self.sapwood_area = sapwood_area;
        self.base_sapwood_area = sapwood_area;
        Ok(self)
    }

    /// Parameters of the current, possibly damaged, curve
    pub fn parameters(&self) -> &WeibullParameters {
        &self.current
    }

    pub fn base_parameters(&self) -> &WeibullParameters {
        &self.base
    }

    pub fn strategy(&self) -> DamageStrategy {
        self.strategy
    }

    pub fn sapwood_area(&self) -> f64 {
        self.sapwood_area
    }

    /// Current maximum over undamaged maximum, per unit sapwood
    pub fn healthy_fraction(&self) -> f64 {
        self.current.maximum_conductance / self.base.maximum_conductance
    }

    fn refit_to(&mut self, maximum_conductance: f64) -> bool {
        let refitted = analytic_refit(
            &self.base,
            maximum_conductance,
            self.thresholds.critical_conductance_loss_fraction,
        );
        let changed = refitted != self.current;
        self.current = refitted;
        changed
    }

    fn rate_recovery_step(
        &mut self,
        water_potential: f64,
        damage_rate: f64,
        recovery_rate: f64,
    ) -> bool {
        let k = self.current.maximum_conductance;
        let k0 = self.base.maximum_conductance;
        let k_leaf = self.current.conductance(water_potential);

        let recovery = (recovery_rate * (k0 - k)).max(0.0);
        let damage = (damage_rate * (k - k_leaf)).max(0.0);
        self.refit_to(k + recovery - damage)
    }

    /// Continuous sapwood turnover. Always reports `false`: no damage or recovery
    /// event fires here even though the curve and sapwood area drift every step.
    fn impairment_step(
        &mut self,
        water_potential: f64,
        timestep: f64,
        rates: &ImpairmentRates,
    ) -> bool {
        self.sapwood_area = (self.sapwood_area + rates.sapwood_area_change(timestep)).max(0.0);

        let k_leaf = self.current.conductance(water_potential);
        let next = rates.next_maximum_conductance(
            self.current.maximum_conductance,
            self.base.maximum_conductance,
            k_leaf,
            timestep,
        );
        self.refit_to(next);
        false
    }
}

impl ConductanceModel for XylemDamageModel {
    fn conductance(&self, water_potential: f64) -> f64 {
        self.sapwood_area * self.current.conductance(water_potential)
    }

    fn maximum_conductance(&self) -> f64 {
        self.sapwood_area * self.current.maximum_conductance
    }

    fn healthy_maximum_conductance(&self) -> f64 {
        self.base_sapwood_area * self.base.maximum_conductance
    }

    fn thresholds(&self) -> &DamageThresholds {
        &self.thresholds
    }

    fn water_potential_from_loss_fraction(&self, loss_fraction: f64) -> ModelResult<f64> {
        self.current.water_potential_from_loss_fraction(loss_fraction)
    }

    fn update_xylem_damage(
        &mut self,
        water_potential: f64,
        timestep: f64,
        transpiration_rate: f64,
        root_water_potential: f64,
    ) -> ModelResult<bool> {
        match self.strategy {
            DamageStrategy::Analytic | DamageStrategy::IterativeRefit { .. } => threshold_update(
                self,
                water_potential,
                timestep,
                transpiration_rate,
                root_water_potential,
            ),
            DamageStrategy::RateRecovery {
                damage_rate,
                recovery_rate,
            } => Ok(self.rate_recovery_step(water_potential, damage_rate, recovery_rate)),
            DamageStrategy::Impairment(rates) => {
                Ok(self.impairment_step(water_potential, timestep, &rates))
            }
        }
    }

    fn damage_xylem(
        &mut self,
        water_potential: f64,
        _timestep: f64,
        _transpiration_rate: f64,
        _root_water_potential: f64,
    ) -> ModelResult<bool> {
        let critical = self.thresholds.critical_conductance_loss_fraction;
        let target = self.current.conductance(water_potential);

        self.current = match self.strategy {
            DamageStrategy::IterativeRefit { sample_points } => {
                let clamped =
                    clamp_maximum_conductance(target, self.base.maximum_conductance, critical)
                        .min(self.current.maximum_conductance);
                iterative_refit(&self.current, clamped, critical, sample_points)?
            }
            _ => analytic_refit(&self.base, target, critical),
        };

        debug!(
            "Xylem damaged at {:.3} MPa: k_max {:.4}, b {:.4}, c {:.4}",
            water_potential,
            self.current.maximum_conductance,
            self.current.sensitivity_parameter,
            self.current.shape_parameter
        );
        Ok(true)
    }

    fn recover_xylem(
        &mut self,
        _water_potential: f64,
        _timestep: f64,
        _root_water_potential: f64,
    ) -> ModelResult<bool> {
        self.reset_xylem_damage();
        Ok(true)
    }

    fn reset_xylem_damage(&mut self) {
        self.current = self.base;
        self.sapwood_area = self.base_sapwood_area;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model(strategy: DamageStrategy) -> XylemDamageModel {
        XylemDamageModel::from_loss_observations(0.2, -3.0, -4.0, 0.5, 0.88, strategy).unwrap()
    }

    fn assert_within_damage_range(model: &XylemDamageModel) {
        let k = model.parameters().maximum_conductance;
        assert!(k <= 0.2 + 1e-15, "k_max {} above base", k);
        assert!(k >= 0.02 - 1e-15, "k_max {} below floor", k);
    }

    #[test]
    fn test_analytic_damage_then_recovery() {
        let mut model = model(DamageStrategy::Analytic);

        let changed = model.update_xylem_damage(-3.0, 1800.0, 0.1, -0.5).unwrap();
        assert!(changed);
        assert_relative_eq!(model.maximum_conductance(), 0.1, max_relative = 1e-12);
        assert_relative_eq!(model.conductance(0.0), 0.1, max_relative = 1e-12);
        assert_relative_eq!(model.healthy_fraction(), 0.5, max_relative = 1e-12);
        assert_eq!(model.healthy_maximum_conductance(), 0.2);

        // Mild stress above the damage threshold leaves the curve alone
        let before = *model.parameters();
        let changed = model.update_xylem_damage(-0.5, 1800.0, 0.1, -0.5).unwrap();
        assert!(!changed);
        assert_eq!(*model.parameters(), before);

        let changed = model.update_xylem_damage(0.0, 1800.0, 0.0, 0.0).unwrap();
        assert!(changed);
        assert_eq!(model.parameters(), model.base_parameters());
    }

    #[test]
    fn test_severe_damage_is_clamped() {
        let mut model = model(DamageStrategy::Analytic);
        model.update_xylem_damage(-10.0, 1800.0, 0.1, -0.5).unwrap();
        assert_within_damage_range(&model);
        assert_relative_eq!(model.maximum_conductance(), 0.02, max_relative = 1e-9);
    }

    #[test]
    fn test_iterative_refit_damage() {
        let mut model = model(DamageStrategy::IterativeRefit { sample_points: 200 });
        let changed = model.update_xylem_damage(-3.0, 1800.0, 0.1, -0.5).unwrap();
        assert!(changed);
        assert_relative_eq!(model.maximum_conductance(), 0.1, max_relative = 1e-12);
        assert!(model.parameters().shape_parameter > 0.0);
        assert_within_damage_range(&model);

        model.reset_xylem_damage();
        assert_eq!(model.parameters(), model.base_parameters());
    }

    #[test]
    fn test_rate_recovery_relaxes_gradually() {
        let mut model = model(DamageStrategy::RateRecovery {
            damage_rate: 0.1,
            recovery_rate: 0.0,
        });
        model.update_xylem_damage(-3.0, 1800.0, 0.1, -0.5).unwrap();
        // One tenth of the gap between k_max and k(-3) is lost
        assert_relative_eq!(model.maximum_conductance(), 0.19, max_relative = 1e-12);

        let mut model = XylemDamageModel::new(
            analytic_refit(model.base_parameters(), 0.1, 0.9),
            DamageStrategy::RateRecovery {
                damage_rate: 0.0,
                recovery_rate: 0.5,
            },
            DamageThresholds::mackay(),
        )
        .unwrap();
        // Constructed already damaged, so the base is the damaged curve
        assert!(!model.update_xylem_damage(0.0, 1800.0, 0.0, 0.0).unwrap());
        assert_within_damage_range(&model);
    }

    #[test]
    fn test_rate_recovery_round_trip() {
        let mut model = model(DamageStrategy::RateRecovery {
            damage_rate: 0.5,
            recovery_rate: 0.5,
        });
        for _ in 0..5 {
            model.update_xylem_damage(-3.5, 1800.0, 0.1, -0.5).unwrap();
            assert_within_damage_range(&model);
        }
        let damaged = model.maximum_conductance();
        assert!(damaged < 0.2);
        for _ in 0..50 {
            model.update_xylem_damage(0.0, 1800.0, 0.0, 0.0).unwrap();
        }
        assert!(model.maximum_conductance() > damaged);
        assert_relative_eq!(model.maximum_conductance(), 0.2, max_relative = 1e-6);
    }

    #[test]
    fn test_impairment_tracks_sapwood_area() {
        let rates = ImpairmentRates {
            growth_rate: 0.02,
            death_rate: 0.01,
            ..ImpairmentRates::default()
        };
        let mut model = model(DamageStrategy::Impairment(rates))
            .with_sapwood_area(2.0)
            .unwrap();
        assert_eq!(model.maximum_conductance(), 0.4);

        model.update_xylem_damage(-3.0, 1.0, 0.1, -0.5).unwrap();
        assert_relative_eq!(model.sapwood_area(), 2.01, max_relative = 1e-12);
        assert!(model.parameters().maximum_conductance < 0.2);
        assert_within_damage_range(&model);

        model.reset_xylem_damage();
        assert_eq!(model.sapwood_area(), 2.0);
        assert_eq!(model.maximum_conductance(), 0.4);
    }

    #[test]
    fn test_impairment_reports_no_damage_event() {
        let rates = ImpairmentRates {
            growth_rate: 0.05,
            ..ImpairmentRates::default()
        };
        let mut impaired = model(DamageStrategy::Impairment(rates));

        for _ in 0..3 {
            assert!(!impaired.update_xylem_damage(-3.5, 1.0, 0.1, -0.5).unwrap());
        }
        assert!(impaired.sapwood_area() > 1.0);
        assert!(impaired.parameters().maximum_conductance < 0.2);

        // Threshold strategies still flag the event at the same water potential
        let mut analytic = model(DamageStrategy::Analytic);
        assert!(analytic.update_xylem_damage(-3.5, 1.0, 0.1, -0.5).unwrap());
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let params = *model(DamageStrategy::Analytic).base_parameters();
        assert!(XylemDamageModel::new(
            params,
            DamageStrategy::IterativeRefit { sample_points: 1 },
            DamageThresholds::mackay()
        )
        .is_err());
        assert!(XylemDamageModel::new(
            params,
            DamageStrategy::RateRecovery {
                damage_rate: 1.5,
                recovery_rate: 0.0
            },
            DamageThresholds::mackay()
        )
        .is_err());
        assert!(model(DamageStrategy::Analytic).with_sapwood_area(0.0).is_err());
    }

    #[test]
    fn test_strategy_serde_round_trip() {
        let strategy = DamageStrategy::RateRecovery {
            damage_rate: 0.02,
            recovery_rate: 0.01,
        };
        let json = serde_json::to_string(&strategy).unwrap();
        assert!(json.contains("\"kind\":\"rate_recovery\""), "json was {}", json);
        let back: DamageStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, strategy);

        let back: DamageStrategy = serde_json::from_str(r#"{"kind":"impairment"}"#).unwrap();
        assert_eq!(back, DamageStrategy::Impairment(ImpairmentRates::default()));
    }
}
