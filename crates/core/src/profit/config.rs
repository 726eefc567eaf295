//! Serialisable model configuration
//!
//! A [`ModelConfig`] describes a complete optimisation model as plain data.
//! Every field has a default, so a JSON document only needs to name what it
//! changes:
//!
//! ```
//! use stomatal_core::profit::ModelConfig;
//!
//! let json = r#"{ "cost": "sox", "profit_form": "retained_conductance" }"#;
//! let config = ModelConfig::from_json(json).unwrap();
//! let model = config.build().unwrap();
//! assert!(model.hydraulic_cost().critical_water_potential() < -4.0);
//! ```

use super::cost::HydraulicCostKind;
use super::optimizer::{OptimizerSettings, ProfitForm, ProfitOptimisationModel};
use crate::conductance::{
    AgeStructuredConductanceModel, CappedConductanceModel, ConductanceModel, DamageThresholds,
    SoxCurve, SoxParameters, WeibullCurve, WeibullParameters, WholeTrunkConductanceModel,
};
use crate::core_types::error::{ModelError, ModelResult};
use crate::damage::{DamageStrategy, XylemDamageModel};
use crate::photosynthesis::PhotosynthesisModel;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Two conductance-loss observations and the maximum conductance a curve is
/// fitted through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityObservations {
    /// mmol m⁻² s⁻¹ `MPa`⁻¹
    pub maximum_conductance: f64,
    /// `MPa`
    pub water_potential_1: f64,
    /// `MPa`
    pub water_potential_2: f64,
    pub loss_fraction_1: f64,
    pub loss_fraction_2: f64,
}

impl Default for VulnerabilityObservations {
    /// P50 = -3 `MPa`, P88 = -4 `MPa`, `k_max` = 0.2
    fn default() -> Self {
        Self {
            maximum_conductance: 0.2,
            water_potential_1: -3.0,
            water_potential_2: -4.0,
            loss_fraction_1: 0.5,
            loss_fraction_2: 0.88,
        }
    }
}

fn refit_thresholds() -> DamageThresholds {
    DamageThresholds::mackay()
}

/// Conductance curve and the wrappers stacked on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConductanceConfig {
    Weibull {
        #[serde(default)]
        curve: VulnerabilityObservations,
        #[serde(default)]
        thresholds: DamageThresholds,
    },
    Sox {
        #[serde(default)]
        curve: VulnerabilityObservations,
        #[serde(default)]
        thresholds: DamageThresholds,
    },
    /// Weibull curve refitted by embolism damage
    XylemDamage {
        #[serde(default)]
        curve: VulnerabilityObservations,
        #[serde(default)]
        strategy: DamageStrategy,
        #[serde(default = "refit_thresholds")]
        thresholds: DamageThresholds,
    },
    Capped {
        base: Box<ConductanceConfig>,
    },
    AgeStructured {
        base: Box<ConductanceConfig>,
        num_ages: usize,
        /// s
        timestep: f64,
        growth_rate: f64,
        turnover_rate: f64,
    },
    WholeTrunk {
        base: Box<ConductanceConfig>,
    },
}

impl Default for ConductanceConfig {
    fn default() -> Self {
        ConductanceConfig::Weibull {
            curve: VulnerabilityObservations::default(),
            thresholds: DamageThresholds::default(),
        }
    }
}

impl ConductanceConfig {
    /// Instantiate the configured curve.
    ///
    /// # Errors
    /// [`ModelError::Fit`] for degenerate observations and
    /// [`ModelError::InvalidInput`] for invalid wrapper settings.
    pub fn build(&self) -> ModelResult<Box<dyn ConductanceModel>> {
        let model: Box<dyn ConductanceModel> = match self {
            ConductanceConfig::Weibull { curve, thresholds } => {
                thresholds.validate()?;
                Box::new(WeibullCurve::new(weibull_parameters(curve)?, *thresholds))
            }
            ConductanceConfig::Sox { curve, thresholds } => {
                thresholds.validate()?;
                let parameters = SoxParameters::from_loss_observations(
                    curve.maximum_conductance,
                    curve.water_potential_1,
                    curve.water_potential_2,
                    curve.loss_fraction_1,
                    curve.loss_fraction_2,
                )?;
                Box::new(SoxCurve::new(parameters, *thresholds))
            }
            ConductanceConfig::XylemDamage {
                curve,
                strategy,
                thresholds,
            } => Box::new(XylemDamageModel::new(
                weibull_parameters(curve)?,
                *strategy,
                *thresholds,
            )?),
            ConductanceConfig::Capped { base } => {
                Box::new(CappedConductanceModel::new(base.build()?))
            }
            ConductanceConfig::AgeStructured {
                base,
                num_ages,
                timestep,
                growth_rate,
                turnover_rate,
            } => Box::new(AgeStructuredConductanceModel::new(
                base.build()?,
                *num_ages,
                *timestep,
                *growth_rate,
                *turnover_rate,
            )?),
            ConductanceConfig::WholeTrunk { base } => {
                Box::new(WholeTrunkConductanceModel::new(base.build()?))
            }
        };
        Ok(model)
    }
}

fn weibull_parameters(curve: &VulnerabilityObservations) -> ModelResult<WeibullParameters> {
    WeibullParameters::from_loss_observations(
        curve.maximum_conductance,
        curve.water_potential_1,
        curve.water_potential_2,
        curve.loss_fraction_1,
        curve.loss_fraction_2,
    )
}

/// Complete optimisation model description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub conductance: ConductanceConfig,
    pub cost: HydraulicCostKind,
    /// Loss fraction defining the critical water potential of the cost model
    pub critical_conductance_loss_fraction: f64,
    pub photosynthesis: PhotosynthesisModel,
    /// Overrides the cost model's natural profit form
    pub profit_form: Option<ProfitForm>,
    pub settings: OptimizerSettings,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            conductance: ConductanceConfig::default(),
            cost: HydraulicCostKind::ProfitMax,
            critical_conductance_loss_fraction: 0.95,
            photosynthesis: PhotosynthesisModel::leuning(),
            profit_form: None,
            settings: OptimizerSettings::default(),
        }
    }
}

impl ModelConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] carrying the parser message.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ModelError::InvalidInput(format!("model configuration: {e}")))
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    /// [`ModelError::InvalidInput`] if a value cannot be represented.
    pub fn to_json(&self) -> ModelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ModelError::InvalidInput(format!("model configuration: {e}")))
    }

    /// Instantiate the optimisation model.
    ///
    /// # Errors
    /// Curve fitting, cost construction and settings validation errors.
    pub fn build(&self) -> ModelResult<ProfitOptimisationModel> {
        let conductance = self.conductance.build()?;
        let model = ProfitOptimisationModel::new(
            conductance,
            self.cost,
            self.critical_conductance_loss_fraction,
            self.photosynthesis.clone(),
        )?;
        let model = match self.profit_form {
            Some(form) => model.with_profit_form(form),
            None => model,
        };
        let model = model.with_settings(self.settings)?;
        info!(
            "Built {:?} optimisation model ({:?} profit, {} samples)",
            self.cost,
            model.profit_form(),
            self.settings.sample_points
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_builds() {
        let model = ModelConfig::default().build().unwrap();
        assert_eq!(model.profit_form(), ProfitForm::Additive);
        assert_eq!(model.conductance_model().conductance(0.0), 0.2);
        assert_relative_eq!(model.conductance_model().conductance(-3.0), 0.1, max_relative = 1e-9);
    }

    #[test]
    fn test_json_round_trip() {
        let config = ModelConfig {
            conductance: ConductanceConfig::Capped {
                base: Box::new(ConductanceConfig::XylemDamage {
                    curve: VulnerabilityObservations::default(),
                    strategy: DamageStrategy::rate_recovery(),
                    thresholds: DamageThresholds::mackay(),
                }),
            },
            cost: HydraulicCostKind::Sox,
            profit_form: Some(ProfitForm::Product),
            ..ModelConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(ModelConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = ModelConfig::from_json(
            r#"{
                "conductance": { "kind": "age_structured",
                                 "base": { "kind": "weibull" },
                                 "num_ages": 5, "timestep": 1800.0,
                                 "growth_rate": 0.0001, "turnover_rate": 0.1 },
                "settings": { "sample_points": 200 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.settings.sample_points, 200);
        assert_eq!(config.settings.ci_ratio_limit, 0.95);
        assert_eq!(config.critical_conductance_loss_fraction, 0.95);
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_bad_configs_rejected() {
        assert!(matches!(
            ModelConfig::from_json("{ \"cost\": \"unknown\" }"),
            Err(ModelError::InvalidInput(_))
        ));

        let config = ModelConfig {
            conductance: ConductanceConfig::Weibull {
                curve: VulnerabilityObservations {
                    water_potential_2: -3.0,
                    ..VulnerabilityObservations::default()
                },
                thresholds: DamageThresholds::default(),
            },
            ..ModelConfig::default()
        };
        assert!(matches!(config.build(), Err(ModelError::Fit { .. })));
    }
}
