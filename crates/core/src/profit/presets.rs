//! Ready-made optimisation models
//!
//! Both presets fit their vulnerability curve through P50 = -3 `MPa` and
//! P88 = -4 `MPa` with a maximum conductance of 0.2 mmol m⁻² s⁻¹ `MPa`⁻¹, put
//! the critical point at 95% conductance loss and use Leuning
//! photosynthesis.

use super::config::{ConductanceConfig, ModelConfig, VulnerabilityObservations};
use super::cost::HydraulicCostKind;
use super::optimizer::ProfitOptimisationModel;
use crate::conductance::DamageThresholds;
use crate::core_types::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Weibull curve with the additive `ProfitMax` cost
    ProfitMax,
    /// SOX curve with the retained-conductance cost
    Sox,
}

impl Preset {
    pub fn config(self) -> ModelConfig {
        match self {
            Preset::ProfitMax => ModelConfig::profit_max(),
            Preset::Sox => ModelConfig::sox(),
        }
    }
}

impl FromStr for Preset {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "profit-max" | "profit_max" | "profitmax" => Ok(Preset::ProfitMax),
            "sox" => Ok(Preset::Sox),
            other => Err(ModelError::InvalidInput(format!(
                "unknown preset '{other}', expected profit-max or sox"
            ))),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::ProfitMax => write!(f, "profit-max"),
            Preset::Sox => write!(f, "sox"),
        }
    }
}

impl ModelConfig {
    pub fn profit_max() -> Self {
        Self {
            conductance: ConductanceConfig::Weibull {
                curve: VulnerabilityObservations::default(),
                thresholds: DamageThresholds::default(),
            },
            cost: HydraulicCostKind::ProfitMax,
            ..Self::default()
        }
    }

    pub fn sox() -> Self {
        Self {
            conductance: ConductanceConfig::Sox {
                curve: VulnerabilityObservations::default(),
                thresholds: DamageThresholds::default(),
            },
            cost: HydraulicCostKind::Sox,
            ..Self::default()
        }
    }
}

/// # Errors
/// Never fails for the built-in parameters; propagates construction errors.
pub fn build_profit_max_model() -> ModelResult<ProfitOptimisationModel> {
    ModelConfig::profit_max().build()
}

/// # Errors
/// Never fails for the built-in parameters; propagates construction errors.
pub fn build_sox_model() -> ModelResult<ProfitOptimisationModel> {
    ModelConfig::sox().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profit::optimizer::ProfitForm;
    use approx::assert_relative_eq;

    #[test]
    fn test_presets_build() {
        let profit_max = build_profit_max_model().unwrap();
        assert_eq!(profit_max.profit_form(), ProfitForm::Additive);
        assert_eq!(profit_max.hydraulic_cost().kind(), HydraulicCostKind::ProfitMax);

        let sox = build_sox_model().unwrap();
        assert_eq!(sox.profit_form(), ProfitForm::RetainedConductance);
        assert_relative_eq!(sox.conductance_model().conductance(-3.0), 0.1, max_relative = 1e-9);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!("profit-max".parse::<Preset>().unwrap(), Preset::ProfitMax);
        assert_eq!("SOX".parse::<Preset>().unwrap(), Preset::Sox);
        assert!("dynamic".parse::<Preset>().is_err());
        assert_eq!(Preset::ProfitMax.to_string(), "profit-max");
        assert_eq!(Preset::Sox.config(), ModelConfig::sox());
    }
}
