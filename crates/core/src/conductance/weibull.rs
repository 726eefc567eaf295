//! Cumulative Weibull vulnerability curve
//!
//! ```text
//! k(ψ) = k_max × exp(-(ψ/b)^c)
//! ```
//!
//! `b` is the sensitivity parameter (`MPa`, negative when fitted from
//! potentials under tension) and `c` the dimensionless shape parameter.
//!
//! # Scientific References
//! - Neufeld, H.S. et al. (1992). "Genotypic variability in vulnerability of
//!   leaf xylem to cavitation in water-stressed and well-irrigated sugarcane."
//!   Plant Physiology, 100, 1020-1028
//! - Sperry, J.S. et al. (2016). New Phytologist, 212, 577-589

use super::{check_loss_fraction, ConductanceModel, DamageThresholds};
use crate::core_types::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Weibull conductance at a water potential.
///
/// Non-negative potentials (and any potential of the opposite sign to `b`)
/// saturate at `maximum_conductance`.
#[inline]
pub fn weibull_conductance(
    water_potential: f64,
    maximum_conductance: f64,
    sensitivity_parameter: f64,
    shape_parameter: f64,
) -> f64 {
    let ratio = (water_potential / sensitivity_parameter).max(0.0);
    maximum_conductance * (-ratio.powf(shape_parameter)).exp()
}

/// Parameters of a cumulative Weibull curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeibullParameters {
    /// Maximum conductance (mmol m⁻² s⁻¹ `MPa`⁻¹)
    pub maximum_conductance: f64,
    /// Sensitivity parameter `b` (`MPa`)
    pub sensitivity_parameter: f64,
    /// Shape parameter `c` (unitless)
    pub shape_parameter: f64,
}

impl WeibullParameters {
    /// Fit `b` and `c` through two observed conductance losses.
    ///
    /// ```text
    /// c = ln( ln(1 - L1) / ln(1 - L2) ) / ( ln|ψ1| - ln|ψ2| )
    /// b = ψ1 / (-ln(1 - L1))^(1/c)
    /// ```
    ///
    /// # Arguments
    /// * `maximum_conductance` - Maximum conductance (mmol m⁻² s⁻¹ `MPa`⁻¹)
    /// * `water_potential_1`, `water_potential_2` - Observation potentials (`MPa`)
    /// * `loss_fraction_1`, `loss_fraction_2` - Observed conductance loss fractions
    ///
    /// # Errors
    /// [`ModelError::Fit`] when the observations are degenerate (equal
    /// potentials or losses, a zero potential, a loss outside (0, 1)) or the
    /// fitted parameters are not finite with `c > 0`.
    pub fn from_loss_observations(
        maximum_conductance: f64,
        water_potential_1: f64,
        water_potential_2: f64,
        loss_fraction_1: f64,
        loss_fraction_2: f64,
    ) -> ModelResult<Self> {
        const CURVE: &str = "Weibull";
        validate_observations(
            CURVE,
            maximum_conductance,
            [water_potential_1, water_potential_2],
            [loss_fraction_1, loss_fraction_2],
        )?;

        let shape_parameter = ((1.0 - loss_fraction_1).ln() / (1.0 - loss_fraction_2).ln()).ln()
            / (water_potential_1.abs().ln() - water_potential_2.abs().ln());
        let sensitivity_parameter =
            water_potential_1 / (-(1.0 - loss_fraction_1).ln()).powf(1.0 / shape_parameter);

        if !shape_parameter.is_finite()
            || shape_parameter <= 0.0
            || !sensitivity_parameter.is_finite()
        {
            return Err(ModelError::fit(
                CURVE,
                format!(
                    "fitted parameters unusable: b = {sensitivity_parameter}, c = {shape_parameter}"
                ),
            ));
        }

        Ok(Self {
            maximum_conductance,
            sensitivity_parameter,
            shape_parameter,
        })
    }

    #[inline]
    pub fn conductance(&self, water_potential: f64) -> f64 {
        weibull_conductance(
            water_potential,
            self.maximum_conductance,
            self.sensitivity_parameter,
            self.shape_parameter,
        )
    }

    /// Inverse of the curve, `ψ(L) = b(-ln(1 - L))^(1/c)`.
    ///
    /// # Errors
    /// [`ModelError::Domain`] unless `0 ≤ loss_fraction < 1`.
    pub fn water_potential_from_loss_fraction(&self, loss_fraction: f64) -> ModelResult<f64> {
        check_loss_fraction(loss_fraction)?;
        Ok(self.sensitivity_parameter
            * (-(1.0 - loss_fraction).ln()).powf(1.0 / self.shape_parameter))
    }

    /// Slope dk/dψ of the curve
    pub fn gradient(&self, water_potential: f64) -> f64 {
        let ratio = (water_potential / self.sensitivity_parameter).max(0.0);
        -self.conductance(water_potential)
            * self.shape_parameter
            * ratio.powf(self.shape_parameter - 1.0)
            / self.sensitivity_parameter
    }
}

/// Shared degeneracy checks for two-point curve fits.
pub(super) fn validate_observations(
    curve: &'static str,
    maximum_conductance: f64,
    water_potentials: [f64; 2],
    loss_fractions: [f64; 2],
) -> ModelResult<()> {
    if !(maximum_conductance.is_finite() && maximum_conductance > 0.0) {
        return Err(ModelError::fit(
            curve,
            format!("maximum conductance must be positive, got {maximum_conductance}"),
        ));
    }
    for psi in water_potentials {
        if !psi.is_finite() || psi == 0.0 {
            return Err(ModelError::fit(
                curve,
                format!("observation water potential must be finite and non-zero, got {psi}"),
            ));
        }
    }
    for loss in loss_fractions {
        if !(loss > 0.0 && loss < 1.0) {
            return Err(ModelError::fit(
                curve,
                format!("observed loss fraction must lie in (0, 1), got {loss}"),
            ));
        }
    }
    if water_potentials[0] == water_potentials[1] {
        return Err(ModelError::fit(curve, "observation water potentials are equal"));
    }
    if loss_fractions[0] == loss_fractions[1] {
        return Err(ModelError::fit(curve, "observed loss fractions are equal"));
    }
    Ok(())
}

/// Static cumulative Weibull vulnerability curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeibullCurve {
    parameters: WeibullParameters,
    thresholds: DamageThresholds,
}

impl WeibullCurve {
    pub fn new(parameters: WeibullParameters, thresholds: DamageThresholds) -> Self {
        Self {
            parameters,
            thresholds,
        }
    }

    /// Fit the curve through two observed conductance losses with default
    /// thresholds.
    ///
    /// # Errors
    /// See [`WeibullParameters::from_loss_observations`].
    pub fn from_loss_observations(
        maximum_conductance: f64,
        water_potential_1: f64,
        water_potential_2: f64,
        loss_fraction_1: f64,
        loss_fraction_2: f64,
    ) -> ModelResult<Self> {
        let parameters = WeibullParameters::from_loss_observations(
            maximum_conductance,
            water_potential_1,
            water_potential_2,
            loss_fraction_1,
            loss_fraction_2,
        )?;
        Ok(Self::new(parameters, DamageThresholds::default()))
    }

    pub fn with_thresholds(mut self, thresholds: DamageThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn parameters(&self) -> &WeibullParameters {
        &self.parameters
    }

    pub fn sensitivity_parameter(&self) -> f64 {
        self.parameters.sensitivity_parameter
    }

    pub fn shape_parameter(&self) -> f64 {
        self.parameters.shape_parameter
    }
}

impl ConductanceModel for WeibullCurve {
    fn conductance(&self, water_potential: f64) -> f64 {
        self.parameters.conductance(water_potential)
    }

    fn maximum_conductance(&self) -> f64 {
        self.parameters.maximum_conductance
    }

    fn healthy_maximum_conductance(&self) -> f64 {
        self.parameters.maximum_conductance
    }

    fn thresholds(&self) -> &DamageThresholds {
        &self.thresholds
    }

    fn water_potential_from_loss_fraction(&self, loss_fraction: f64) -> ModelResult<f64> {
        self.parameters.water_potential_from_loss_fraction(loss_fraction)
    }
}
