//! Sigmoidal vulnerability curve of the SOX model
//!
//! ```text
//! k(ψ) = k_max / (1 + (ψ/ψ50)^c)
//! ```
//!
//! # Scientific References
//! - Eller, C.B. et al. (2018). Phil. Trans. R. Soc. B, 373, 20170315
//! - Eller, C.B. et al. (2020). "Stomatal optimization based on xylem hydraulics
//!   (SOX) improves land surface model simulation of vegetation responses to
//!   climate." New Phytologist, 226, 1622-1637

use super::weibull::validate_observations;
use super::{check_loss_fraction, ConductanceModel, DamageThresholds};
use crate::core_types::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// SOX conductance at a water potential. Saturates at `maximum_conductance`
/// for potentials of the opposite sign to `p50`.
#[inline]
pub fn sox_conductance(
    water_potential: f64,
    maximum_conductance: f64,
    p50: f64,
    shape_parameter: f64,
) -> f64 {
    let ratio = (water_potential / p50).max(0.0);
    maximum_conductance / (1.0 + ratio.powf(shape_parameter))
}

/// Parameters of the sigmoidal curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoxParameters {
    /// Maximum conductance (mmol m⁻² s⁻¹ `MPa`⁻¹)
    pub maximum_conductance: f64,
    /// Water potential at 50% conductance loss (`MPa`)
    pub p50: f64,
    /// Shape parameter (unitless)
    pub shape_parameter: f64,
}

impl SoxParameters {
    /// Fit `ψ50` and `c` through two observed conductance losses by logit
    /// linearisation, with `f = 1 - L` the remaining conductance fraction:
    ///
    /// ```text
    /// c   = (ln(1/f1 - 1) - ln(1/f2 - 1)) / ln(ψ1/ψ2)
    /// ψ50 = ψ1 (1/f1 - 1)^(-1/c)
    /// ```
    ///
    /// # Errors
    /// [`ModelError::Fit`] for degenerate observations, potentials of
    /// opposite sign, or non-finite / non-positive fitted shape.
    pub fn from_loss_observations(
        maximum_conductance: f64,
        water_potential_1: f64,
        water_potential_2: f64,
        loss_fraction_1: f64,
        loss_fraction_2: f64,
    ) -> ModelResult<Self> {
        const CURVE: &str = "SOX";
        validate_observations(
            CURVE,
            maximum_conductance,
            [water_potential_1, water_potential_2],
            [loss_fraction_1, loss_fraction_2],
        )?;
        if water_potential_1.signum() != water_potential_2.signum() {
            return Err(ModelError::fit(
                CURVE,
                "observation water potentials have opposite signs",
            ));
        }

        let logit_1 = (1.0 / (1.0 - loss_fraction_1) - 1.0).ln();
        let logit_2 = (1.0 / (1.0 - loss_fraction_2) - 1.0).ln();
        let shape_parameter = (logit_1 - logit_2) / (water_potential_1 / water_potential_2).ln();
        let p50 =
            water_potential_1 * (1.0 / (1.0 - loss_fraction_1) - 1.0).powf(-1.0 / shape_parameter);

        if !shape_parameter.is_finite() || shape_parameter <= 0.0 || !p50.is_finite() {
            return Err(ModelError::fit(
                CURVE,
                format!("fitted parameters p50 = {p50}, c = {shape_parameter} are not usable"),
            ));
        }

        Ok(Self {
            maximum_conductance,
            p50,
            shape_parameter,
        })
    }

    #[inline]
    pub fn conductance(&self, water_potential: f64) -> f64 {
        sox_conductance(water_potential, self.maximum_conductance, self.p50, self.shape_parameter)
    }

    /// Inverse of the curve, `ψ(L) = ψ50 (1/(1 - L) - 1)^(1/c)`.
    ///
    /// # Errors
    /// [`ModelError::Domain`] unless `0 ≤ loss_fraction < 1`.
    pub fn water_potential_from_loss_fraction(&self, loss_fraction: f64) -> ModelResult<f64> {
        check_loss_fraction(loss_fraction)?;
        Ok(self.p50 * (1.0 / (1.0 - loss_fraction) - 1.0).powf(1.0 / self.shape_parameter))
    }
}

/// Static SOX vulnerability curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoxCurve {
    parameters: SoxParameters,
    thresholds: DamageThresholds,
}

impl SoxCurve {
    pub fn new(parameters: SoxParameters, thresholds: DamageThresholds) -> Self {
        Self {
            parameters,
            thresholds,
        }
    }

    /// Fit the curve through two observed conductance losses with default
    /// thresholds.
    ///
    /// # Errors
    /// See [`SoxParameters::from_loss_observations`].
    pub fn from_loss_observations(
        maximum_conductance: f64,
        water_potential_1: f64,
        water_potential_2: f64,
        loss_fraction_1: f64,
        loss_fraction_2: f64,
    ) -> ModelResult<Self> {
        let parameters = SoxParameters::from_loss_observations(
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

    pub fn parameters(&self) -> &SoxParameters {
        &self.parameters
    }
}

impl ConductanceModel for SoxCurve {
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
