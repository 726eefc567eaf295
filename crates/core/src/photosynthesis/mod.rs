//! Leaf photosynthesis
//!
//! Solves for the intercellular CO₂ concentration `Ci` at which diffusion
//! through the stomata balances biochemical demand, for both the
//! Rubisco-limited and the electron-transport-limited regime, then combines
//! the two per a [`LimitingPolicy`].
//!
//! Units: stomatal conductance to CO₂ in mol m⁻² s⁻¹, CO₂ in µmol mol⁻¹,
//! O₂ in mmol mol⁻¹, PAR in µmol m⁻² s⁻¹, assimilation in µmol m⁻² s⁻¹.

mod electron_transport;
mod limitation;
mod michaelis_menten;
mod quadratic;
mod rubisco;
mod temperature;

pub use electron_transport::ElectronTransportModel;
pub use limitation::{
    electron_transport_limited_coefficients, rubisco_limited_coefficients, BiochemicalParameters,
    QuadraticCoefficients, RespirationModel,
};
pub use michaelis_menten::{competitive_michaelis_menten_constant, michaelis_menten_response};
pub use quadratic::{largest_root_within, real_roots, smallest_non_negative_root};
pub use rubisco::RubiscoRates;
pub use temperature::{
    arrhenius, peaked_arrhenius, q10, thermal_breakdown_factor, TemperatureResponse,
};

use crate::core_types::units::Kelvin;
use serde::{Deserialize, Serialize};

/// Ambient O₂ mole fraction (mmol mol⁻¹)
pub const DEFAULT_INTERCELLULAR_O2: f64 = 210.0;

/// Leaf state for one photosynthesis evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafConditions {
    /// Stomatal conductance to CO₂ (mol m⁻² s⁻¹)
    pub stomatal_conductance: f64,
    /// Ambient CO₂ `Ca` (µmol mol⁻¹)
    pub atmospheric_co2: f64,
    pub leaf_temperature: Kelvin,
    /// Intercellular O₂ `Oi` (mmol mol⁻¹)
    pub intercellular_o2: f64,
    /// Utilised PAR (µmol m⁻² s⁻¹), `None` for light-saturated transport
    pub utilised_par: Option<f64>,
}

/// Electron bookkeeping of the electron-transport-limited regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhotosynthesisFormulation {
    /// Leuning (1990): `J` enters the balance directly
    #[default]
    Leuning,
    /// Bonan (2019): four electrons per carboxylation
    Bonan,
}

impl PhotosynthesisFormulation {
    pub fn electrons_per_carboxylation(self) -> f64 {
        match self {
            PhotosynthesisFormulation::Leuning => 1.0,
            PhotosynthesisFormulation::Bonan => 4.0,
        }
    }
}

/// How the two regimes are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LimitingPolicy {
    /// Higher `Ci`, i.e. lower assimilation
    #[default]
    MostLimiting,
    /// Lower `Ci`, i.e. higher assimilation
    LeastLimiting,
}

impl LimitingPolicy {
    /// Combine two regime solutions; a NaN regime yields to the other
    pub fn combine(self, rubisco_limited: f64, electron_transport_limited: f64) -> f64 {
        match self {
            LimitingPolicy::MostLimiting => rubisco_limited.max(electron_transport_limited),
            LimitingPolicy::LeastLimiting => rubisco_limited.min(electron_transport_limited),
        }
    }
}

/// Composite photosynthesis model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PhotosynthesisModel {
    pub parameters: BiochemicalParameters,
    pub formulation: PhotosynthesisFormulation,
    pub limiting_policy: LimitingPolicy,
}

impl PhotosynthesisModel {
    pub fn new(parameters: BiochemicalParameters, formulation: PhotosynthesisFormulation) -> Self {
        Self {
            parameters,
            formulation,
            limiting_policy: LimitingPolicy::default(),
        }
    }

    pub fn leuning() -> Self {
        Self::new(BiochemicalParameters::default(), PhotosynthesisFormulation::Leuning)
    }

    pub fn bonan() -> Self {
        Self::new(BiochemicalParameters::default(), PhotosynthesisFormulation::Bonan)
    }

    pub fn with_limiting_policy(mut self, limiting_policy: LimitingPolicy) -> Self {
        self.limiting_policy = limiting_policy;
        self
    }

    /// `Ci` of the Rubisco-limited regime, NaN when no root lies in `[0, Ca]`
    pub fn rubisco_limited_intercellular_co2(&self, leaf: &LeafConditions) -> f64 {
        let t = leaf.leaf_temperature;
        let rubisco = &self.parameters.rubisco;
        let (a, b, c) = rubisco_limited_coefficients(
            leaf.stomatal_conductance,
            leaf.atmospheric_co2,
            rubisco.effective_carboxylation_constant(t, leaf.intercellular_o2),
            rubisco.maximum_carboxylation_rate(t),
            self.parameters.co2_compensation_point(t),
            self.parameters.respiration_rate(t),
        );
        largest_root_within(a, b, c, 0.0, leaf.atmospheric_co2)
    }

    /// `Ci` of the electron-transport-limited regime; `Ca` in the dark
    pub fn electron_transport_limited_intercellular_co2(&self, leaf: &LeafConditions) -> f64 {
        if leaf.utilised_par == Some(0.0) {
            return leaf.atmospheric_co2;
        }
        let t = leaf.leaf_temperature;
        let j = self
            .parameters
            .electron_transport
            .electron_transport_rate(t, leaf.utilised_par);
        let (a, b, c) = electron_transport_limited_coefficients(
            leaf.stomatal_conductance,
            leaf.atmospheric_co2,
            j / self.formulation.electrons_per_carboxylation(),
            self.parameters.co2_compensation_point(t),
            self.parameters.respiration_rate(t),
        );
        largest_root_within(a, b, c, 0.0, leaf.atmospheric_co2)
    }

    /// Combined `Ci` (µmol mol⁻¹), NaN when neither regime has a solution
    pub fn intercellular_co2(&self, leaf: &LeafConditions) -> f64 {
        self.limiting_policy.combine(
            self.rubisco_limited_intercellular_co2(leaf),
            self.electron_transport_limited_intercellular_co2(leaf),
        )
    }

    /// Net assimilation `A = (Ca - Ci) g` and the `Ci` it was computed from
    pub fn net_assimilation(&self, leaf: &LeafConditions) -> (f64, f64) {
        let ci = self.intercellular_co2(leaf);
        ((leaf.atmospheric_co2 - ci) * leaf.stomatal_conductance, ci)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::Celsius;

    fn leaf(stomatal_conductance: f64, utilised_par: Option<f64>) -> LeafConditions {
        LeafConditions {
            stomatal_conductance,
            atmospheric_co2: 400.0,
            leaf_temperature: Celsius::new(25.0).to_kelvin(),
            intercellular_o2: DEFAULT_INTERCELLULAR_O2,
            utilised_par,
        }
    }

    #[test]
    fn test_assimilation_positive_in_daylight() {
        let model = PhotosynthesisModel::leuning();
        let (a, ci) = model.net_assimilation(&leaf(0.1, Some(1000.0)));
        assert!((0.0..400.0).contains(&ci), "Ci = {}", ci);
        assert!(a > 0.0, "A = {}", a);
    }

    #[test]
    fn test_assimilation_increases_with_conductance() {
        let model = PhotosynthesisModel::leuning();
        let mut previous = 0.0;
        for g in [0.01, 0.05, 0.1, 0.3] {
            let (a, _) = model.net_assimilation(&leaf(g, Some(1500.0)));
            assert!(a > previous, "A({}) = {} not above {}", g, a, previous);
            previous = a;
        }
    }

    #[test]
    fn test_darkness_returns_ambient_co2_for_light_regime() {
        let model = PhotosynthesisModel::leuning();
        let dark = leaf(0.1, Some(0.0));
        assert_eq!(model.electron_transport_limited_intercellular_co2(&dark), 400.0);
        // The most-limiting regime then pins Ci to Ca and assimilation to zero
        let (a, ci) = model.net_assimilation(&dark);
        assert_eq!(ci, 400.0);
        assert_eq!(a, 0.0);
    }

    #[test]
    fn test_policy_selects_between_regimes() {
        let conditions = leaf(0.2, Some(200.0));
        let most = PhotosynthesisModel::leuning();
        let least =
            PhotosynthesisModel::leuning().with_limiting_policy(LimitingPolicy::LeastLimiting);

        let rubisco = most.rubisco_limited_intercellular_co2(&conditions);
        let electron = most.electron_transport_limited_intercellular_co2(&conditions);
        assert_eq!(most.intercellular_co2(&conditions), rubisco.max(electron));
        assert_eq!(least.intercellular_co2(&conditions), rubisco.min(electron));
    }

    #[test]
    fn test_nan_regime_yields_to_the_other() {
        assert_eq!(LimitingPolicy::MostLimiting.combine(f64::NAN, 250.0), 250.0);
        assert_eq!(LimitingPolicy::LeastLimiting.combine(250.0, f64::NAN), 250.0);
        assert!(LimitingPolicy::MostLimiting.combine(f64::NAN, f64::NAN).is_nan());
    }

    #[test]
    fn test_bonan_uses_fewer_electrons_per_carboxylation() {
        let conditions = leaf(0.2, Some(1000.0));
        let leuning = PhotosynthesisModel::leuning()
            .electron_transport_limited_intercellular_co2(&conditions);
        let bonan =
            PhotosynthesisModel::bonan().electron_transport_limited_intercellular_co2(&conditions);
        assert!(bonan > leuning, "Bonan {} Leuning {}", bonan, leuning);
    }

    #[test]
    fn test_zero_conductance_is_finite() {
        let model = PhotosynthesisModel::leuning();
        let (a, ci) = model.net_assimilation(&leaf(0.0, Some(1000.0)));
        assert!(ci.is_finite());
        assert_eq!(a, 0.0);
    }
}
