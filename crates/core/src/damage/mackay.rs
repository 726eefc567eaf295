//! Embolism refits of a Weibull vulnerability curve
//!
//! After a damaging event the curve's maximum conductance drops to the
//! conductance observed under tension, `k'`. The sensitivity and shape
//! parameters are then refitted so the damaged curve joins the previous one.
//!
//! # Scientific References
//! - Mackay, D.S. et al. (2015). "Interdependence of chronic hydraulic
//!   dysfunction and canopy processes can improve integrated models of tree
//!   response to drought." Water Resources Research, 51, 6156-6176

use crate::conductance::{weibull_conductance, WeibullParameters};
use crate::core_types::error::{ModelError, ModelResult};
use crate::core_types::numerics::{golden_section_minimise, linspace};
use std::f64::consts::E;

/// Relative tolerance of the shape parameter search
const SHAPE_SEARCH_TOLERANCE: f64 = 1e-8;

/// Bracket of the shape search as a multiple of the current shape
const SHAPE_SEARCH_SPAN: f64 = 10.0;

/// Clamp a maximum conductance to
/// `[(1 - critical loss) × base maximum, base maximum]`.
#[inline]
pub fn clamp_maximum_conductance(
    maximum_conductance: f64,
    base_maximum_conductance: f64,
    critical_loss_fraction: f64,
) -> f64 {
    let floor = (1.0 - critical_loss_fraction) * base_maximum_conductance;
    maximum_conductance.max(floor).min(base_maximum_conductance)
}

/// Closed-form refit referenced to the undamaged curve.
///
/// The new sensitivity parameter is where the undamaged curve reaches
/// `k'/e`, and the new shape keeps the slope of both curves equal there:
///
/// ```text
/// b' = b0 (1 - ln(k'/k0))^(1/c0)
/// c' = c0 (b'/b0)^c0
/// ```
///
/// `k'` is clamped to the admissible damage range first.
pub fn analytic_refit(
    base: &WeibullParameters,
    maximum_conductance: f64,
    critical_loss_fraction: f64,
) -> WeibullParameters {
    let k0 = base.maximum_conductance;
    let b0 = base.sensitivity_parameter;
    let c0 = base.shape_parameter;

    let k_new = clamp_maximum_conductance(maximum_conductance, k0, critical_loss_fraction);
    let b_new = b0 * (1.0 - (k_new / k0).ln()).powf(1.0 / c0);
    let c_new = c0 * (b_new / b0).powf(c0);

    WeibullParameters {
        maximum_conductance: k_new,
        sensitivity_parameter: b_new,
        shape_parameter: c_new,
    }
}

/// Refit referenced to the current curve, with the shape found numerically.
///
/// `b'` is where the current curve reaches `k'/e`. The loss profile of the
/// current curve capped at `k'` is sampled on `[0, ψ_crit]` and `c'` minimises
///
/// ```text
/// (Σ P·k̂)² / ((Σ P)² (Σ k̂)²)
/// ```
///
/// over candidate curves `k̂` with parameters `(k', b', c)`. When the capped
/// profile shows no loss the current shape is kept.
///
/// # Errors
/// [`ModelError::InvalidInput`] for fewer than two sample points or a
/// non-positive target conductance; [`ModelError::Domain`] when the target
/// lies above the current maximum.
pub fn iterative_refit(
    current: &WeibullParameters,
    maximum_conductance: f64,
    critical_loss_fraction: f64,
    sample_points: usize,
) -> ModelResult<WeibullParameters> {
    if sample_points < 2 {
        return Err(ModelError::InvalidInput(format!(
            "iterative refit needs at least 2 sample points, got {sample_points}"
        )));
    }
    if !(maximum_conductance.is_finite() && maximum_conductance > 0.0) {
        return Err(ModelError::InvalidInput(format!(
            "refit target conductance must be positive, got {maximum_conductance}"
        )));
    }
    if maximum_conductance > current.maximum_conductance {
        return Err(ModelError::domain(
            "refit target conductance",
            maximum_conductance,
            "(0, current maximum conductance]",
        ));
    }

    let loss_at_b = 1.0 - maximum_conductance / (E * current.maximum_conductance);
    let b_new = current.water_potential_from_loss_fraction(loss_at_b)?;
    let critical_water_potential =
        current.water_potential_from_loss_fraction(critical_loss_fraction)?;

    let water_potentials = linspace(0.0, critical_water_potential, sample_points);
    let loss_profile: Vec<f64> = water_potentials
        .iter()
        .map(|&psi| {
            1.0 - current.conductance(psi).min(maximum_conductance).max(0.0) / maximum_conductance
        })
        .collect();
    let total_loss: f64 = loss_profile.iter().sum();

    let c_current = current.shape_parameter;
    let c_new = if total_loss > 0.0 {
        let score = |c: f64| {
            let (weighted, total) = water_potentials.iter().zip(&loss_profile).fold(
                (0.0, 0.0),
                |(weighted, total), (&psi, &p)| {
                    let k = weibull_conductance(psi, maximum_conductance, b_new, c);
                    (weighted + p * k, total + k)
                },
            );
            weighted.powi(2) / (total_loss.powi(2) * total.powi(2))
        };
        golden_section_minimise(
            score,
            c_current / SHAPE_SEARCH_SPAN,
            c_current * SHAPE_SEARCH_SPAN,
            SHAPE_SEARCH_TOLERANCE * c_current,
        )
    } else {
        c_current
    };

    Ok(WeibullParameters {
        maximum_conductance,
        sensitivity_parameter: b_new,
        shape_parameter: c_new,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base() -> WeibullParameters {
        WeibullParameters::from_loss_observations(0.2, -3.0, -4.0, 0.5, 0.88).unwrap()
    }

    #[test]
    fn test_analytic_refit_without_damage_is_identity() {
        let base = base();
        let refit = analytic_refit(&base, base.maximum_conductance, 0.9);
        assert_relative_eq!(
            refit.sensitivity_parameter,
            base.sensitivity_parameter,
            epsilon = 1e-12
        );
        assert_relative_eq!(refit.shape_parameter, base.shape_parameter, epsilon = 1e-12);
    }

    #[test]
    fn test_analytic_refit_joins_base_curve_at_new_sensitivity() {
        let base = base();
        let refit = analytic_refit(&base, 0.1, 0.9);
        let b = refit.sensitivity_parameter;

        assert!(b < base.sensitivity_parameter, "b' = {}", b);
        assert_relative_eq!(refit.conductance(b), base.conductance(b), max_relative = 1e-10);
        assert_relative_eq!(refit.conductance(b), 0.1 / E, max_relative = 1e-10);
        assert_relative_eq!(refit.gradient(b), base.gradient(b), max_relative = 1e-8);
    }

    #[test]
    fn test_analytic_refit_clamps_maximum() {
        let base = base();
        assert_relative_eq!(
            analytic_refit(&base, 0.0, 0.9).maximum_conductance,
            0.02,
            epsilon = 1e-12
        );
        assert_eq!(analytic_refit(&base, 0.5, 0.9).maximum_conductance, 0.2);
    }

    #[test]
    fn test_iterative_refit_sets_sensitivity_from_current_curve() {
        let current = base();
        let refit = iterative_refit(&current, 0.1, 0.9, 200).unwrap();
        assert_eq!(refit.maximum_conductance, 0.1);
        assert_relative_eq!(
            current.conductance(refit.sensitivity_parameter),
            0.1 / E,
            max_relative = 1e-10
        );
        assert!(refit.shape_parameter.is_finite() && refit.shape_parameter > 0.0);
        assert!(refit.shape_parameter >= current.shape_parameter / 10.0);
        assert!(refit.shape_parameter <= current.shape_parameter * 10.0);
    }

    #[test]
    fn test_iterative_refit_at_current_maximum_keeps_sensitivity() {
        let current = base();
        let refit = iterative_refit(&current, 0.2, 0.9, 50).unwrap();
        assert_relative_eq!(
            refit.sensitivity_parameter,
            current.sensitivity_parameter,
            max_relative = 1e-10
        );
        assert!(refit.shape_parameter > 0.0);
    }

    #[test]
    fn test_iterative_refit_rejects_bad_inputs() {
        let current = base();
        assert!(iterative_refit(&current, 0.1, 0.9, 1).is_err());
        assert!(iterative_refit(&current, 0.0, 0.9, 100).is_err());
        assert!(iterative_refit(&current, 0.3, 0.9, 100).is_err());
    }
}
