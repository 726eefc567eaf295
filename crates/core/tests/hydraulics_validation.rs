//! Validation of the xylem hydraulics against published curve properties
//!
//! Covers the vulnerability curves, their inverse mappings and the damage
//! state machines that mutate them between timesteps.
//!
//! Run with: cargo test --test `hydraulics_validation`

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stomatal_core::conductance::{
    AgeStructuredConductanceModel, CappedConductanceModel, ConductanceModel, SoxCurve, WeibullCurve,
    WholeTrunkConductanceModel,
};
use stomatal_core::damage::{DamageStrategy, XylemDamageModel};
use stomatal_core::ModelError;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn weibull() -> WeibullCurve {
    WeibullCurve::from_loss_observations(0.2, -3.0, -4.0, 0.5, 0.88).unwrap()
}

fn sox() -> SoxCurve {
    SoxCurve::from_loss_observations(0.2, -3.0, -4.0, 0.5, 0.88).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Static curves
// ═══════════════════════════════════════════════════════════════════════════════

/// P50 = -3 `MPa`, P88 = -4 `MPa`: negative sensitivity, positive shape
#[test]
fn test_weibull_reference_fit() {
    let curve = weibull();
    assert!(curve.sensitivity_parameter() < 0.0);
    assert!(curve.shape_parameter() > 0.0 && curve.shape_parameter().is_finite());
    assert_eq!(curve.conductance(0.0), 0.2);
    assert_relative_eq!(curve.conductance(-3.0), 0.1, max_relative = 1e-9);
    assert_relative_eq!(curve.conductance(-4.0), 0.2 * 0.12, max_relative = 1e-9);
}

#[test]
fn test_sox_reference_fit() {
    let curve = sox();
    assert_eq!(curve.conductance(0.0), 0.2);
    assert_relative_eq!(curve.conductance(-3.0), 0.1, max_relative = 1e-9);
    assert_relative_eq!(curve.conductance(-4.0), 0.2 * 0.12, max_relative = 1e-9);
}

#[test]
fn test_curves_saturate_above_zero() {
    for curve in [Box::new(weibull()) as Box<dyn ConductanceModel>, Box::new(sox())] {
        assert_eq!(curve.conductance(0.5), curve.maximum_conductance());
        assert_eq!(curve.conductance(2.0), curve.maximum_conductance());
    }
}

#[test]
fn test_curves_are_monotone() {
    for curve in [Box::new(weibull()) as Box<dyn ConductanceModel>, Box::new(sox())] {
        let mut previous = curve.conductance(0.0);
        for i in 1..=200 {
            let psi = -0.05 * f64::from(i);
            let k = curve.conductance(psi);
            assert!(k <= previous, "k({}) = {} rose above {}", psi, k, previous);
            assert!(k >= 0.0);
            previous = k;
        }
    }
}

#[test]
fn test_inverse_round_trip_on_random_conductances() {
    let mut rng = StdRng::seed_from_u64(42);
    for curve in [Box::new(weibull()) as Box<dyn ConductanceModel>, Box::new(sox())] {
        for _ in 0..200 {
            let k = rng.random_range(1e-4..0.2);
            let psi = curve.water_potential_from_conductance(k).unwrap();
            assert_relative_eq!(curve.conductance(psi), k, max_relative = 1e-8);
        }
    }
}

#[test]
fn test_inverse_domain_errors() {
    let curve = weibull();
    assert!(matches!(
        curve.water_potential_from_conductance(0.0),
        Err(ModelError::Domain { .. })
    ));
    assert!(matches!(
        curve.water_potential_from_conductance(0.25),
        Err(ModelError::Domain { .. })
    ));
    assert!(curve.water_potential_from_loss_fraction(1.0).is_err());
}

#[test]
fn test_degenerate_fits_rejected() {
    assert!(matches!(
        WeibullCurve::from_loss_observations(0.2, -3.0, -3.0, 0.5, 0.88),
        Err(ModelError::Fit { .. })
    ));
    assert!(SoxCurve::from_loss_observations(0.2, -3.0, -4.0, 0.5, 0.5).is_err());
}

#[test]
fn test_plc_and_critical_point() {
    let curve = weibull();
    assert_relative_eq!(curve.plc(-3.0), 50.0, max_relative = 1e-9);
    let critical = curve.critical_water_potential().unwrap();
    assert_relative_eq!(
        curve.conductance(critical),
        0.2 * (1.0 - curve.critical_conductance_loss_fraction()),
        max_relative = 1e-9
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Damage and memory
// ═══════════════════════════════════════════════════════════════════════════════

/// `k_max` stays within `[(1 - critical) k_base, k_base]` whatever the drivers
#[test]
fn test_damage_clamp_under_random_drivers() {
    let mut rng = StdRng::seed_from_u64(7);
    for strategy in [
        DamageStrategy::Analytic,
        DamageStrategy::iterative(),
        DamageStrategy::rate_recovery(),
    ] {
        let mut model =
            XylemDamageModel::from_loss_observations(0.2, -3.0, -4.0, 0.5, 0.88, strategy).unwrap();
        let floor = (1.0 - model.critical_conductance_loss_fraction()) * 0.2;
        for _ in 0..300 {
            let psi = rng.random_range(-8.0..0.5);
            model.update_xylem_damage(psi, 1800.0, 1.0, 0.0).unwrap();
            let k = model.maximum_conductance();
            assert!(
                k >= floor - 1e-12 && k <= 0.2 + 1e-12,
                "{:?}: k_max {} left [{}, 0.2]",
                strategy,
                k,
                floor
            );
        }
    }
}

#[test]
fn test_analytic_damage_is_irreversible_until_recovery() {
    let mut model = XylemDamageModel::from_loss_observations(
        0.2,
        -3.0,
        -4.0,
        0.5,
        0.88,
        DamageStrategy::Analytic,
    )
    .unwrap();
    assert!(model.update_xylem_damage(-3.5, 1800.0, 1.0, -1.0).unwrap());
    let damaged = model.maximum_conductance();
    assert!(damaged < 0.2);

    // Milder stress leaves the damaged curve alone
    assert!(!model.update_xylem_damage(-0.2, 1800.0, 1.0, -0.1).unwrap());
    assert_eq!(model.maximum_conductance(), damaged);

    // Full rehydration heals
    assert!(model.update_xylem_damage(0.0, 1800.0, 0.0, 0.0).unwrap());
    assert_eq!(model.maximum_conductance(), 0.2);
}

#[test]
fn test_capped_model_remembers_drought() {
    let mut model = CappedConductanceModel::new(Box::new(weibull()));
    model.update_xylem_damage(-3.0, 1800.0, 1.0, -1.0).unwrap();
    assert_relative_eq!(model.conductance_cap(), 0.1, max_relative = 1e-9);
    assert_relative_eq!(model.conductance(0.0), 0.1, max_relative = 1e-9);

    model.update_xylem_damage(0.0, 1800.0, 0.0, 0.0).unwrap();
    assert_eq!(model.conductance(0.0), 0.2);
}

/// With neither growth nor turnover the cohorts only shift: the oldest drops
/// out, the new cohort is empty and every survivor keeps its weight
#[test]
fn test_age_structured_cohorts_shift_without_growth_or_turnover() {
    let mut model =
        AgeStructuredConductanceModel::new(Box::new(weibull()), 4, 1.0, 0.0, 0.0).unwrap();
    model.initialise_xylem_population(1.0, 0.5).unwrap();
    assert_eq!(model.xylem_population(), &[1.0, 0.5, 0.25, 0.125]);

    let ceiling = weibull().conductance(-3.0);
    model.update_xylem_damage(-3.0, 1.0, 1.0, -0.5).unwrap();

    assert_eq!(model.xylem_population(), &[0.0, 1.0, 0.5, 0.25]);
    let expected_conductance = [0.2, ceiling, ceiling, ceiling];
    for (k, e) in model.xylem_conductance().iter().zip(expected_conductance) {
        assert_relative_eq!(*k, e, max_relative = 1e-12);
    }
    assert_relative_eq!(model.conductance(0.0), 1.75 * ceiling, max_relative = 1e-12);

    // Milder stress lifts the ceiling but the damaged cohorts stay damaged
    let milder = weibull().conductance(-1.0);
    model.update_xylem_damage(-1.0, 1.0, 1.0, -0.5).unwrap();
    assert_eq!(model.xylem_population(), &[0.0, 0.0, 1.0, 0.5]);
    let expected_conductance = [0.2, milder, ceiling, ceiling];
    for (k, e) in model.xylem_conductance().iter().zip(expected_conductance) {
        assert_relative_eq!(*k, e, max_relative = 1e-12);
    }
}

/// At the growth/turnover steady state the population is unchanged by an
/// update while the conductances record the stress
#[test]
fn test_age_structured_steady_state_turnover() {
    let mut model =
        AgeStructuredConductanceModel::new(Box::new(weibull()), 3, 1.0, 0.5, 0.2).unwrap();
    let steady = [0.5, 0.4, 0.32];
    for (n, e) in model.xylem_population().iter().zip(steady) {
        assert_relative_eq!(*n, e, max_relative = 1e-12);
    }

    let ceiling = weibull().conductance(-3.0);
    model.update_xylem_damage(-3.0, 1.0, 1.0, -0.5).unwrap();
    for (n, e) in model.xylem_population().iter().zip(steady) {
        assert_relative_eq!(*n, e, max_relative = 1e-12);
    }
    let expected_conductance = [0.2, ceiling, ceiling];
    for (k, e) in model.xylem_conductance().iter().zip(expected_conductance) {
        assert_relative_eq!(*k, e, max_relative = 1e-12);
    }
}

#[test]
fn test_age_structured_rejects_foreign_timestep() {
    let mut model =
        AgeStructuredConductanceModel::new(Box::new(weibull()), 4, 1800.0, 1e-4, 0.1).unwrap();
    assert!(matches!(
        model.update_xylem_damage(-2.0, 3600.0, 1.0, -0.5),
        Err(ModelError::TimestepMismatch { .. })
    ));
}

#[test]
fn test_whole_trunk_remembers_extremes() {
    let mut model = WholeTrunkConductanceModel::new(Box::new(weibull()));
    model.update_xylem_damage(-3.0, 1800.0, 1.0, -1.0).unwrap();
    assert_eq!(model.leaf_extreme_water_potential(), -3.0);
    assert_relative_eq!(model.maximum_conductance(), 0.1, max_relative = 1e-9);
    // Milder potentials are capped by the remembered extreme
    assert_relative_eq!(model.conductance(-1.0), 0.1, max_relative = 1e-9);

    model.reset_xylem_damage();
    assert_eq!(model.maximum_conductance(), 0.2);
}
