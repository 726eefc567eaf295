//! Michaelis-Menten enzyme kinetics

/// Reaction rate at a substrate concentration (same units as `maximum_rate`)
#[inline]
pub fn michaelis_menten_response(
    substrate_concentration: f64,
    maximum_rate: f64,
    michaelis_menten_constant: f64,
) -> f64 {
    maximum_rate * substrate_concentration / (substrate_concentration + michaelis_menten_constant)
}

/// Effective constant of a reaction competitively inhibited by a second
/// substrate `a`:
///
/// ```text
/// K = K_b (1 + [a] / K_a)
/// ```
#[inline]
pub fn competitive_michaelis_menten_constant(
    inhibitor_concentration: f64,
    inhibitor_constant: f64,
    substrate_constant: f64,
) -> f64 {
    substrate_constant * (1.0 + inhibitor_concentration / inhibitor_constant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_half_maximum_rate_at_michaelis_constant() {
        assert_relative_eq!(michaelis_menten_response(40.0, 10.0, 40.0), 5.0, epsilon = 1e-12);
        assert_eq!(michaelis_menten_response(0.0, 10.0, 40.0), 0.0);
    }

    #[test]
    fn test_inhibition_raises_constant() {
        assert_eq!(competitive_michaelis_menten_constant(0.0, 278.4, 404.9), 404.9);
        assert_relative_eq!(
            competitive_michaelis_menten_constant(278.4, 278.4, 404.9),
            809.8,
            epsilon = 1e-9
        );
    }
}
