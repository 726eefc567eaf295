//! Real roots of `a x² + b x + c = 0`

/// Leading coefficients smaller than this are solved as linear equations
const LINEAR_THRESHOLD: f64 = 1e-12;

/// Real roots in ascending order.
///
/// A vanishing leading coefficient degrades to the linear solution
/// `-c/b`. Returns an empty vector for a negative discriminant or a
/// degenerate equation.
pub fn real_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < LINEAR_THRESHOLD {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || discriminant.is_nan() {
        return Vec::new();
    }

    // Numerically stable form avoids cancellation between -b and √d
    let sqrt_d = discriminant.sqrt();
    let q = -0.5 * (b + b.signum() * sqrt_d);
    let (r1, r2) = if q == 0.0 {
        (0.0, 0.0)
    } else {
        (q / a, c / q)
    };
    if r1 <= r2 {
        vec![r1, r2]
    } else {
        vec![r2, r1]
    }
}

/// Largest root inside `[lower, upper]`, NaN when none is admissible
pub fn largest_root_within(a: f64, b: f64, c: f64, lower: f64, upper: f64) -> f64 {
    real_roots(a, b, c)
        .into_iter()
        .filter(|r| (lower..=upper).contains(r))
        .fold(f64::NAN, f64::max)
}

/// Smallest non-negative root, `None` when there is none
pub fn smallest_non_negative_root(a: f64, b: f64, c: f64) -> Option<f64> {
    real_roots(a, b, c).into_iter().find(|r| *r >= 0.0)
}
