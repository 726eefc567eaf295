//! Small numerical kernels shared by the models
//!
//! Uniform grids, trapezium integration, NaN-tolerant reductions and the two
//! bracketed 1-D searches (bisection and golden-section) used by the inverse
//! mappings and the iterative refit.

/// Golden ratio conjugate, (√5 - 1) / 2
const INV_GOLDEN_RATIO: f64 = 0.618_033_988_749_895;

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// Mirrors the usual `linspace` contract: `n = 1` yields `[start]` and
/// `n = 0` an empty grid.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Trapezium-rule integral of `f` over `steps` evenly spaced samples.
///
/// The integral is signed: integrating from a larger to a smaller bound
/// gives a negative result. Fewer than two samples integrate to zero.
pub fn trapezium_integral<F>(f: F, lower: f64, upper: f64, steps: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    if steps < 2 {
        return 0.0;
    }
    let width = (upper - lower) / (steps - 1) as f64;
    let interior: f64 = (1..steps - 1).map(|i| f(lower + width * i as f64)).sum();
    width * (0.5 * (f(lower) + f(upper)) + interior)
}

/// Maximum of the finite values, `None` when there are none
pub fn nan_max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |best, v| match best {
            Some(b) if b >= v => Some(b),
            _ => Some(v),
        })
}

/// Index of the largest non-NaN value among `candidates`.
///
/// Ties resolve to the first candidate. Returns `None` when every candidate
/// is NaN (or there are none).
pub fn nan_argmax_over<I>(values: &[f64], candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut best: Option<(usize, f64)> = None;
    for index in candidates {
        let value = values[index];
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if b >= value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Bisection for the crossing of a non-decreasing function with `target`
/// inside `[lower, upper]`.
pub fn bisect_increasing<F>(
    f: F,
    target: f64,
    mut lower: f64,
    mut upper: f64,
    iterations: usize,
) -> f64
where
    F: Fn(f64) -> f64,
{
    for _ in 0..iterations {
        let mid = 0.5 * (lower + upper);
        if f(mid) < target {
            lower = mid;
        } else {
            upper = mid;
        }
    }
    0.5 * (lower + upper)
}

/// Golden-section search for the minimum of a unimodal `f` on `[lower, upper]`.
///
/// NaN evaluations are treated as +∞ so the bracket shrinks away from them.
pub fn golden_section_minimise<F>(f: F, mut lower: f64, mut upper: f64, tolerance: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let eval = |x: f64| {
        let v = f(x);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    let mut x1 = upper - INV_GOLDEN_RATIO * (upper - lower);
    let mut x2 = lower + INV_GOLDEN_RATIO * (upper - lower);
    let mut f1 = eval(x1);
    let mut f2 = eval(x2);

    // Bounded so a NaN tolerance cannot spin forever
    for _ in 0..200 {
        if (upper - lower).abs() <= tolerance {
            break;
        }
        if f1 <= f2 {
            upper = x2;
            x2 = x1;
            f2 = f1;
            x1 = upper - INV_GOLDEN_RATIO * (upper - lower);
            f1 = eval(x1);
        } else {
            lower = x1;
            x1 = x2;
            f1 = f2;
            x2 = lower + INV_GOLDEN_RATIO * (upper - lower);
            f2 = eval(x2);
        }
    }
    0.5 * (lower + upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace_endpoints() {
        let grid = linspace(-1.0, -4.0, 4);
        assert_eq!(grid, vec![-1.0, -2.0, -3.0, -4.0]);
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_trapezium_is_exact_for_linear_functions() {
        let integral = trapezium_integral(|x| 2.0 * x + 1.0, 0.0, 3.0, 7);
        assert_relative_eq!(integral, 12.0, epsilon = 1e-12);
        let reversed = trapezium_integral(|x| 2.0 * x + 1.0, 3.0, 0.0, 7);
        assert_relative_eq!(reversed, -12.0, epsilon = 1e-12);
        assert_eq!(trapezium_integral(|x| x, 0.0, 1.0, 1), 0.0);
    }

    #[test]
    fn test_nan_reductions_skip_nan() {
        let values = [f64::NAN, 1.0, 3.0, f64::NAN, 2.0];
        assert_eq!(nan_max(&values), Some(3.0));
        assert_eq!(nan_argmax_over(&values, 0..values.len()), Some(2));
        assert_eq!(nan_argmax_over(&values, [0, 3, 4]), Some(4));
        assert_eq!(nan_argmax_over(&values, [0, 3]), None);
        assert_eq!(nan_max(&[f64::NAN]), None);
    }

    #[test]
    fn test_searches_converge() {
        let root = bisect_increasing(|x| x * x * x, 8.0, 0.0, 5.0, 80);
        assert_relative_eq!(root, 2.0, epsilon = 1e-10);

        let minimum = golden_section_minimise(|x| (x - 1.3).powi(2), -4.0, 6.0, 1e-9);
        assert_relative_eq!(minimum, 1.3, epsilon = 1e-6);
    }
}
