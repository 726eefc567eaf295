//! Error type shared by every model in the crate

use thiserror::Error;

/// Failures raised by conductance curves, damage models and the optimiser.
///
/// Numerical non-convergence inside the photosynthesis solvers is not an
/// error: it is reported as NaN and absorbed by the NaN-safe reductions of
/// the profit search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// An inverse mapping was queried outside the range where it exists
    #[error("{quantity} = {value} is outside the valid range {valid_range}")]
    Domain {
        quantity: &'static str,
        value: f64,
        valid_range: &'static str,
    },

    /// Two-point curve fitting received degenerate observations
    #[error("cannot fit {curve} curve: {reason}")]
    Fit { curve: &'static str, reason: String },

    /// An age-structured update was driven with a foreign timestep
    #[error("timestep of {got} s does not match the model timestep of {expected} s")]
    TimestepMismatch { expected: f64, got: f64 },

    /// Invalid drivers, sample counts or configuration values
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias used throughout the crate
pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub(crate) fn domain(quantity: &'static str, value: f64, valid_range: &'static str) -> Self {
        ModelError::Domain {
            quantity,
            value,
            valid_range,
        }
    }

    pub(crate) fn fit(curve: &'static str, reason: impl Into<String>) -> Self {
        ModelError::Fit {
            curve,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offending_value() {
        let err = ModelError::domain("conductance loss fraction", 1.5, "[0, 1)");
        assert_eq!(
            err.to_string(),
            "conductance loss fraction = 1.5 is outside the valid range [0, 1)"
        );

        let err = ModelError::TimestepMismatch {
            expected: 1800.0,
            got: 900.0,
        };
        assert!(err.to_string().contains("900"), "message was {}", err);
    }
}
